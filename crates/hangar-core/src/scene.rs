//! Scene graph ownership tree
//!
//! The graph owns every attached node. A node is "present" exactly when it is
//! reachable from the implicit root; there is no separate visibility flag.
//! Lights and models only keep [`NodeId`] back-references into the graph.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::lights::LightKey;

/// Stable identifier for a node attached to the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Scale and position applied to a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    pub scale: Vec3,
    pub position: Vec3,
}

impl NodeTransform {
    pub const IDENTITY: Self = Self {
        scale: Vec3::ONE,
        position: Vec3::ZERO,
    };

    pub fn new(scale: Vec3, position: Vec3) -> Self {
        Self { scale, position }
    }

    /// Uniform scale on all three axes
    pub fn uniform(scale: f32, position: Vec3) -> Self {
        Self {
            scale: Vec3::splat(scale),
            position,
        }
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-mesh render flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeshFlags {
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    /// Mesh takes part in the bloom pass
    pub bloom_eligible: bool,
}

/// What a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Mesh(MeshFlags),
    Light(LightKey),
}

/// A detached scene-graph subtree
///
/// Loaders produce these; [`SceneGraph::attach`] takes ownership.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: NodeTransform,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Group,
            transform: NodeTransform::IDENTITY,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Mesh(MeshFlags::default()),
            transform: NodeTransform::IDENTITY,
            children: Vec::new(),
        }
    }

    pub fn light(key: LightKey) -> Self {
        Self {
            name: key.label().to_string(),
            kind: NodeKind::Light(key),
            transform: NodeTransform::IDENTITY,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Depth-first visit of this node and all of its descendants
    pub fn traverse(&self, visit: &mut impl FnMut(&SceneNode)) {
        visit(self);
        for child in &self.children {
            child.traverse(visit);
        }
    }

    /// Mutable depth-first visit
    pub fn traverse_mut(&mut self, visit: &mut impl FnMut(&mut SceneNode)) {
        visit(self);
        for child in &mut self.children {
            child.traverse_mut(visit);
        }
    }

    /// Overwrite the flags of every mesh in the subtree
    pub fn apply_mesh_flags(&mut self, flags: MeshFlags) {
        self.traverse_mut(&mut |node| {
            if let NodeKind::Mesh(mesh) = &mut node.kind {
                *mesh = flags;
            }
        });
    }

    /// Flags of every mesh in the subtree, in traversal order
    pub fn mesh_flags(&self) -> Vec<MeshFlags> {
        let mut flags = Vec::new();
        self.traverse(&mut |node| {
            if let NodeKind::Mesh(mesh) = node.kind {
                flags.push(mesh);
            }
        });
        flags
    }

    pub fn mesh_count(&self) -> usize {
        self.mesh_flags().len()
    }
}

#[derive(Debug)]
struct Attached {
    id: NodeId,
    node: SceneNode,
}

/// Ownership tree traversed by the renderer every frame
#[derive(Debug, Default)]
pub struct SceneGraph {
    roots: Vec<Attached>,
    next_id: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a subtree under the root and return its handle
    pub fn attach(&mut self, node: SceneNode) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        tracing::trace!(%id, name = %node.name, "Attached scene node");
        self.roots.push(Attached { id, node });
        id
    }

    /// Detach a subtree, handing ownership back to the caller
    ///
    /// Returns `None` when the node is not present.
    pub fn detach(&mut self, id: NodeId) -> Option<SceneNode> {
        let index = self.roots.iter().position(|a| a.id == id)?;
        let attached = self.roots.remove(index);
        tracing::trace!(%id, name = %attached.node.name, "Detached scene node");
        Some(attached.node)
    }

    /// Presence check: reachable from the root
    pub fn contains(&self, id: NodeId) -> bool {
        self.roots.iter().any(|a| a.id == id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.roots.iter().find(|a| a.id == id).map(|a| &a.node)
    }

    /// Number of top-level nodes under the root
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Top-level node ids in attachment order
    pub fn ids(&self) -> Vec<NodeId> {
        self.roots.iter().map(|a| a.id).collect()
    }

    /// Visit every reachable node
    pub fn traverse(&self, visit: &mut impl FnMut(&SceneNode)) {
        for attached in &self.roots {
            attached.node.traverse(visit);
        }
    }
}
