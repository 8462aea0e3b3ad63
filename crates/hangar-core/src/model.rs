//! Loadable glTF models and their lifecycle

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::loader::{AssetPath, LoadTicket};
use crate::scene::{MeshFlags, NodeId, NodeTransform};

/// Which of the viewer's models a load refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelRole {
    /// Loaded once at startup
    Primary,
    /// Spawned and removed on demand
    Secondary,
}

impl ModelRole {
    pub fn label(self) -> &'static str {
        match self {
            ModelRole::Primary => "primary",
            ModelRole::Secondary => "secondary",
        }
    }
}

/// Flags applied to every mesh of a model when it is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshPolicy {
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub bloom: bool,
}

impl MeshPolicy {
    pub fn flags(&self) -> MeshFlags {
        MeshFlags {
            cast_shadow: self.cast_shadow,
            receive_shadow: self.receive_shadow,
            bloom_eligible: self.bloom,
        }
    }
}

/// Where a model comes from and how it is placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub asset: AssetPath,
    pub transform: NodeTransform,
    pub mesh_policy: MeshPolicy,
}

impl ModelSpec {
    pub fn default_for(role: ModelRole) -> Self {
        match role {
            ModelRole::Primary => Self {
                asset: AssetPath::new("public/millennium_falcon/"),
                transform: NodeTransform::uniform(0.01, Vec3::new(0.0, 1.05, -1.0)),
                mesh_policy: MeshPolicy {
                    cast_shadow: true,
                    receive_shadow: true,
                    bloom: true,
                },
            },
            ModelRole::Secondary => Self {
                asset: AssetPath::new("public/townhall/"),
                transform: NodeTransform::uniform(10.8, Vec3::new(-15.0, -12.0, 10.0)),
                mesh_policy: MeshPolicy {
                    cast_shadow: true,
                    receive_shadow: true,
                    bloom: false,
                },
            },
        }
    }
}

/// Load lifecycle of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Failed,
}

/// A model plus its load state and back-reference into the scene graph
#[derive(Debug, Clone)]
pub struct LoadableModel {
    pub role: ModelRole,
    pub spec: ModelSpec,
    state: LoadState,
    root: Option<NodeId>,
    generation: u64,
    /// Generation of the single request allowed in flight
    in_flight: Option<u64>,
}

impl LoadableModel {
    pub fn new(role: ModelRole, spec: ModelSpec) -> Self {
        Self {
            role,
            spec,
            state: LoadState::NotLoaded,
            root: None,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a new request, superseding any request still in flight
    pub fn begin_load(&mut self) -> LoadTicket {
        if let Some(previous) = self.in_flight {
            tracing::debug!(
                model = self.role.label(),
                generation = previous,
                "Superseding in-flight load"
            );
        }
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.state = LoadState::Loading;
        LoadTicket {
            model: self.role,
            generation: self.generation,
            path: self.spec.asset.resolve(),
        }
    }

    /// Whether a completion for this ticket should still be honoured
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.model == self.role && self.in_flight == Some(ticket.generation)
    }

    /// Drop the in-flight request without starting another
    pub fn cancel(&mut self) {
        if self.in_flight.take().is_some() && self.state == LoadState::Loading {
            self.state = LoadState::NotLoaded;
        }
    }

    pub(crate) fn mark_loaded(&mut self, root: NodeId) {
        self.in_flight = None;
        self.root = Some(root);
        self.state = LoadState::Loaded;
    }

    pub(crate) fn mark_failed(&mut self) {
        self.in_flight = None;
        self.root = None;
        self.state = LoadState::Failed;
    }

    /// Forget the attached root and allow a fresh load
    pub(crate) fn reset(&mut self) -> Option<NodeId> {
        self.in_flight = None;
        self.state = LoadState::NotLoaded;
        self.root.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_load_supersedes_previous_ticket() {
        let mut model = LoadableModel::new(
            ModelRole::Secondary,
            ModelSpec::default_for(ModelRole::Secondary),
        );
        let first = model.begin_load();
        let second = model.begin_load();

        assert_eq!(model.state(), LoadState::Loading);
        assert!(!model.is_current(&first));
        assert!(model.is_current(&second));
        assert_eq!(second.path, "public/townhall/scene.gltf");
    }

    #[test]
    fn test_cancel_returns_to_not_loaded() {
        let mut model = LoadableModel::new(
            ModelRole::Secondary,
            ModelSpec::default_for(ModelRole::Secondary),
        );
        let ticket = model.begin_load();
        model.cancel();
        assert_eq!(model.state(), LoadState::NotLoaded);
        assert!(!model.is_current(&ticket));
        assert!(!model.is_loading());
    }

    #[test]
    fn test_secondary_policy_never_blooms() {
        let flags = ModelSpec::default_for(ModelRole::Secondary).mesh_policy.flags();
        assert!(flags.cast_shadow && flags.receive_shadow);
        assert!(!flags.bloom_eligible);
    }
}
