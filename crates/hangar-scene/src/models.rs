//! glTF model loading through the asset server
//!
//! The viewer hands out load tickets; this plugin turns each ticket into an
//! asset-server load, reports progress while it runs and passes the terminal
//! result back through `finish_load`. The spawned `SceneRoot` entity follows
//! the model's presence in the scene graph.

use std::collections::{HashMap, HashSet};

use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::gltf::GltfNode;
use bevy::pbr::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;
use hangar_core::{
    AssetLoadError, LoadCompletion, LoadProgress, LoadTicket, ModelRole, NodeTransform, SceneNode,
};

use crate::types::*;

/// Loads handed to the asset server and not yet completed
#[derive(Resource, Default)]
pub struct PendingModelLoads {
    pub loading: HashMap<ModelRole, PendingLoad>,
}

pub struct PendingLoad {
    pub ticket: LoadTicket,
    pub handle: Handle<Gltf>,
    /// Last progress handed to the viewer
    pub progress: Option<LoadProgress>,
}

/// Plugin for model loading
pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingModelLoads>()
            .add_systems(
                Update,
                (start_model_loads, poll_model_loads)
                    .chain()
                    .in_set(HangarSet::Loads),
            )
            .add_systems(
                Update,
                (despawn_detached_models, apply_mesh_policy).in_set(HangarSet::Sync),
            );
    }
}

fn start_model_loads(
    mut viewer: ResMut<ViewerState>,
    mut pending: ResMut<PendingModelLoads>,
    asset_server: Res<AssetServer>,
) {
    for ticket in viewer.0.drain_load_requests() {
        tracing::info!(
            model = ticket.model.label(),
            path = %ticket.path,
            generation = ticket.generation,
            "Loading model"
        );
        let handle = asset_server.load::<Gltf>(ticket.path.clone());
        // A newer ticket for the same model replaces the old one
        pending
            .loading
            .insert(ticket.model, PendingLoad { ticket, handle, progress: None });
    }
}

/// Check loading state and complete tickets whose glTF has settled
fn poll_model_loads(
    mut commands: Commands,
    mut viewer: ResMut<ViewerState>,
    mut pending: ResMut<PendingModelLoads>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    gltf_nodes: Res<Assets<GltfNode>>,
) {
    let roles: Vec<ModelRole> = pending.loading.keys().copied().collect();
    for role in roles {
        let Some(load) = pending.loading.get(&role) else { continue };

        if !viewer.0.is_ticket_current(&load.ticket) {
            pending.loading.remove(&role);
            continue;
        }

        let result = match asset_server.get_load_state(load.handle.id()) {
            Some(LoadState::Loaded) => {
                match asset_server.get_recursive_dependency_load_state(load.handle.id()) {
                    Some(RecursiveDependencyLoadState::Loaded) => {
                        mirror_gltf(&load.ticket.path, &load.handle, &gltf_assets, &gltf_nodes)
                    }
                    Some(RecursiveDependencyLoadState::Failed(error)) => Err(AssetLoadError::Fetch {
                        path: load.ticket.path.clone(),
                        reason: error.to_string(),
                    }),
                    _ => {
                        report_progress(&mut viewer, &mut pending, role, LoadProgress::new(1, 2));
                        continue;
                    }
                }
            }
            Some(LoadState::Failed(error)) => Err(AssetLoadError::Fetch {
                path: load.ticket.path.clone(),
                reason: error.to_string(),
            }),
            _ => {
                report_progress(&mut viewer, &mut pending, role, LoadProgress::new(0, 2));
                continue;
            }
        };

        let Some(load) = pending.loading.remove(&role) else { continue };
        let scene = result.as_ref().ok().map(|(_, scene)| scene.clone());
        let completion = viewer
            .0
            .finish_load(load.ticket, result.map(|(node, _)| node));

        if let (LoadCompletion::Attached(node), Some(scene)) = (completion, scene) {
            let spec = &viewer.0.model(role).spec;
            commands.spawn((
                SceneRoot(scene),
                node_transform(&spec.transform),
                ModelRoot { role, node },
                Name::new(role.label()),
            ));
        }
    }
}

/// Forward progress to the viewer when it changed since the last report
fn report_progress(
    viewer: &mut ViewerState,
    pending: &mut PendingModelLoads,
    role: ModelRole,
    progress: LoadProgress,
) {
    let Some(load) = pending.loading.get_mut(&role) else { return };
    if load.progress == Some(progress) {
        return;
    }
    load.progress = Some(progress);
    viewer.0.report_progress(&load.ticket, progress);
}

/// Build the graph-side description of a loaded glTF and pick its scene
fn mirror_gltf(
    path: &str,
    handle: &Handle<Gltf>,
    gltf_assets: &Assets<Gltf>,
    gltf_nodes: &Assets<GltfNode>,
) -> Result<(SceneNode, Handle<Scene>), AssetLoadError> {
    let Some(gltf) = gltf_assets.get(handle) else {
        return Err(AssetLoadError::Parse {
            path: path.to_string(),
            reason: "asset missing after load".to_string(),
        });
    };
    let scene = gltf
        .default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
        .ok_or_else(|| AssetLoadError::EmptyScene(path.to_string()))?;

    // Top-level nodes are the ones no other node lists as a child
    let children: HashSet<AssetId<GltfNode>> = gltf
        .nodes
        .iter()
        .filter_map(|h| gltf_nodes.get(h))
        .flat_map(|node| node.children.iter().map(|c| c.id()))
        .collect();

    let mut root = SceneNode::group(path);
    for handle in gltf.nodes.iter().filter(|h| !children.contains(&h.id())) {
        if let Some(node) = mirror_node(handle, gltf_nodes, 0) {
            root = root.with_child(node);
        }
    }
    Ok((root, scene))
}

const MAX_NODE_DEPTH: usize = 64;

fn mirror_node(handle: &Handle<GltfNode>, nodes: &Assets<GltfNode>, depth: usize) -> Option<SceneNode> {
    if depth > MAX_NODE_DEPTH {
        return None;
    }
    let node = nodes.get(handle)?;
    let transform = NodeTransform::new(
        from_bevy(node.transform.scale),
        from_bevy(node.transform.translation),
    );
    let mut mirrored = if node.mesh.is_some() {
        SceneNode::mesh(node.name.clone())
    } else {
        SceneNode::group(node.name.clone())
    }
    .with_transform(transform);
    for child in &node.children {
        if let Some(child) = mirror_node(child, nodes, depth + 1) {
            mirrored = mirrored.with_child(child);
        }
    }
    Some(mirrored)
}

fn node_transform(transform: &NodeTransform) -> Transform {
    Transform::from_translation(to_bevy(transform.position)).with_scale(to_bevy(transform.scale))
}

/// Despawn model scenes whose graph node has been detached
fn despawn_detached_models(
    mut commands: Commands,
    viewer: Res<ViewerState>,
    roots: Query<(Entity, &ModelRoot)>,
) {
    for (entity, root) in roots.iter() {
        if viewer.0.model(root.role).root() != Some(root.node) {
            tracing::debug!(model = root.role.label(), "Despawning model scene");
            commands.entity(entity).despawn();
        }
    }
}

/// Tag freshly spawned meshes with their model's shadow and bloom flags
fn apply_mesh_policy(
    mut commands: Commands,
    viewer: Res<ViewerState>,
    new_meshes: Query<Entity, Added<Mesh3d>>,
    parents: Query<&ChildOf>,
    roots: Query<&ModelRoot>,
) {
    for entity in new_meshes.iter() {
        let mut current = entity;
        let role = loop {
            let Ok(child_of) = parents.get(current) else { break None };
            current = child_of.parent();
            if let Ok(root) = roots.get(current) {
                break Some(root.role);
            }
        };
        let Some(role) = role else { continue };

        let flags = viewer.0.model(role).spec.mesh_policy.flags();
        let mut mesh = commands.entity(entity);
        if !flags.cast_shadow {
            mesh.insert(NotShadowCaster);
        }
        if !flags.receive_shadow {
            mesh.insert(NotShadowReceiver);
        }
        if flags.bloom_eligible {
            mesh.insert(BloomEligible);
        }
    }
}
