//! Application state: the single owner of everything the viewer shows
//!
//! `Viewer` is constructed once at startup and handed to whichever host
//! drives it. UI handlers mutate it through [`Viewer::toggle`], load
//! completions through [`Viewer::finish_load`], and the render loop reads it
//! once per frame through [`Viewer::tick`].

use std::collections::BTreeMap;

use crate::config::ViewerConfig;
use crate::controls::{CameraPose, OrbitControls};
use crate::lights::{LightKey, LightSpec};
use crate::loader::{AssetLoadError, LoadCompletion, LoadFailure, LoadProgress, LoadTicket};
use crate::menu::SettingsMenu;
use crate::model::{LoadState, LoadableModel, ModelRole};
use crate::passes::{BloomSettings, DepthOfFieldSettings, PassKind, PassList};
use crate::scene::{NodeId, SceneGraph, SceneNode};
use crate::toggle::{ToggleId, ToggleOutcome, ToggleRegistry};
use crate::viewport::{CameraState, Viewport};

/// What one render-loop tick produced
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: u64,
    pub camera: CameraPose,
    /// Pass list in execution order
    pub passes: Vec<PassKind>,
    pub lights: Vec<LightKey>,
    pub models: Vec<ModelRole>,
}

#[derive(Debug, Clone)]
struct LightSlot {
    spec: LightSpec,
    node: Option<NodeId>,
}

/// The viewer's complete state
#[derive(Debug)]
pub struct Viewer {
    graph: SceneGraph,
    passes: PassList,
    bloom: BloomSettings,
    depth_of_field: DepthOfFieldSettings,
    lights: BTreeMap<LightKey, LightSlot>,
    primary: LoadableModel,
    secondary: LoadableModel,
    controls: OrbitControls,
    camera: CameraState,
    viewport: Viewport,
    menu: SettingsMenu,
    toggles: ToggleRegistry,
    load_requests: Vec<LoadTicket>,
    failures: Vec<LoadFailure>,
    primary_progress: Option<LoadProgress>,
    frame_index: u64,
    background_image: Option<String>,
    clear_color: u32,
}

impl Viewer {
    /// Compose the initial scene and request the primary model
    pub fn new(config: &ViewerConfig, viewport: Viewport) -> Self {
        let mut passes = PassList::new(viewport.width, viewport.height);
        if config.passes.bloom_enabled {
            passes.add(PassKind::Bloom);
        }
        if config.passes.depth_of_field_enabled {
            passes.add(PassKind::DepthOfField);
        }

        let mut graph = SceneGraph::new();
        let lights = LightKey::ALL
            .into_iter()
            .map(|key| {
                let spec = config.lights.get(key).clone();
                let node = spec
                    .initially_on
                    .then(|| graph.attach(SceneNode::light(key)));
                (key, LightSlot { spec, node })
            })
            .collect();

        let mut viewer = Self {
            graph,
            passes,
            bloom: config.passes.bloom.clone(),
            depth_of_field: config.passes.depth_of_field.clone(),
            lights,
            primary: LoadableModel::new(
                ModelRole::Primary,
                config.models.get(ModelRole::Primary).clone(),
            ),
            secondary: LoadableModel::new(
                ModelRole::Secondary,
                config.models.get(ModelRole::Secondary).clone(),
            ),
            controls: OrbitControls::new(config.controls.clone(), config.camera.position),
            camera: CameraState::new(config.camera.clone(), viewport.width, viewport.height),
            viewport,
            menu: SettingsMenu::default(),
            toggles: ToggleRegistry::standard(),
            load_requests: Vec::new(),
            failures: Vec::new(),
            primary_progress: None,
            frame_index: 0,
            background_image: config.scene.background_image.clone(),
            clear_color: config.scene.clear_color,
        };
        viewer.request_load(ModelRole::Primary);
        viewer
    }

    // --- Toggle registry -------------------------------------------------

    /// Flip one toggle
    pub fn toggle(&mut self, id: ToggleId) -> ToggleOutcome {
        let binding = self.toggles.get(id).copied();
        let active = match binding {
            Some(binding) => (binding.effect)(self),
            None => self.is_active(id),
        };
        tracing::info!(toggle = %id, active, "Toggle applied");
        ToggleOutcome { id, active }
    }

    /// Flip the toggle bound to a UI trigger element
    pub fn toggle_by_trigger(&mut self, trigger_id: &str) -> Option<ToggleOutcome> {
        let id = self.toggles.by_trigger(trigger_id)?.id;
        Some(self.toggle(id))
    }

    /// Current state of a toggle
    pub fn is_active(&self, id: ToggleId) -> bool {
        self.toggles
            .get(id)
            .map(|binding| (binding.read)(self))
            .unwrap_or(false)
    }

    pub fn toggles(&self) -> &ToggleRegistry {
        &self.toggles
    }

    pub(crate) fn toggle_light(&mut self, key: LightKey) -> bool {
        let Some(slot) = self.lights.get_mut(&key) else {
            return false;
        };
        match slot.node.take() {
            Some(node) if self.graph.contains(node) => {
                self.graph.detach(node);
                false
            }
            _ => {
                slot.node = Some(self.graph.attach(SceneNode::light(key)));
                true
            }
        }
    }

    pub(crate) fn toggle_pass(&mut self, pass: PassKind) -> bool {
        self.passes.toggle(pass)
    }

    pub(crate) fn toggle_auto_rotate(&mut self) -> bool {
        let enabled = !self.controls.auto_rotate();
        self.controls.set_auto_rotate(enabled);
        enabled
    }

    /// Remove the model when present, cancel it while loading, otherwise
    /// request a (re)load
    pub(crate) fn toggle_model(&mut self, role: ModelRole) -> bool {
        if self.is_model_present(role) {
            let model = self.model_mut(role);
            if let Some(root) = model.reset() {
                self.graph.detach(root);
            }
            tracing::info!(model = role.label(), "Model removed from scene");
            false
        } else if self.model(role).is_loading() {
            self.model_mut(role).cancel();
            if role == ModelRole::Primary {
                self.primary_progress = None;
            }
            tracing::info!(model = role.label(), "Model load cancelled");
            false
        } else {
            self.request_load(role);
            true
        }
    }

    /// Present in the graph or on its way there
    pub(crate) fn is_model_requested(&self, role: ModelRole) -> bool {
        self.is_model_present(role) || self.model(role).is_loading()
    }

    // --- Asset loading ---------------------------------------------------

    /// Queue a load for a model, cancelling any request already in flight
    pub fn request_load(&mut self, role: ModelRole) -> LoadTicket {
        let ticket = self.model_mut(role).begin_load();
        tracing::info!(
            model = role.label(),
            path = %ticket.path,
            generation = ticket.generation,
            "Requesting model load"
        );
        if role == ModelRole::Primary {
            self.primary_progress = Some(LoadProgress::default());
        }
        self.load_requests.push(ticket.clone());
        ticket
    }

    /// Take the load requests the host has not started yet
    ///
    /// Requests superseded before the host saw them are dropped.
    pub fn drain_load_requests(&mut self) -> Vec<LoadTicket> {
        let requests = std::mem::take(&mut self.load_requests);
        requests
            .into_iter()
            .filter(|ticket| self.model(ticket.model).is_current(ticket))
            .collect()
    }

    /// Whether a completion for this ticket would still be honoured
    pub fn is_ticket_current(&self, ticket: &LoadTicket) -> bool {
        self.model(ticket.model).is_current(ticket)
    }

    /// Informational progress for an in-flight load
    pub fn report_progress(&mut self, ticket: &LoadTicket, progress: LoadProgress) {
        if !self.is_ticket_current(ticket) {
            return;
        }
        match progress.percent() {
            Some(percent) => tracing::debug!(path = %ticket.path, "loading {:.0}%", percent),
            None => tracing::debug!(path = %ticket.path, bytes = progress.loaded, "loading"),
        }
        if ticket.model == ModelRole::Primary {
            self.primary_progress = Some(progress);
        }
    }

    /// Deliver the terminal event of a load
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<SceneNode, AssetLoadError>,
    ) -> LoadCompletion {
        if !self.is_ticket_current(&ticket) {
            tracing::debug!(
                model = ticket.model.label(),
                generation = ticket.generation,
                "Discarding stale load completion"
            );
            return LoadCompletion::Stale;
        }
        if ticket.model == ModelRole::Primary {
            self.primary_progress = None;
        }

        match result {
            Ok(mut root) => {
                let spec = self.model(ticket.model).spec.clone();
                root.apply_mesh_flags(spec.mesh_policy.flags());
                root.transform = spec.transform;
                let meshes = root.mesh_count();
                let id = self.graph.attach(root);
                self.model_mut(ticket.model).mark_loaded(id);
                tracing::info!(
                    model = ticket.model.label(),
                    path = %ticket.path,
                    meshes,
                    "Model loaded"
                );
                LoadCompletion::Attached(id)
            }
            Err(error) => {
                tracing::error!(
                    model = ticket.model.label(),
                    path = %ticket.path,
                    error = %error,
                    "Failed to load model"
                );
                self.model_mut(ticket.model).mark_failed();
                self.failures.push(LoadFailure {
                    model: ticket.model,
                    error,
                });
                LoadCompletion::Failed
            }
        }
    }

    /// Every load failure reported so far
    pub fn load_failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Primary model progress while it is loading, for the startup overlay
    pub fn loading_overlay(&self) -> Option<LoadProgress> {
        self.primary_progress
    }

    // --- Render loop -----------------------------------------------------

    /// Advance camera controls and snapshot what this frame renders
    pub fn tick(&mut self, dt: f32) -> Frame {
        let camera = self.controls.update(dt);
        self.frame_index += 1;
        Frame {
            index: self.frame_index,
            camera,
            passes: self.passes.passes().to_vec(),
            lights: LightKey::ALL
                .into_iter()
                .filter(|key| self.is_light_present(*key))
                .collect(),
            models: [ModelRole::Primary, ModelRole::Secondary]
                .into_iter()
                .filter(|role| self.is_model_present(*role))
                .collect(),
        }
    }

    // --- Viewport --------------------------------------------------------

    /// Handle one display-size change
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.camera
            .set_aspect(self.viewport.width, self.viewport.height);
        self.passes
            .set_size(self.viewport.width, self.viewport.height);
        tracing::trace!(
            width = self.viewport.width,
            height = self.viewport.height,
            "Viewport resized"
        );
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    // --- Accessors -------------------------------------------------------

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn passes(&self) -> &PassList {
        &self.passes
    }

    pub fn bloom_settings(&self) -> &BloomSettings {
        &self.bloom
    }

    pub fn depth_of_field_settings(&self) -> &DepthOfFieldSettings {
        &self.depth_of_field
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn menu(&self) -> &SettingsMenu {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut SettingsMenu {
        &mut self.menu
    }

    pub fn background_image(&self) -> Option<&str> {
        self.background_image.as_deref()
    }

    pub fn clear_color(&self) -> u32 {
        self.clear_color
    }

    pub fn light_spec(&self, key: LightKey) -> Option<&LightSpec> {
        self.lights.get(&key).map(|slot| &slot.spec)
    }

    pub fn is_light_present(&self, key: LightKey) -> bool {
        self.lights
            .get(&key)
            .and_then(|slot| slot.node)
            .is_some_and(|node| self.graph.contains(node))
    }

    pub fn model(&self, role: ModelRole) -> &LoadableModel {
        match role {
            ModelRole::Primary => &self.primary,
            ModelRole::Secondary => &self.secondary,
        }
    }

    fn model_mut(&mut self, role: ModelRole) -> &mut LoadableModel {
        match role {
            ModelRole::Primary => &mut self.primary,
            ModelRole::Secondary => &mut self.secondary,
        }
    }

    pub fn model_state(&self, role: ModelRole) -> LoadState {
        self.model(role).state()
    }

    /// Attached scene-graph root of a model, if present
    pub fn model_node(&self, role: ModelRole) -> Option<&SceneNode> {
        self.model(role).root().and_then(|id| self.graph.get(id))
    }

    pub fn is_model_present(&self, role: ModelRole) -> bool {
        self.model(role)
            .root()
            .is_some_and(|id| self.graph.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeTransform;
    use glam::Vec3;

    fn viewer() -> Viewer {
        Viewer::new(&ViewerConfig::default(), Viewport::new(800, 600))
    }

    fn model_tree(name: &str) -> SceneNode {
        SceneNode::group(name)
            .with_child(SceneNode::mesh("body"))
            .with_child(SceneNode::group("detail").with_child(SceneNode::mesh("trim")))
    }

    /// Membership summary used to compare compositions
    fn composition(v: &Viewer) -> Vec<(ToggleId, bool)> {
        ToggleId::ALL.iter().map(|id| (*id, v.is_active(*id))).collect()
    }

    /// Request the secondary model and take its ticket; the startup request
    /// for the primary model is drained first
    fn load_secondary(v: &mut Viewer) -> LoadTicket {
        v.drain_load_requests();
        v.toggle(ToggleId::SecondaryModel);
        let mut requests = v.drain_load_requests();
        assert_eq!(requests.len(), 1);
        requests.remove(0)
    }

    #[test]
    fn test_initial_composition() {
        let v = viewer();
        assert!(v.is_active(ToggleId::LightA));
        assert!(v.is_active(ToggleId::LightB));
        assert!(v.is_active(ToggleId::LightC));
        assert!(v.is_active(ToggleId::Bloom));
        assert!(!v.is_active(ToggleId::DepthOfField));
        assert!(v.is_active(ToggleId::AutoRotate));
        assert!(!v.is_active(ToggleId::SecondaryModel));
        assert_eq!(v.passes().passes(), &[PassKind::Render, PassKind::Bloom]);
        assert_eq!(v.model_state(ModelRole::Primary), LoadState::Loading);
    }

    #[test]
    fn test_every_toggle_is_its_own_inverse() {
        for id in ToggleId::ALL {
            let mut v = viewer();
            v.drain_load_requests();
            let before = composition(&v);
            let graph_before = v.graph().len();
            let passes_before = v.passes().passes().to_vec();

            v.toggle(id);
            v.toggle(id);

            assert_eq!(composition(&v), before, "toggle {id} twice");
            assert_eq!(v.graph().len(), graph_before);
            assert_eq!(v.passes().passes(), passes_before.as_slice());
            assert!(v.drain_load_requests().is_empty());
        }
    }

    #[test]
    fn test_light_toggle_detaches_node() {
        let mut v = viewer();
        let outcome = v.toggle(ToggleId::LightB);
        assert_eq!(outcome, ToggleOutcome { id: ToggleId::LightB, active: false });
        assert!(!v.is_light_present(LightKey::B));
        assert_eq!(v.graph().len(), 2);

        let mut names = Vec::new();
        v.graph().traverse(&mut |node| names.push(node.name.clone()));
        assert!(!names.contains(&LightKey::B.label().to_string()));
    }

    #[test]
    fn test_toggle_by_trigger_id() {
        let mut v = viewer();
        let outcome = v.toggle_by_trigger("toggleAutoRotate").unwrap();
        assert!(!outcome.active);
        assert!(!v.controls().auto_rotate());
        assert!(v.toggle_by_trigger("unknownButton").is_none());
    }

    #[test]
    fn test_secondary_model_attaches_with_fixed_transform() {
        let mut v = viewer();
        let ticket = load_secondary(&mut v);
        assert_eq!(ticket.path, "public/townhall/scene.gltf");
        assert!(v.is_active(ToggleId::SecondaryModel));
        assert!(!v.is_model_present(ModelRole::Secondary));

        let completion = v.finish_load(ticket, Ok(model_tree("townhall")));
        assert!(matches!(completion, LoadCompletion::Attached(_)));
        assert!(v.is_active(ToggleId::SecondaryModel));
        assert_eq!(v.model_state(ModelRole::Secondary), LoadState::Loaded);

        let mut count = 0;
        v.graph().traverse(&mut |node| {
            if node.name == "townhall" {
                count += 1;
            }
        });
        assert_eq!(count, 1);

        let node = v.model_node(ModelRole::Secondary).unwrap();
        assert_eq!(
            node.transform,
            NodeTransform::new(Vec3::splat(10.8), Vec3::new(-15.0, -12.0, 10.0))
        );
        for flags in node.mesh_flags() {
            assert!(flags.cast_shadow);
            assert!(flags.receive_shadow);
            assert!(!flags.bloom_eligible);
        }
    }

    #[test]
    fn test_primary_model_flags_and_transform() {
        let mut v = viewer();
        let ticket = v.drain_load_requests().remove(0);
        assert_eq!(ticket.model, ModelRole::Primary);
        assert_eq!(ticket.path, "public/millennium_falcon/scene.gltf");
        v.report_progress(&ticket, LoadProgress::new(5, 10));
        assert_eq!(v.loading_overlay(), Some(LoadProgress::new(5, 10)));

        v.finish_load(ticket, Ok(model_tree("falcon")));
        assert_eq!(v.loading_overlay(), None);

        let node = v.model_node(ModelRole::Primary).unwrap();
        assert_eq!(node.transform.scale, Vec3::splat(0.01));
        assert_eq!(node.transform.position, Vec3::new(0.0, 1.05, -1.0));
        assert_eq!(node.mesh_count(), 2);
        for flags in node.mesh_flags() {
            assert!(flags.cast_shadow && flags.receive_shadow && flags.bloom_eligible);
        }
    }

    #[test]
    fn test_present_secondary_is_always_removed() {
        let mut v = viewer();
        let ticket = load_secondary(&mut v);
        v.finish_load(ticket, Ok(model_tree("townhall")));

        let outcome = v.toggle(ToggleId::SecondaryModel);
        assert!(!outcome.active);
        assert!(!v.is_model_present(ModelRole::Secondary));
        assert_eq!(v.model_state(ModelRole::Secondary), LoadState::NotLoaded);
        assert!(v.drain_load_requests().is_empty());

        // Reload is allowed afterwards
        let again = load_secondary(&mut v);
        assert!(matches!(
            v.finish_load(again, Ok(model_tree("townhall"))),
            LoadCompletion::Attached(_)
        ));
    }

    #[test]
    fn test_toggle_while_loading_cancels() {
        let mut v = viewer();
        v.drain_load_requests();
        let before = composition(&v);

        let first = v.toggle(ToggleId::SecondaryModel);
        assert!(first.active);
        let ticket = v.drain_load_requests().remove(0);

        let second = v.toggle(ToggleId::SecondaryModel);
        assert!(!second.active);
        assert_eq!(second.active, v.is_active(ToggleId::SecondaryModel));
        assert_eq!(v.model_state(ModelRole::Secondary), LoadState::NotLoaded);

        // The fetch settles after the cancel
        assert_eq!(
            v.finish_load(ticket, Ok(model_tree("townhall"))),
            LoadCompletion::Stale
        );
        assert!(!v.is_model_present(ModelRole::Secondary));
        assert_eq!(composition(&v), before);
    }

    #[test]
    fn test_reactivation_keeps_single_load() {
        let mut v = viewer();
        v.drain_load_requests();
        v.toggle(ToggleId::SecondaryModel);
        let first = v.drain_load_requests().remove(0);
        v.toggle(ToggleId::SecondaryModel);
        v.toggle(ToggleId::SecondaryModel);

        let requests = v.drain_load_requests();
        assert_eq!(requests.len(), 1);
        let latest = requests[0].clone();
        assert!(latest.generation > first.generation);

        assert_eq!(
            v.finish_load(first, Ok(model_tree("townhall"))),
            LoadCompletion::Stale
        );
        assert!(matches!(
            v.finish_load(latest.clone(), Ok(model_tree("townhall"))),
            LoadCompletion::Attached(_)
        ));
        // A second completion for the same ticket is ignored
        assert_eq!(
            v.finish_load(latest, Ok(model_tree("townhall"))),
            LoadCompletion::Stale
        );

        let mut copies = 0;
        v.graph().traverse(&mut |node| {
            if node.name == "townhall" {
                copies += 1;
            }
        });
        assert_eq!(copies, 1);
        assert!(v.is_active(ToggleId::SecondaryModel));
    }

    #[test]
    fn test_failed_load_leaves_scene_unchanged() {
        let mut v = viewer();
        v.drain_load_requests();
        let ids_before = v.graph().ids();

        let ticket = load_secondary(&mut v);
        let completion = v.finish_load(
            ticket,
            Err(AssetLoadError::Fetch {
                path: "public/townhall/scene.gltf".to_string(),
                reason: "404".to_string(),
            }),
        );

        assert_eq!(completion, LoadCompletion::Failed);
        assert_eq!(v.graph().ids(), ids_before);
        assert_eq!(v.load_failures().len(), 1);
        assert_eq!(v.load_failures()[0].model, ModelRole::Secondary);
        assert_eq!(v.model_state(ModelRole::Secondary), LoadState::Failed);
        assert!(!v.is_active(ToggleId::SecondaryModel));
    }

    #[test]
    fn test_resize_last_event_wins() {
        let mut v = viewer();
        v.resize(1024, 768);
        v.resize(1920, 1080);

        assert_eq!(v.viewport(), Viewport::new(1920, 1080));
        assert!((v.camera().aspect() - 1920.0 / 1080.0).abs() < f32::EPSILON);
        assert_eq!(v.passes().target_size(PassKind::Bloom), Some((1920, 1080)));
        assert_eq!(
            v.passes().target_size(PassKind::DepthOfField),
            Some((1920, 1080))
        );
    }

    #[test]
    fn test_light_b_off_depth_of_field_on_scenario() {
        let mut v = viewer();
        v.toggle(ToggleId::LightB);
        v.toggle(ToggleId::DepthOfField);

        assert!(v.is_active(ToggleId::LightA));
        assert!(!v.is_active(ToggleId::LightB));
        assert!(v.is_active(ToggleId::LightC));
        assert!(v.is_active(ToggleId::Bloom));
        assert!(v.is_active(ToggleId::DepthOfField));
        assert!(v.is_active(ToggleId::AutoRotate));

        let frame = v.tick(1.0 / 60.0);
        assert_eq!(frame.lights, vec![LightKey::A, LightKey::C]);
        assert_eq!(
            frame.passes,
            vec![PassKind::Render, PassKind::Bloom, PassKind::DepthOfField]
        );
    }

    #[test]
    fn test_tick_advances_frame_and_camera() {
        let mut v = viewer();
        let first = v.tick(1.0 / 60.0);
        let second = v.tick(1.0 / 60.0);
        assert_eq!(second.index, first.index + 1);
        // Auto-rotate is on by default
        assert_ne!(first.camera.position, second.camera.position);
    }
}
