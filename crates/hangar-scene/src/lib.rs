//! Hangar Scene - Bevy rendering of the Hangar viewer state
//!
//! `hangar-core` decides what the scene contains; the plugins here mirror
//! that state into entities once per frame and feed input, window resizes
//! and asset-server events back into it.

pub mod camera;
pub mod models;
pub mod scene;
pub mod types;
pub mod ui;
pub mod viewport;

use bevy::prelude::*;
use hangar_core::{Viewer, ViewerConfig, Viewport};

/// Plugin that composes the viewer scene, its loaders and its UI
pub struct HangarScenePlugin {
    pub config: ViewerConfig,
}

impl Plugin for HangarScenePlugin {
    fn build(&self, app: &mut App) {
        let viewport = Viewport::new(self.config.window.width, self.config.window.height);

        app.insert_resource(ViewerState(Viewer::new(&self.config, viewport)))
            .init_resource::<CurrentFrame>()
            .add_message::<ToggleRequested>()
            .configure_sets(
                Update,
                (
                    HangarSet::Input,
                    HangarSet::Toggles,
                    HangarSet::Loads,
                    HangarSet::Tick,
                    HangarSet::Sync,
                )
                    .chain(),
            )
            .add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(viewport::ViewportPlugin)
            .add_plugins(ui::UiPlugin);
    }
}

// Re-export commonly used types
pub use types::*;
