//! Bevy application setup

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use hangar_core::ViewerConfig;
use hangar_scene::HangarScenePlugin;

/// Build and run the viewer until its window closes
pub fn run(config: ViewerConfig) {
    build_app(config).run();
}

pub fn build_app(config: ViewerConfig) -> App {
    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: config.window.title.clone(),
                    resolution: (config.window.width, config.window.height).into(),
                    canvas: config.window.canvas.clone(),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: config.scene.asset_root.clone(),
                // Static hosting carries no .meta files
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
            // Logging is set up by the entry points
            .disable::<LogPlugin>(),
    )
    .add_plugins(EguiPlugin::default())
    .add_plugins(HangarScenePlugin { config });
    app
}
