//! Window size tracking

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::types::*;

pub struct ViewportPlugin;

impl Plugin for ViewportPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, initial_viewport.before(crate::camera::spawn_camera))
            .add_systems(Update, handle_resize.in_set(HangarSet::Input));
    }
}

fn initial_viewport(
    mut viewer: ResMut<ViewerState>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Ok(window) = windows.single() else { return };
    viewer
        .0
        .resize(window.physical_width(), window.physical_height());
}

/// Apply every window resize to the viewer, then bring the projection and
/// the backdrop in line with the final size
fn handle_resize(
    mut resized: MessageReader<WindowResized>,
    windows: Query<&Window>,
    mut viewer: ResMut<ViewerState>,
    mut projections: Query<&mut Projection, With<MainCamera>>,
    mut backdrops: Query<&mut Transform, With<Backdrop>>,
) {
    let mut any = false;
    for event in resized.read() {
        // Events carry logical sizes; the viewer tracks physical pixels
        let scale = windows
            .get(event.window)
            .map(|window| window.scale_factor())
            .unwrap_or(1.0);
        viewer.0.resize(
            (event.width * scale).round() as u32,
            (event.height * scale).round() as u32,
        );
        any = true;
    }
    if !any {
        return;
    }

    let camera = viewer.0.camera();
    for mut projection in projections.iter_mut() {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = camera.aspect();
        }
    }

    let (backdrop_width, backdrop_height) = camera.backdrop_extent(BACKDROP_DISTANCE);
    for mut transform in backdrops.iter_mut() {
        transform.scale = Vec3::new(backdrop_width, backdrop_height, 1.0);
    }
}
