//! Main camera, backdrop, orbit input and post-processing components

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::post_process::bloom::{Bloom, BloomPrefilter};
use bevy::post_process::dof::{DepthOfField, DepthOfFieldMode};
use bevy::prelude::*;
use hangar_core::{BloomSettings, DepthOfFieldSettings, PassKind};

use crate::types::*;

/// Pixel-unit scroll deltas per line of zoom
const PIXELS_PER_LINE: f32 = 100.0;

/// Plugin for the camera and its passes
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(Update, orbit_input.in_set(HangarSet::Input))
            .add_systems(
                Update,
                (apply_camera_pose, sync_post_processing).in_set(HangarSet::Sync),
            );
    }
}

pub(crate) fn spawn_camera(
    mut commands: Commands,
    viewer: Res<ViewerState>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let viewer = &viewer.0;
    let camera = viewer.camera();
    let pose = viewer.controls().pose();

    let mut entity = commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_y(),
            near: camera.settings.near,
            far: camera.settings.far,
            aspect_ratio: camera.aspect(),
        }),
        Transform::from_translation(to_bevy(pose.position))
            .looking_at(to_bevy(pose.target), Vec3::Y),
        MainCamera,
    ));

    if let Some(image) = viewer.background_image() {
        let (width, height) = camera.backdrop_extent(BACKDROP_DISTANCE);
        let material = materials.add(StandardMaterial {
            base_color_texture: Some(asset_server.load(image.to_string())),
            unlit: true,
            ..default()
        });
        entity.with_children(|parent| {
            parent.spawn((
                Mesh3d(meshes.add(Rectangle::new(1.0, 1.0))),
                MeshMaterial3d(material),
                Transform::from_xyz(0.0, 0.0, -BACKDROP_DISTANCE)
                    .with_scale(Vec3::new(width, height, 1.0)),
                bevy::pbr::NotShadowCaster,
                bevy::pbr::NotShadowReceiver,
                Backdrop,
            ));
        });
        tracing::debug!(image, "Backdrop spawned");
    }
}

/// Feed pointer drags and wheel steps into the orbit controls
fn orbit_input(
    mut viewer: ResMut<ViewerState>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut contexts: bevy_egui::EguiContexts,
) {
    // Check if egui wants the mouse - if so, don't process camera controls
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }
    let mut zoom_steps = 0.0;
    for scroll in mouse_wheel.read() {
        zoom_steps += match scroll.unit {
            MouseScrollUnit::Line => scroll.y,
            MouseScrollUnit::Pixel => scroll.y / PIXELS_PER_LINE,
        };
    }

    if egui_wants_pointer {
        return;
    }

    let viewer = &mut viewer.0;
    let height = viewer.viewport().height as f32;
    let fov_y = viewer.camera().fov_y();
    let controls = viewer.controls_mut();

    if mouse_button.pressed(MouseButton::Left) {
        controls.rotate_by(total_motion.x, total_motion.y, height);
    }
    if mouse_button.pressed(MouseButton::Right) {
        controls.pan_by(total_motion.x, total_motion.y, height, fov_y);
    }
    if zoom_steps != 0.0 {
        controls.zoom_by(zoom_steps);
    }
}

fn apply_camera_pose(
    frame: Res<CurrentFrame>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    let Some(frame) = &frame.0 else { return };
    for mut transform in camera_query.iter_mut() {
        transform.translation = to_bevy(frame.camera.position);
        transform.look_at(to_bevy(frame.camera.target), Vec3::Y);
    }
}

/// Insert or remove the bloom and depth-of-field components so the camera
/// runs exactly the passes in the frame's pass list
fn sync_post_processing(
    mut commands: Commands,
    frame: Res<CurrentFrame>,
    viewer: Res<ViewerState>,
    camera_query: Query<(Entity, Has<Bloom>, Has<DepthOfField>), With<MainCamera>>,
) {
    let Some(frame) = &frame.0 else { return };
    let want_bloom = frame.passes.contains(&PassKind::Bloom);
    let want_dof = frame.passes.contains(&PassKind::DepthOfField);

    for (entity, has_bloom, has_dof) in camera_query.iter() {
        let mut camera = commands.entity(entity);
        match (want_bloom, has_bloom) {
            (true, false) => {
                camera.insert(bloom_component(viewer.0.bloom_settings()));
            }
            (false, true) => {
                camera.remove::<Bloom>();
            }
            _ => {}
        }
        match (want_dof, has_dof) {
            (true, false) => {
                camera.insert(depth_of_field_component(viewer.0.depth_of_field_settings()));
            }
            (false, true) => {
                camera.remove::<DepthOfField>();
            }
            _ => {}
        }
    }
}

/// Map unreal-bloom style parameters onto Bevy's bloom
pub fn bloom_component(settings: &BloomSettings) -> Bloom {
    Bloom {
        intensity: settings.strength / 30.0,
        low_frequency_boost: settings.radius,
        prefilter: BloomPrefilter {
            threshold: settings.threshold,
            threshold_softness: 0.0,
        },
        ..Bloom::NATURAL
    }
}

/// Map bokeh parameters onto Bevy's depth of field
pub fn depth_of_field_component(settings: &DepthOfFieldSettings) -> DepthOfField {
    DepthOfField {
        mode: DepthOfFieldMode::Bokeh,
        focal_distance: settings.focus,
        aperture_f_stops: 1.0 / (settings.aperture * 1000.0).max(f32::EPSILON),
        max_circle_of_confusion_diameter: settings.max_blur * 6400.0,
        ..default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tick_viewer;
    use hangar_core::{ToggleId, Viewer, ViewerConfig, Viewport};

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(ViewerState(Viewer::new(
                &ViewerConfig::default(),
                Viewport::default(),
            )))
            .init_resource::<CurrentFrame>()
            .add_systems(Update, (tick_viewer, sync_post_processing).chain());
        app
    }

    fn passes_on(app: &App, camera: Entity) -> (bool, bool) {
        let world = app.world();
        (
            world.get::<Bloom>(camera).is_some(),
            world.get::<DepthOfField>(camera).is_some(),
        )
    }

    fn toggle(app: &mut App, id: ToggleId) {
        app.world_mut().resource_mut::<ViewerState>().0.toggle(id);
    }

    #[test]
    fn test_camera_components_follow_pass_list() {
        let mut app = test_app();
        let camera = app.world_mut().spawn(MainCamera).id();

        app.update();
        assert_eq!(passes_on(&app, camera), (true, false));

        toggle(&mut app, ToggleId::DepthOfField);
        app.update();
        assert_eq!(passes_on(&app, camera), (true, true));

        toggle(&mut app, ToggleId::Bloom);
        app.update();
        assert_eq!(passes_on(&app, camera), (false, true));

        toggle(&mut app, ToggleId::Bloom);
        toggle(&mut app, ToggleId::DepthOfField);
        app.update();
        assert_eq!(passes_on(&app, camera), (true, false));
    }

    #[test]
    fn test_bloom_settings_reach_the_component() {
        let mut app = test_app();
        let camera = app.world_mut().spawn(MainCamera).id();
        app.update();

        let bloom = app.world().get::<Bloom>(camera).map(|b| b.prefilter.threshold);
        assert_eq!(bloom, Some(0.85));
    }

    #[test]
    fn test_bloom_mapping() {
        let bloom = bloom_component(&BloomSettings::default());
        assert!((bloom.intensity - 0.15).abs() < 1e-6);
        assert_eq!(bloom.prefilter.threshold, 0.85);
    }

    #[test]
    fn test_depth_of_field_mapping() {
        let dof = depth_of_field_component(&DepthOfFieldSettings::default());
        assert_eq!(dof.focal_distance, 1.0);
        assert!((dof.aperture_f_stops - 4.0).abs() < 1e-4);
        assert!((dof.max_circle_of_confusion_diameter - 64.0).abs() < 1e-4);
    }
}
