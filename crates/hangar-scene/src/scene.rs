//! Scene setup - clear colour, spot lights, toggles and the per-frame tick

use bevy::prelude::*;
use hangar_core::{LightKey, LightSpec};

use crate::types::*;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, apply_clear_color)
            .add_systems(Update, apply_toggle_requests.in_set(HangarSet::Toggles))
            .add_systems(Update, tick_viewer.in_set(HangarSet::Tick))
            .add_systems(Update, sync_lights.in_set(HangarSet::Sync));
    }
}

fn apply_clear_color(mut commands: Commands, viewer: Res<ViewerState>) {
    commands.insert_resource(ClearColor(color_from_hex(viewer.0.clear_color())));
}

fn apply_toggle_requests(
    mut requests: MessageReader<ToggleRequested>,
    mut viewer: ResMut<ViewerState>,
) {
    for ToggleRequested(id) in requests.read() {
        viewer.0.toggle(*id);
    }
}

pub(crate) fn tick_viewer(time: Res<Time>, mut viewer: ResMut<ViewerState>, mut frame: ResMut<CurrentFrame>) {
    frame.0 = Some(viewer.0.tick(time.delta_secs()));
}

/// Spawn or despawn light entities to match the lights present this frame
fn sync_lights(
    mut commands: Commands,
    frame: Res<CurrentFrame>,
    viewer: Res<ViewerState>,
    lights: Query<(Entity, &SceneLight)>,
) {
    let Some(frame) = &frame.0 else { return };

    for key in LightKey::ALL {
        let wanted = frame.lights.contains(&key);
        let existing = lights.iter().find(|(_, light)| light.0 == key);
        match (wanted, existing) {
            (true, None) => {
                let Some(spec) = viewer.0.light_spec(key) else { continue };
                commands.spawn(spot_light_bundle(key, spec));
            }
            (false, Some((entity, _))) => {
                commands.entity(entity).despawn();
            }
            _ => {}
        }
    }
}

/// Light intensities are configured in candela; Bevy wants lumens.
///
/// Shadow bias is configured in normalized shadow-map depth, which spans the
/// light's range, and is negative when it pulls the lookup toward the light.
/// The cone has full penumbra, so the inner angle is zero.
fn spot_light_bundle(key: LightKey, spec: &LightSpec) -> impl Bundle {
    let [r, g, b] = spec.rgb();
    (
        SpotLight {
            color: Color::srgb(r, g, b),
            intensity: spec.intensity * 4.0 * std::f32::consts::PI,
            range: spec.range,
            outer_angle: spec.angle,
            inner_angle: 0.0,
            shadows_enabled: spec.cast_shadow,
            shadow_depth_bias: -spec.shadow_bias * spec.range,
            ..default()
        },
        Transform::from_translation(to_bevy(spec.position)).looking_at(Vec3::ZERO, Vec3::Y),
        SceneLight(key),
        Name::new(key.label()),
    )
}
