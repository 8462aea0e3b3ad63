//! Resources, messages and markers shared by the scene plugins

use bevy::prelude::*;
use hangar_core::{Frame, LightKey, ModelRole, NodeId, ToggleId, Viewer};

/// The viewer state every plugin mirrors into the ECS
#[derive(Resource)]
pub struct ViewerState(pub Viewer);

/// Snapshot produced by the most recent tick
#[derive(Resource, Default)]
pub struct CurrentFrame(pub Option<Frame>);

/// A toggle was activated from the UI
#[derive(Message, Debug, Clone, Copy)]
pub struct ToggleRequested(pub ToggleId);

/// Per-frame ordering of the viewer systems
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HangarSet {
    /// Pointer, keyboard and window input
    Input,
    /// Queued toggles applied to the viewer
    Toggles,
    /// Asset loads started and polled
    Loads,
    /// Controls advanced and frame snapshot taken
    Tick,
    /// ECS brought in line with the snapshot
    Sync,
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Textured quad behind everything else, parented to the camera
#[derive(Component)]
pub struct Backdrop;

/// Entity rendering one of the spot lights
#[derive(Component)]
pub struct SceneLight(pub LightKey);

/// Root entity of a spawned model scene
#[derive(Component)]
pub struct ModelRoot {
    pub role: ModelRole,
    /// Graph node this entity renders
    pub node: NodeId,
}

/// Mesh that belongs to a model whose policy marks it for bloom
#[derive(Component)]
pub struct BloomEligible;

/// Distance from the camera at which the backdrop quad sits
pub const BACKDROP_DISTANCE: f32 = 900.0;

/// Convert a 0xRRGGBB value to a Bevy colour
pub fn color_from_hex(hex: u32) -> Color {
    Color::srgb_u8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Convert between the core math types and Bevy's
pub fn to_bevy(v: hangar_core::glam::Vec3) -> Vec3 {
    Vec3::from_array(v.to_array())
}

pub fn from_bevy(v: Vec3) -> hangar_core::glam::Vec3 {
    hangar_core::glam::Vec3::from_array(v.to_array())
}
