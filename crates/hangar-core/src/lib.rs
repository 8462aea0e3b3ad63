//! Hangar Core - Scene composition and toggle state for the Hangar viewer
//!
//! This crate holds everything the viewer decides on its own, independent of
//! the rendering engine:
//! - Scene graph membership for lights and loaded models
//! - The ordered post-processing pass list
//! - Model load lifecycle with single-in-flight load tickets
//! - The toggle registry mapping UI triggers to scene mutations
//! - Orbit camera controls, viewport and configuration

pub mod config;
pub mod controls;
pub mod lights;
pub mod loader;
pub mod menu;
pub mod model;
pub mod passes;
pub mod scene;
pub mod toggle;
pub mod viewer;
pub mod viewport;

pub use glam;

pub use config::{ConfigError, ViewerConfig};
pub use controls::{CameraPose, ControlSettings, OrbitControls};
pub use lights::{LightKey, LightSpec};
pub use loader::{AssetLoadError, AssetPath, LoadCompletion, LoadFailure, LoadProgress, LoadTicket};
pub use menu::SettingsMenu;
pub use model::{LoadState, LoadableModel, MeshPolicy, ModelRole, ModelSpec};
pub use passes::{BloomSettings, DepthOfFieldSettings, PassKind, PassList};
pub use scene::{MeshFlags, NodeId, NodeKind, NodeTransform, SceneGraph, SceneNode};
pub use toggle::{ToggleBinding, ToggleId, ToggleOutcome, ToggleRegistry};
pub use viewer::{Frame, Viewer};
pub use viewport::{CameraSettings, CameraState, Viewport};
