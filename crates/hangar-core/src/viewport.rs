//! Perspective camera and display-size tracking

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective camera settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 1.0,
            far: 1000.0,
            position: Vec3::new(4.0, 4.0, 5.0),
        }
    }
}

/// Camera projection state kept consistent with the viewport
#[derive(Debug, Clone)]
pub struct CameraState {
    pub settings: CameraSettings,
    aspect: f32,
    projection: Mat4,
}

impl CameraState {
    pub fn new(settings: CameraSettings, width: u32, height: u32) -> Self {
        let mut camera = Self {
            settings,
            aspect: 1.0,
            projection: Mat4::IDENTITY,
        };
        camera.set_aspect(width, height);
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fov_y(&self) -> f32 {
        self.settings.fov_degrees.to_radians()
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Recompute aspect and projection for a new display size
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
        self.projection = Mat4::perspective_rh(
            self.fov_y(),
            self.aspect,
            self.settings.near,
            self.settings.far,
        );
    }

    /// Width and height of a camera-facing quad that exactly fills the view
    /// at `distance` in front of the camera
    pub fn backdrop_extent(&self, distance: f32) -> (f32, f32) {
        let height = 2.0 * distance * (self.fov_y() / 2.0).tan();
        (height * self.aspect, height)
    }
}

/// Display area size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Zero dimensions are clamped to one pixel
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}
