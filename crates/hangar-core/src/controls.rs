//! Orbit camera controls with damping and auto-rotation
//!
//! The camera sits on a sphere around `target`. Input accumulates rotate,
//! zoom and pan deltas; [`OrbitControls::update`] applies a damped share of
//! them every frame and decays the rest.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Orbit controller settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits in radians, measured from +Y
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_pan: bool,
    pub auto_rotate: bool,
    /// 2.0 = one orbit every 30 seconds
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            target: Vec3::new(0.0, 1.0, 0.0),
            min_distance: 5.0,
            max_distance: 70.0,
            min_polar_angle: 0.5,
            max_polar_angle: 1.5,
            enable_damping: true,
            damping_factor: 0.05,
            enable_pan: true,
            auto_rotate: true,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

/// Camera placement produced by the controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Azimuth around +Y, from +Z towards +X
    theta: f32,
    /// Polar angle from +Y
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius: 0.0,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbit controller state
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub settings: ControlSettings,
    target: Vec3,
    spherical: Spherical,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    pub fn new(settings: ControlSettings, camera_position: Vec3) -> Self {
        let target = settings.target;
        let mut controls = Self {
            spherical: Spherical::from_offset(camera_position - target),
            target,
            settings,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        };
        controls.clamp();
        controls
    }

    pub fn auto_rotate(&self) -> bool {
        self.settings.auto_rotate
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.settings.auto_rotate = enabled;
    }

    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    pub fn azimuth(&self) -> f32 {
        self.spherical.theta
    }

    pub fn polar_angle(&self) -> f32 {
        self.spherical.phi
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.target + self.spherical.to_offset(),
            target: self.target,
        }
    }

    /// Queue an orbit from a pointer drag measured in pixels
    pub fn rotate_by(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.delta_theta -= 2.0 * PI * dx / height * self.settings.rotate_speed;
        self.delta_phi -= 2.0 * PI * dy / height * self.settings.rotate_speed;
    }

    /// Queue a zoom; positive steps move the camera closer
    pub fn zoom_by(&mut self, steps: f32) {
        let factor = 0.95_f32.powf(self.settings.zoom_speed);
        self.scale *= factor.powf(steps);
    }

    /// Queue a pan from a pointer drag measured in pixels
    pub fn pan_by(&mut self, dx: f32, dy: f32, viewport_height: f32, fov_y: f32) {
        if !self.settings.enable_pan {
            return;
        }
        let height = viewport_height.max(1.0);
        let pose = self.pose();
        let forward = (pose.target - pose.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let target_distance = self.spherical.radius * (fov_y / 2.0).tan();
        self.pan_offset -= right * (2.0 * dx * target_distance / height);
        self.pan_offset += up * (2.0 * dy * target_distance / height);
    }

    /// Advance interpolation by `dt` seconds
    pub fn update(&mut self, dt: f32) -> CameraPose {
        if self.settings.auto_rotate {
            self.delta_theta -= 2.0 * PI / 60.0 * self.settings.auto_rotate_speed * dt;
        }

        let damping = if self.settings.enable_damping {
            self.settings.damping_factor
        } else {
            1.0
        };

        self.spherical.theta += self.delta_theta * damping;
        self.spherical.phi += self.delta_phi * damping;
        self.target += self.pan_offset * damping;
        self.spherical.radius *= self.scale;
        self.clamp();

        if self.settings.enable_damping {
            let keep = 1.0 - damping;
            self.delta_theta *= keep;
            self.delta_phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        self.pose()
    }

    fn clamp(&mut self) {
        let s = &self.settings;
        self.spherical.phi = self
            .spherical
            .phi
            .clamp(s.min_polar_angle, s.max_polar_angle)
            .clamp(f32::EPSILON, PI - f32::EPSILON);
        self.spherical.radius = self.spherical.radius.clamp(s.min_distance, s.max_distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn still() -> OrbitControls {
        OrbitControls::new(
            ControlSettings {
                auto_rotate: false,
                ..ControlSettings::default()
            },
            Vec3::new(4.0, 4.0, 5.0),
        )
    }

    #[test]
    fn test_initial_pose_matches_camera_position() {
        let controls = still();
        let pose = controls.pose();
        assert_relative_eq!(pose.position.x, 4.0, epsilon = 1e-4);
        assert_relative_eq!(pose.position.y, 4.0, epsilon = 1e-4);
        assert_relative_eq!(pose.position.z, 5.0, epsilon = 1e-4);
        assert_eq!(pose.target, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_idle_controls_do_not_drift() {
        let mut controls = still();
        let before = controls.pose();
        for _ in 0..120 {
            controls.update(1.0 / 60.0);
        }
        assert_relative_eq!(controls.pose().position.x, before.position.x, epsilon = 1e-4);
        assert_relative_eq!(controls.pose().position.z, before.position.z, epsilon = 1e-4);
    }

    #[test]
    fn test_rotation_is_damped_then_converges() {
        let mut controls = still();
        let start = controls.azimuth();
        controls.rotate_by(-100.0, 0.0, 1000.0);
        let expected = 2.0 * PI * 100.0 / 1000.0;

        controls.update(1.0 / 60.0);
        assert_relative_eq!(controls.azimuth() - start, expected * 0.05, epsilon = 1e-5);

        for _ in 0..600 {
            controls.update(1.0 / 60.0);
        }
        assert_relative_eq!(controls.azimuth() - start, expected, epsilon = 1e-3);
    }

    #[test]
    fn test_auto_rotate_turns_camera() {
        let mut controls = still();
        controls.set_auto_rotate(true);
        let start = controls.azimuth();
        controls.update(1.0);
        assert!(controls.azimuth() < start);
    }

    #[test]
    fn test_zoom_and_polar_limits() {
        let mut controls = still();
        controls.zoom_by(-200.0);
        controls.update(1.0 / 60.0);
        assert_relative_eq!(controls.distance(), 70.0);

        controls.zoom_by(200.0);
        controls.update(1.0 / 60.0);
        assert_relative_eq!(controls.distance(), 5.0);

        controls.rotate_by(0.0, -10_000.0, 100.0);
        for _ in 0..200 {
            controls.update(1.0 / 60.0);
        }
        assert!(controls.polar_angle() <= 1.5 + f32::EPSILON);
    }

    #[test]
    fn test_pan_moves_target() {
        let mut controls = still();
        controls.pan_by(50.0, 0.0, 600.0, 45f32.to_radians());
        for _ in 0..600 {
            controls.update(1.0 / 60.0);
        }
        assert_ne!(controls.pose().target, Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(controls.pose().target.y, 1.0, epsilon = 1e-3);
    }
}
