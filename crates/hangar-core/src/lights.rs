//! Spot light definitions

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The three toggleable spot lights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LightKey {
    A,
    B,
    C,
}

impl LightKey {
    pub const ALL: [LightKey; 3] = [LightKey::A, LightKey::B, LightKey::C];

    pub fn label(self) -> &'static str {
        match self {
            LightKey::A => "Spotlight A",
            LightKey::B => "Spotlight B",
            LightKey::C => "Spotlight C",
        }
    }
}

/// Spot light parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSpec {
    /// sRGB colour as 0xRRGGBB
    pub color: u32,
    pub intensity: f32,
    /// Maximum reach of the light
    pub range: f32,
    /// Cone half-angle in radians
    pub angle: f32,
    pub position: Vec3,
    pub cast_shadow: bool,
    pub shadow_bias: f32,
    /// Present in the scene at startup
    #[serde(default = "default_true")]
    pub initially_on: bool,
}

fn default_true() -> bool {
    true
}

impl LightSpec {
    /// Colour split into 0.0-1.0 sRGB channels
    pub fn rgb(&self) -> [f32; 3] {
        let r = ((self.color >> 16) & 0xff) as f32 / 255.0;
        let g = ((self.color >> 8) & 0xff) as f32 / 255.0;
        let b = (self.color & 0xff) as f32 / 255.0;
        [r, g, b]
    }

    pub fn default_for(key: LightKey) -> Self {
        match key {
            LightKey::A => Self {
                color: 0xff0090,
                intensity: 1000.0,
                range: 100.0,
                angle: std::f32::consts::PI / 10.0,
                position: Vec3::new(5.0, 15.0, -10.0),
                cast_shadow: true,
                shadow_bias: -0.0011,
                initially_on: true,
            },
            LightKey::B => Self {
                color: 0xffe76f,
                intensity: 1500.0,
                range: 100.0,
                angle: std::f32::consts::PI / 6.0,
                position: Vec3::new(5.0, 15.0, -10.0),
                cast_shadow: true,
                shadow_bias: -0.0011,
                initially_on: true,
            },
            LightKey::C => Self {
                color: 0x002fff,
                intensity: 5500.0,
                range: 100.0,
                angle: std::f32::consts::PI / 6.0,
                position: Vec3::new(10.0, 35.0, -10.0),
                cast_shadow: true,
                shadow_bias: -0.0001,
                initially_on: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_split() {
        let spec = LightSpec::default_for(LightKey::A);
        let [r, g, b] = spec.rgb();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert!((b - 0x90 as f32 / 255.0).abs() < f32::EPSILON);
    }
}
