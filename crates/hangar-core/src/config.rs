//! Viewer configuration loading
//!
//! Every section falls back to the built-in scene when omitted, so an empty
//! file (or no file at all) reproduces the default hangar.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::controls::ControlSettings;
use crate::lights::{LightKey, LightSpec};
use crate::model::{ModelRole, ModelSpec};
use crate::passes::{BloomSettings, DepthOfFieldSettings};
use crate::viewport::CameraSettings;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub controls: ControlSettings,
    #[serde(default)]
    pub lights: LightsConfig,
    #[serde(default)]
    pub passes: PassesConfig,
    #[serde(default)]
    pub models: ModelsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// CSS selector of the canvas to render into on the web
    #[serde(default)]
    pub canvas: Option<String>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            canvas: None,
        }
    }
}

fn default_title() -> String {
    "Hangar".to_string()
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Image shown behind the scene, loaded once at startup
    #[serde(default = "default_background")]
    pub background_image: Option<String>,
    /// 0xRRGGBB
    #[serde(default)]
    pub clear_color: u32,
    /// Root directory assets are resolved against
    #[serde(default = "default_asset_root")]
    pub asset_root: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background_image: default_background(),
            clear_color: 0x000000,
            asset_root: default_asset_root(),
        }
    }
}

fn default_background() -> Option<String> {
    Some("night2.jpg".to_string())
}

fn default_asset_root() -> String {
    "assets".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightsConfig {
    #[serde(default = "default_light_a")]
    pub a: LightSpec,
    #[serde(default = "default_light_b")]
    pub b: LightSpec,
    #[serde(default = "default_light_c")]
    pub c: LightSpec,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            a: default_light_a(),
            b: default_light_b(),
            c: default_light_c(),
        }
    }
}

impl LightsConfig {
    pub fn get(&self, key: LightKey) -> &LightSpec {
        match key {
            LightKey::A => &self.a,
            LightKey::B => &self.b,
            LightKey::C => &self.c,
        }
    }
}

fn default_light_a() -> LightSpec {
    LightSpec::default_for(LightKey::A)
}

fn default_light_b() -> LightSpec {
    LightSpec::default_for(LightKey::B)
}

fn default_light_c() -> LightSpec {
    LightSpec::default_for(LightKey::C)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassesConfig {
    #[serde(default)]
    pub bloom: BloomSettings,
    /// Bloom pass in the list at startup
    #[serde(default = "default_true")]
    pub bloom_enabled: bool,
    #[serde(default)]
    pub depth_of_field: DepthOfFieldSettings,
    #[serde(default)]
    pub depth_of_field_enabled: bool,
}

impl Default for PassesConfig {
    fn default() -> Self {
        Self {
            bloom: BloomSettings::default(),
            bloom_enabled: true,
            depth_of_field: DepthOfFieldSettings::default(),
            depth_of_field_enabled: false,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_primary")]
    pub primary: ModelSpec,
    #[serde(default = "default_secondary")]
    pub secondary: ModelSpec,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
        }
    }
}

impl ModelsConfig {
    pub fn get(&self, role: ModelRole) -> &ModelSpec {
        match role {
            ModelRole::Primary => &self.primary,
            ModelRole::Secondary => &self.secondary,
        }
    }
}

fn default_primary() -> ModelSpec {
    ModelSpec::default_for(ModelRole::Primary)
}

fn default_secondary() -> ModelSpec {
    ModelSpec::default_for(ModelRole::Secondary)
}

/// Load configuration from file, using defaults when it does not exist
pub fn load_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: ViewerConfig = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(ViewerConfig::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(&ViewerConfig::default())?;
    std::fs::write(path, content)?;
    Ok(())
}
