//! Configuration loading

use anyhow::Result;
use paddock_core::animator::DEFAULT_SPIN_STEP;
use paddock_core::framing::DEFAULT_FOV_DEGREES;
use paddock_core::SessionSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalogue file; the built-in catalogue is used when unset
    #[serde(default)]
    pub catalogue: Option<PathBuf>,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_title() -> String {
    "Paddock".to_string()
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    800
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory catalogue model paths are resolved against
    #[serde(default = "default_assets_root")]
    pub root: PathBuf,
    /// Warm every catalogue model at startup
    #[serde(default = "default_true")]
    pub preload: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: default_assets_root(),
            preload: true,
        }
    }
}

fn default_assets_root() -> PathBuf {
    PathBuf::from("assets")
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
        }
    }
}

fn default_fov() -> f32 {
    DEFAULT_FOV_DEGREES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Yaw added per frame, in radians
    #[serde(default = "default_spin_step")]
    pub spin_step: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            spin_step: default_spin_step(),
        }
    }
}

fn default_spin_step() -> f32 {
    DEFAULT_SPIN_STEP
}

impl Config {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            fov_degrees: self.camera.fov_degrees,
            spin_step: self.animation.spin_step,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}
