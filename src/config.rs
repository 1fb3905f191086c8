//! Configuration system for renderer settings
//!
//! Loads settings from `config/orrery.json`, or writes the defaults there
//! when the file is missing. Every section is optional in the JSON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    gfx::resources::lights::{DirectionalLight, PointLight},
};

pub const DEFAULT_CONFIG_PATH: &str = "config/orrery.json";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrreryConfig {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub lighting: LightingSettings,
    pub assets: AssetSettings,
    pub animation: AnimationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Fifo presentation when enabled, Immediate/Mailbox otherwise
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1366,
            height: 768,
            title: "Orrery".to_string(),
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    /// Units per second
    pub move_speed: f32,
    /// Degrees per unit of mouse motion
    pub turn_speed: f32,
    pub fov_deg: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 5.0, 40.0],
            yaw_deg: -90.0,
            pitch_deg: -10.0,
            move_speed: 5.0,
            turn_speed: 0.5,
            fov_deg: 45.0,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    pub directional: DirectionalLight,
    /// Attached to the planet pivot; its position is relative to the pivot
    pub point: PointLight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    pub planet_model: PathBuf,
    pub cube_texture: PathBuf,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            planet_model: PathBuf::from("assets/models/planet.obj"),
            cube_texture: PathBuf::from("assets/textures/container.png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Spin rate of every animated transform
    pub deg_per_tick: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self { deg_per_tick: 1.0 }
    }
}

impl OrreryConfig {
    /// Parses a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from file, or create default if missing
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let config = Self::from_file(path)?;
            log::info!("Loaded config from {}", path.display());
            return Ok(config);
        }

        let config = Self::default();
        match config.save(path) {
            Ok(()) => log::info!("Created default config at {}", path.display()),
            Err(err) => log::warn!("Could not write default config: {}", err),
        }
        Ok(config)
    }

    /// Save configuration to file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_json() {
        let mut config = OrreryConfig::default();
        config.window.width = 800;
        config.animation.deg_per_tick = 0.25;
        config.lighting.point.position = [1.0, 2.0, 3.0];

        let json = serde_json::to_string(&config).unwrap();
        let parsed: OrreryConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "window": { "width": 640 }, "camera": { "move_speed": 12.5 } }"#;
        let config: OrreryConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 768);
        assert_eq!(config.camera.move_speed, 12.5);
        assert_eq!(config.camera.position, [0.0, 5.0, 40.0]);
        assert_eq!(config.animation, AnimationSettings::default());
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: OrreryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, OrreryConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("orrery-config-{}", std::process::id()));
        let path = dir.join("nested").join("orrery.json");

        let mut config = OrreryConfig::default();
        config.window.title = "saved".to_string();
        config.save(&path).unwrap();

        let loaded = OrreryConfig::load(&path).unwrap();
        assert_eq!(loaded.window.title, "saved");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!("orrery-bad-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();

        let err = OrreryConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        fs::remove_file(&path).unwrap();
    }
}
