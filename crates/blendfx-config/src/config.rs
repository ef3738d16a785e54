//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Blend layer binding settings.
    pub layers: LayerConfig,
    /// Timed effect settings.
    pub effects: EffectConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Blend layer binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayerConfig {
    /// Force `Repeat` wrap on layer textures for triplanar sampling.
    pub triplanar: bool,
    /// On a layer index change, drop registered materials whose definition
    /// does not declare the new `_BlendVec` parameter.
    pub revalidate_on_index_change: bool,
}

/// How the HSV cycle keeps hue inside the unit range after an update.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum HueWrap {
    /// Euclidean remainder: `1.2` becomes `0.2`.
    #[default]
    Wrap,
    /// Legacy formula: overflow becomes `1.0 - hue`, underflow `hue + 1.0`.
    Reflect,
}

/// Timed effect configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectConfig {
    /// Hue boundary policy for HSV cycling.
    pub hue_wrap: HueWrap,
    /// Duration of the default HSV cycle effect in seconds.
    pub hsv_duration_secs: f32,
    /// Hue advance per second.
    pub hue_cycle_speed: f32,
    /// Saturation written to the layer when an HSV effect attaches.
    pub saturation_change: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            triplanar: true,
            revalidate_on_index_change: true,
        }
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            hue_wrap: HueWrap::Wrap,
            hsv_duration_secs: 8.0,
            hue_cycle_speed: 0.5,
            saturation_change: 0.35,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for this project, if the platform has one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("blendfx"))
}

// --- Load / Save / Reload ---

/// File name of the persisted config inside the config directory.
const CONFIG_FILE: &str = "config.ron";

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError {
    let path = path.to_path_buf();
    move |source| ConfigError::Write { path, source }
}

impl Config {
    /// Load `config.ron` from `config_dir`, writing defaults there if it is missing.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default config to {}", path.display());
            return Ok(config);
        }

        let config = read_config(&path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write this config to `config_dir/config.ron`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(write_error(config_dir))?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        let path = config_dir.join(CONFIG_FILE);
        std::fs::write(&path, serialized).map_err(write_error(&path))
    }

    /// Re-read the file. Returns `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = read_config(&config_dir.join(CONFIG_FILE))?;
        if fresh == *self {
            return Ok(None);
        }
        log::info!("Config changed on disk");
        Ok(Some(fresh))
    }
}
