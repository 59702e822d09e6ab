// ABOUTME: Optional per-user settings file for launcher defaults
// Loads ~/.geodesic/config.toml; command line and environment always take precedence

use super::ConfigError;
use crate::cli::Invocation;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Defaults read from `~/.geodesic/config.toml`. Every field is optional.
///
/// ```toml
/// image = "cloudposse/geodesic"   # repository, without tag
/// tag = "latest"
/// name = "geodesic"
/// dns = "1.1.1.1"
/// env_file = "/home/me/.geodesic/extra.env"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Image repository used when `--image` is not given
    pub image: Option<String>,
    pub tag: Option<String>,
    /// Container name used when neither `DOCKER_NAME` nor `--name` is set
    pub name: Option<String>,
    pub dns: Option<String>,
    pub env_file: Option<String>,
}

impl Settings {
    pub fn settings_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".geodesic").join("config.toml"))
    }

    /// Load `path` only when a requested target uses the settings; `help`
    /// alone never reads the file.
    pub fn load_for(invocation: &Invocation, path: &Path) -> Result<Self, ConfigError> {
        if !invocation.needs_runtime() {
            debug!("Skipping settings file, no target needs it");
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No settings file at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
