//! Configuration file loading with precedence handling.

use crate::config::StudyConfig;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigLoadError {
    /// Failed to read the config file (permissions, I/O).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - anything not specified falls back to the
/// hardcoded defaults. Corresponds to `~/.config/lfstudy/config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct StudyFile {
    /// Number of sub-aperture views along x.
    #[serde(default)]
    pub angular_width: Option<u32>,

    /// Number of sub-aperture views along y.
    #[serde(default)]
    pub angular_height: Option<u32>,

    /// Drag distance in UI points per grid step.
    #[serde(default)]
    pub move_unit: Option<f32>,

    /// Number of discrete focus depth planes.
    #[serde(default)]
    pub depth_resolution: Option<u32>,

    /// Default view x coordinate.
    #[serde(default)]
    pub default_x: Option<i32>,

    /// Default view y coordinate.
    #[serde(default)]
    pub default_y: Option<i32>,

    /// Ordered scene playlist.
    #[serde(default)]
    pub playlist: Option<Vec<String>>,

    /// Rating labels offered after each scene.
    #[serde(default)]
    pub answer_labels: Option<Vec<String>>,
}

/// Load a configuration file from a specific path.
///
/// Returns `Ok(None)` if the file doesn't exist (not an error - defaults
/// apply). Returns `Err` if the file exists but cannot be read or parsed.
pub fn load_study_file(path: impl Into<PathBuf>) -> Result<Option<StudyFile>, ConfigLoadError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigLoadError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let file: StudyFile = toml::from_str(&contents).map_err(|e| ConfigLoadError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(file))
}

/// Resolve the default config file path.
///
/// `~/.config/lfstudy/config.toml` on Unix, the platform equivalent
/// elsewhere. `None` if the home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lfstudy").join("config.toml"))
}

/// Resolve the default diagnostic log path.
///
/// `~/.local/state/lfstudy/lfstudy.log` on Unix-like systems, falling
/// back to the current directory if no state directory exists.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("lfstudy").join("lfstudy.log")
    } else {
        PathBuf::from("lfstudy.log")
    }
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `LFSTUDY_CONFIG` environment variable
/// 3. Default path `~/.config/lfstudy/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
pub fn load_study_file_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<StudyFile>, ConfigLoadError> {
    if let Some(path) = config_path {
        return load_study_file(path);
    }

    if let Ok(env_path) = std::env::var("LFSTUDY_CONFIG") {
        return load_study_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_study_file(default_path);
    }

    Ok(None)
}

/// Merge a loaded file into the defaults to produce a resolved config.
///
/// For each field, `Some(value)` from the file wins; otherwise the
/// default stands.
pub fn merge_study_file(file: Option<StudyFile>) -> StudyConfig {
    let defaults = StudyConfig::default();

    let Some(file) = file else {
        return defaults;
    };

    StudyConfig {
        angular_width: file.angular_width.unwrap_or(defaults.angular_width),
        angular_height: file.angular_height.unwrap_or(defaults.angular_height),
        move_unit: file.move_unit.unwrap_or(defaults.move_unit),
        depth_resolution: file.depth_resolution.unwrap_or(defaults.depth_resolution),
        default_x: file.default_x.unwrap_or(defaults.default_x),
        default_y: file.default_y.unwrap_or(defaults.default_y),
        playlist: file.playlist.unwrap_or(defaults.playlist),
        answer_labels: file.answer_labels.unwrap_or(defaults.answer_labels),
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
