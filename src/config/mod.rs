//! Study configuration.
//!
//! All tunables of a study session live here: the angular resolution of
//! the view grid, the drag distance per grid step, the number of depth
//! planes, the default view, the scene playlist and the answer-label
//! set. Values come from a TOML file merged over hardcoded defaults (see
//! [`loader`]); validation is fail-fast at session start.

pub mod loader;

pub use loader::{
    default_config_path, default_log_path, load_study_file, load_study_file_with_precedence,
    merge_study_file, ConfigLoadError, StudyFile,
};

use crate::model::{InvalidSceneName, SceneId, SubapertureIndex};
use thiserror::Error;

/// Resolved study configuration after merging defaults and file.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyConfig {
    /// Number of sub-aperture views along x.
    pub angular_width: u32,
    /// Number of sub-aperture views along y.
    pub angular_height: u32,
    /// Drag distance in UI points corresponding to one grid step.
    pub move_unit: f32,
    /// Number of discrete focus depth planes per scene.
    pub depth_resolution: u32,
    /// Default view x coordinate, shown on every scene load.
    pub default_x: i32,
    /// Default view y coordinate.
    pub default_y: i32,
    /// Ordered scene playlist. Must be non-empty to run a study.
    pub playlist: Vec<String>,
    /// Rating labels offered after each scene. Must be non-empty.
    pub answer_labels: Vec<String>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            angular_width: 15,
            angular_height: 15,
            move_unit: 20.0,
            depth_resolution: 11,
            default_x: 7,
            default_y: 7,
            playlist: Vec::new(),
            answer_labels: vec![
                "Very annoying".to_string(),
                "Annoying".to_string(),
                "Slightly annoying".to_string(),
                "Perceptible, but not annoying".to_string(),
                "Imperceptible".to_string(),
            ],
        }
    }
}

impl StudyConfig {
    /// The index every scene opens on.
    pub fn default_index(&self) -> SubapertureIndex {
        SubapertureIndex::angular(self.default_x, self.default_y)
    }

    /// Convert the playlist into validated scene ids.
    pub fn scene_playlist(&self) -> Result<Vec<SceneId>, ConfigError> {
        self.playlist
            .iter()
            .map(|name| SceneId::new(name.clone()).map_err(ConfigError::from))
            .collect()
    }

    /// Fail-fast validation of everything a session needs to run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.angular_width == 0 || self.angular_height == 0 {
            return Err(ConfigError::ZeroAngularResolution {
                width: self.angular_width,
                height: self.angular_height,
            });
        }
        if !(self.move_unit > 0.0) {
            return Err(ConfigError::NonPositiveMoveUnit {
                move_unit: self.move_unit,
            });
        }
        if self.depth_resolution == 0 {
            return Err(ConfigError::ZeroDepthResolution);
        }
        let in_grid = (0..self.angular_width as i32).contains(&self.default_x)
            && (0..self.angular_height as i32).contains(&self.default_y);
        if !in_grid {
            return Err(ConfigError::DefaultViewOutOfGrid {
                x: self.default_x,
                y: self.default_y,
            });
        }
        if self.playlist.is_empty() {
            return Err(ConfigError::EmptyPlaylist);
        }
        self.scene_playlist()?;
        if self.answer_labels.is_empty() {
            return Err(ConfigError::EmptyAnswerSet);
        }
        Ok(())
    }
}

/// Configuration that cannot run a study. Fatal at session start.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The view grid has no extent along at least one axis.
    #[error("Angular resolution must be nonzero, got {width}x{height}")]
    ZeroAngularResolution {
        /// Configured grid width.
        width: u32,
        /// Configured grid height.
        height: u32,
    },

    /// A non-positive move unit would map every drag to an unbounded or
    /// undefined number of grid steps.
    #[error("Move unit must be positive, got {move_unit}")]
    NonPositiveMoveUnit {
        /// Configured move unit.
        move_unit: f32,
    },

    /// At least one depth plane is needed for refocus bucketing.
    #[error("Depth resolution must be at least 1")]
    ZeroDepthResolution,

    /// The default view must be a valid grid position.
    #[error("Default view ({x}, {y}) lies outside the view grid")]
    DefaultViewOutOfGrid {
        /// Configured default x.
        x: i32,
        /// Configured default y.
        y: i32,
    },

    /// A study with no scenes has nothing to show.
    #[error("Scene playlist is empty")]
    EmptyPlaylist,

    /// A playlist entry failed scene-name validation.
    #[error(transparent)]
    Scene(#[from] InvalidSceneName),

    /// A study with no rating labels cannot record answers.
    #[error("Answer label set is empty")]
    EmptyAnswerSet,
}
