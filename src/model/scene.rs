//! Scene identifier newtype with a smart constructor.

use std::fmt;

/// Name of one studied light-field capture (e.g. `"Bikes"`).
///
/// Scene names key both the sub-aperture image directory and the depth
/// map resource, so an empty name is rejected at construction - the raw
/// constructor is never exported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SceneId(String);

impl SceneId {
    /// Smart constructor: validates a non-empty scene name.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidSceneName> {
        let name = raw.into();
        if name.is_empty() {
            return Err(InvalidSceneName::Empty);
        }
        Ok(Self(name))
    }

    /// Borrow the scene name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejection from the [`SceneId`] smart constructor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSceneName {
    /// Scene names key image and depth-map lookups and cannot be empty.
    #[error("Scene name cannot be empty")]
    Empty,
}
