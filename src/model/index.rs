//! Sub-aperture grid index and image-path derivation.

use crate::model::SceneId;
use std::fmt;

/// Position in the sub-aperture view grid, with an optional focus depth.
///
/// `x` and `y` are grid coordinates bounded by the configured angular
/// resolution; `depth` is `None` while navigating angularly and `Some`
/// once a refocus has landed on a depth plane. The type itself accepts
/// any integers - range enforcement belongs to the viewport, which clamps
/// every move before constructing an index.
///
/// Indices are plain values: equality is structural over all three
/// fields, and every navigation decision builds a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubapertureIndex {
    /// Horizontal grid coordinate.
    pub x: i32,
    /// Vertical grid coordinate.
    pub y: i32,
    /// Focus depth plane, or `None` for the all-in-focus view.
    pub depth: Option<i32>,
}

impl SubapertureIndex {
    /// Build an index from explicit coordinates and depth.
    pub fn new(x: i32, y: i32, depth: Option<i32>) -> Self {
        Self { x, y, depth }
    }

    /// Build an angular (all-in-focus) index with no depth.
    pub fn angular(x: i32, y: i32) -> Self {
        Self { x, y, depth: None }
    }

    /// Derive the image path rendered for this index within a scene.
    ///
    /// Coordinates are zero-padded to three digits: `"<scene>/007_007"`,
    /// or `"<scene>/007_007_004"` once a depth plane is set.
    pub fn image_path(&self, scene: &SceneId) -> String {
        match self.depth {
            Some(depth) => format!("{}/{:03}_{:03}_{:03}", scene, self.x, self.y, depth),
            None => format!("{}/{:03}_{:03}", scene, self.x, self.y),
        }
    }
}

impl fmt::Display for SubapertureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.depth {
            Some(depth) => write!(f, "({}, {}, depth {})", self.x, self.y, depth),
            None => write!(f, "({}, {})", self.x, self.y),
        }
    }
}
