//! Depth maps: translating tap positions into focus-depth buckets.
//!
//! Each scene may carry one grayscale depth map. A double-tap on the
//! displayed view samples the map at the tapped position and quantizes
//! the gray level into one of `depth_resolution` buckets; scenes without
//! a map simply cannot refocus.

use crate::model::SceneId;
use image::GrayImage;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Fixed scale between displayed-view coordinates and the depth map's
/// native resolution. The study assets display views downsampled 4:3
/// relative to the maps, so a tap position is scaled up by 4/3 per axis
/// before sampling.
pub const VIEW_TO_MAP_SCALE: f32 = 4.0 / 3.0;

/// Grayscale depth map for one scene.
///
/// Wraps an 8-bit luma image; gray 0.0 maps to the nearest depth bucket
/// and gray 1.0 to the farthest.
#[derive(Debug, Clone)]
pub struct DepthMap {
    pixels: GrayImage,
}

impl DepthMap {
    /// Wrap an already-decoded grayscale image.
    pub fn from_gray(pixels: GrayImage) -> Self {
        Self { pixels }
    }

    /// Decode a depth map from disk, converting to 8-bit luma.
    pub fn load(path: &std::path::Path) -> Result<Self, image::ImageError> {
        let img = image::open(path)?;
        Ok(Self::from_gray(img.to_luma8()))
    }

    /// Quantize the gray level under a tap into a depth bucket.
    ///
    /// The tap position is given in displayed-view coordinates; it is
    /// scaled by [`VIEW_TO_MAP_SCALE`], rounded, and clamped to the map
    /// bounds, so any finite tap yields a bucket in
    /// `[0, depth_resolution - 1]`.
    pub fn depth_bucket(&self, tap_x: f32, tap_y: f32, depth_resolution: u32) -> i32 {
        let (width, height) = self.pixels.dimensions();
        if width == 0 || height == 0 || depth_resolution == 0 {
            return 0;
        }
        let px = scale_to_map(tap_x, width);
        let py = scale_to_map(tap_y, height);
        let gray = f32::from(self.pixels.get_pixel(px, py).0[0]) / 255.0;
        (gray * (depth_resolution - 1) as f32).round() as i32
    }
}

/// Scale one tap axis to map coordinates, clamped into `[0, size)`.
fn scale_to_map(value: f32, size: u32) -> u32 {
    let scaled = (value * VIEW_TO_MAP_SCALE).round();
    if !(scaled > 0.0) {
        // Catches negatives and NaN.
        return 0;
    }
    (scaled as u32).min(size - 1)
}

/// Lookup of depth maps by scene.
///
/// The viewport asks for a map once per scene load; `None` means the
/// scene cannot refocus and double-taps become no-ops.
pub trait DepthMapSource {
    /// Fetch the depth map for a scene, if one exists.
    fn depth_map(&self, scene: &SceneId) -> Option<DepthMap>;
}

/// Depth maps stored on disk as `<root>/<scene>_depth.png`.
#[derive(Debug, Clone)]
pub struct FsDepthMaps {
    root: PathBuf,
}

impl FsDepthMaps {
    /// Source maps from a directory of `<scene>_depth.png` files.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DepthMapSource for FsDepthMaps {
    fn depth_map(&self, scene: &SceneId) -> Option<DepthMap> {
        let path = self.root.join(format!("{}_depth.png", scene.as_str()));
        match DepthMap::load(&path) {
            Ok(map) => Some(map),
            Err(err) => {
                debug!(scene = %scene, path = %path.display(), error = %err,
                    "no depth map for scene; refocus disabled");
                None
            }
        }
    }
}

/// Depth maps held in memory, for embedding hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDepthMaps {
    maps: HashMap<String, DepthMap>,
}

impl InMemoryDepthMaps {
    /// Empty source: every scene refocuses as a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a map for a scene, replacing any previous one.
    pub fn insert(&mut self, scene: SceneId, map: DepthMap) {
        self.maps.insert(scene.as_str().to_owned(), map);
    }
}

impl DepthMapSource for InMemoryDepthMaps {
    fn depth_map(&self, scene: &SceneId) -> Option<DepthMap> {
        self.maps.get(scene.as_str()).cloned()
    }
}
