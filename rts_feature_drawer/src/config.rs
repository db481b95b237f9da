//! Feature drawer configuration.
//!
//! Values are read once at construction and stay fixed for the lifetime
//! of the drawer.

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::fd_bail;

/// Edge length of a draw quad, in heightmap squares.
pub const DRAW_QUAD_SIZE: u32 = 32;

/// Edge length of a heightmap square, in world units.
pub const SQUARE_SIZE: f32 = 8.0;

/// Extra height added below the map minimum and above the map maximum
/// when building the frustum sides for grid traversal.
pub const FRUSTUM_HEIGHT_PADDING: f32 = 100.0;

/// Config key for the maximum feature draw distance.
pub const KEY_DRAW_DISTANCE: &str = "FeatureDrawDistance";
/// Config key for the distance at which features begin to fade.
pub const KEY_FADE_DISTANCE: &str = "FeatureFadeDistance";
/// Config key for the model LOD distance (drives the impostor threshold).
pub const KEY_UNIT_DRAW_DISTANCE: &str = "UnitLodDist";

/// Source of named float settings (engine config file, command line, ...).
pub trait ConfigSource {
    /// Value for `key`, or `None` to use the default.
    fn get_float(&self, key: &str) -> Option<f32>;
}

impl ConfigSource for FxHashMap<String, f32> {
    fn get_float(&self, key: &str) -> Option<f32> {
        self.get(key).copied()
    }
}

/// Feature drawer configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureDrawerConfig {
    /// Maximum distance at which features are drawn as models (world units)
    pub draw_distance: f32,
    /// Distance at which fade-capable features begin to fade (world units)
    pub fade_distance: f32,
    /// Model LOD distance; `sq_radius * unit_draw_distance²` is the
    /// squared distance past which a feature becomes an impostor
    pub unit_draw_distance: f32,
}

impl Default for FeatureDrawerConfig {
    fn default() -> Self {
        Self {
            draw_distance: 6000.0,
            fade_distance: 4500.0,
            unit_draw_distance: 1000.0,
        }
    }
}

impl FeatureDrawerConfig {
    /// Read the configuration from a source, falling back to defaults.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self> {
        let defaults = Self::default();
        Self {
            draw_distance: source.get_float(KEY_DRAW_DISTANCE).unwrap_or(defaults.draw_distance),
            fade_distance: source.get_float(KEY_FADE_DISTANCE).unwrap_or(defaults.fade_distance),
            unit_draw_distance: source
                .get_float(KEY_UNIT_DRAW_DISTANCE)
                .unwrap_or(defaults.unit_draw_distance),
        }
        .validated()
    }

    /// Check and normalize the values.
    ///
    /// Non-finite values are rejected. Negative distances clamp to 0 and the
    /// fade distance never exceeds the draw distance.
    pub fn validated(self) -> Result<Self> {
        for (name, value) in [
            (KEY_DRAW_DISTANCE, self.draw_distance),
            (KEY_FADE_DISTANCE, self.fade_distance),
            (KEY_UNIT_DRAW_DISTANCE, self.unit_draw_distance),
        ] {
            if !value.is_finite() {
                fd_bail!("rts::Config", InvalidConfig, "{} must be finite, got {}", name, value);
            }
        }

        let draw_distance = self.draw_distance.max(0.0);
        Ok(Self {
            draw_distance,
            fade_distance: self.fade_distance.max(0.0).min(draw_distance),
            unit_draw_distance: self.unit_draw_distance.max(0.0),
        })
    }

    /// Squared distance at which fading begins.
    pub fn sq_fade_begin(&self) -> f32 {
        self.fade_distance * self.fade_distance
    }

    /// Squared distance at which fading ends (= squared draw distance).
    pub fn sq_fade_end(&self) -> f32 {
        self.draw_distance * self.draw_distance
    }

    /// Squared model LOD distance (the global draw-distance scale).
    pub fn unit_draw_dist_sqr(&self) -> f32 {
        self.unit_draw_distance * self.unit_draw_distance
    }
}

/// Map extents in heightmap squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapDims {
    pub mapx: u32,
    pub mapy: u32,
}

impl MapDims {
    pub fn new(mapx: u32, mapy: u32) -> Self {
        Self { mapx, mapy }
    }

    /// Number of draw quads along x.
    pub fn draw_quads_x(&self) -> usize {
        (self.mapx / DRAW_QUAD_SIZE) as usize
    }

    /// Number of draw quads along z.
    pub fn draw_quads_y(&self) -> usize {
        (self.mapy / DRAW_QUAD_SIZE) as usize
    }

    /// Map extent along x in world units.
    pub fn world_width(&self) -> f32 {
        self.mapx as f32 * SQUARE_SIZE
    }

    /// Map extent along z in world units.
    pub fn world_depth(&self) -> f32 {
        self.mapy as f32 * SQUARE_SIZE
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
