/// Grid traversal strategies.
///
/// A GridVisibility enumerates the draw quads a camera can see. The drawer
/// calls it once per classification and marks the features of every visited
/// quad.

use glam::Vec3;
use crate::camera::{Camera, AABB};

/// Parameters of one grid traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridQuery {
    /// Lowest terrain height, padded
    pub min_height: f32,
    /// Highest terrain height, padded
    pub max_height: f32,
    /// Quads farther than this from the camera are skipped (world units)
    pub max_distance: f32,
    /// Edge length of a quad (world units)
    pub quad_size: f32,
    /// Extra margin around each quad (world units)
    pub extra_size: f32,
    /// Grid width in quads
    pub quads_x: usize,
    /// Grid depth in quads
    pub quads_y: usize,
}

/// Enumerates the quads visible from a camera.
///
/// The visitor receives `(x, z)` quad coordinates. Coordinates outside
/// `quads_x × quads_y` are a contract violation; the drawer skips them.
pub trait GridVisibility: Send + Sync {
    fn for_each_visible_quad(
        &self,
        camera: &Camera,
        query: &GridQuery,
        visitor: &mut dyn FnMut(usize, usize),
    );
}

/// Brute-force traversal: tests every quad's box against the camera frustum.
///
/// Each quad spans `min_height..max_height` vertically. Quads whose box lies
/// farther than `max_distance` from the eye are skipped.
pub struct FrustumGridVisibility;

impl FrustumGridVisibility {
    pub fn new() -> Self {
        Self
    }

    /// World-space box of quad `(x, z)`.
    pub fn quad_bounds(query: &GridQuery, x: usize, z: usize) -> AABB {
        let min = Vec3::new(x as f32 * query.quad_size, query.min_height, z as f32 * query.quad_size);
        let max = Vec3::new(min.x + query.quad_size, query.max_height, min.z + query.quad_size);
        AABB::new(min, max).expanded_planar(query.extra_size)
    }
}

impl Default for FrustumGridVisibility {
    fn default() -> Self {
        Self::new()
    }
}

impl GridVisibility for FrustumGridVisibility {
    fn for_each_visible_quad(
        &self,
        camera: &Camera,
        query: &GridQuery,
        visitor: &mut dyn FnMut(usize, usize),
    ) {
        let sq_max_distance = query.max_distance * query.max_distance;

        for z in 0..query.quads_y {
            for x in 0..query.quads_x {
                let bounds = Self::quad_bounds(query, x, z);
                if bounds.sq_distance_to(camera.position()) > sq_max_distance {
                    continue;
                }
                if camera.frustum().intersects_aabb(&bounds) {
                    visitor(x, z);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "grid_visibility_tests.rs"]
mod tests;
