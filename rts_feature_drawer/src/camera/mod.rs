//! Camera module: camera snapshot, frustum and bounding boxes.
//!
//! Passive data: the engine computes camera matrices and hands the drawer a
//! snapshot per pass.

mod aabb;
mod camera;
mod frustum;

pub use aabb::AABB;
pub use camera::{Camera, CameraKind};
pub use frustum::{
    Frustum,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
