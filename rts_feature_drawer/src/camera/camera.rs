/// Camera snapshot handed to the drawer for one pass.
///
/// Passive: the caller computes the frustum (usually through
/// `Frustum::from_view_projection`) and the world-space position.

use glam::{Mat4, Vec3};
use super::frustum::Frustum;

/// Role of the camera for the pass being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraKind {
    /// Main player view
    Player,
    /// Mirrored view used by the water reflection pass
    UnderwaterReflection,
    /// Light-space view used to render the shadow map
    Shadow,
    /// Cube-map captures (never used to classify features)
    EnvMap,
}

impl CameraKind {
    /// Kinds that may drive feature classification.
    pub const CLASSIFYING: [CameraKind; 3] = [
        CameraKind::Player,
        CameraKind::UnderwaterReflection,
        CameraKind::Shadow,
    ];

    /// Slot in per-camera-kind bookkeeping tables, `None` for EnvMap.
    pub fn classification_slot(self) -> Option<usize> {
        match self {
            CameraKind::Player => Some(0),
            CameraKind::UnderwaterReflection => Some(1),
            CameraKind::Shadow => Some(2),
            CameraKind::EnvMap => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    kind: CameraKind,
    position: Vec3,
    frustum: Frustum,
}

impl Camera {
    pub fn new(kind: CameraKind, position: Vec3, frustum: Frustum) -> Self {
        Self { kind, position, frustum }
    }

    /// Build the frustum from a view-projection matrix.
    pub fn from_view_projection(kind: CameraKind, position: Vec3, view_projection: &Mat4) -> Self {
        Self::new(kind, position, Frustum::from_view_projection(view_projection))
    }

    pub fn kind(&self) -> CameraKind {
        self.kind
    }

    pub fn is_shadow(&self) -> bool {
        self.kind == CameraKind::Shadow
    }

    /// World-space eye position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Sphere visibility test against the frustum.
    pub fn in_view(&self, point: Vec3, radius: f32) -> bool {
        self.frustum.intersects_sphere(point, radius)
    }

    /// Squared distance from the eye to `point`.
    pub fn sq_distance_to(&self, point: Vec3) -> f32 {
        (point - self.position).length_squared()
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
