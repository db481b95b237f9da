/// Far-texture impostors and ground decals.

use crate::feature::{DrawableFeature, FeatureKey};

/// Renders distant features as camera-facing textured quads.
pub trait FarTextureHandler: Send + Sync {
    /// Queue a feature for this frame's impostor batch.
    fn queue(&mut self, key: FeatureKey, feature: &DrawableFeature);

    /// Draw and clear the queue.
    fn draw(&mut self);
}

/// Ground decal system (tracks, scars, building plates).
pub trait GroundDecals: Send + Sync {
    /// Detach every decal bound to the feature.
    fn force_detach(&mut self, key: FeatureKey);
}
