/// Custom material objects.
///
/// Features with a custom material are claimed by this service during the
/// regular passes and drawn by it afterwards in one batch.

use crate::feature::{DrawableFeature, FeatureKey};

/// Pass a feature is offered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialPass {
    Opaque,
    Alpha,
    Shadow,
}

pub trait MaterialObjectDrawer: Send + Sync {
    /// Offer a feature to the custom material path. Returns true when the
    /// feature was claimed and must not be drawn by the regular path.
    fn add_material_object(&mut self, key: FeatureKey, feature: &DrawableFeature, pass: MaterialPass) -> bool;

    /// Apply the global LOD factor of the pass that just ran.
    fn set_draw_pass_global_lod_factor(&mut self);

    /// Draw every object claimed for `pass`.
    fn draw_material_objects(&mut self, pass: MaterialPass, deferred: bool);

    /// Bind the geometry buffer for the deferred opaque pass.
    fn begin_deferred_pass(&mut self);

    fn end_deferred_pass(&mut self);

    /// Draw a single feature with its custom material. Returns false when
    /// the feature has none and the caller has to draw it.
    fn draw_single_object(&mut self, key: FeatureKey, feature: &DrawableFeature, no_transform: bool) -> bool;

    /// Forget the LOD level chosen for a destroyed feature.
    fn reset_object_lod(&mut self, key: FeatureKey);

    /// Load the per-object LOD distance scales.
    fn read_lod_scales(&mut self);
}
