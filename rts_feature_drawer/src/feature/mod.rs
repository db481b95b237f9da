//! Feature data model
//!
//! The drawable view of a map feature: simulation-owned attributes the drawer
//! reads, plus the per-frame draw state the drawer writes.

mod drawable_feature;

pub use drawable_feature::{
    DrawableFeature, FeatureDesc, FeatureKey, FeatureModel,
    DrawFlag, DrawQuad, DrawType, ModelType, TextureKey,
};
