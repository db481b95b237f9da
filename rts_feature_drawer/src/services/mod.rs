//! External collaborators of the feature drawer
//!
//! The drawer never touches GPU state, geometry or environment rendering
//! directly. Every such concern sits behind a trait here, and the concrete
//! implementations are handed to `FeatureDrawer::new` in a
//! `FeatureDrawerServices` bundle.

mod grid_visibility;
mod environment;
mod feature_renderer;
mod material_objects;
mod impostors;

#[cfg(test)]
pub(crate) mod mock_services;

pub use grid_visibility::{GridVisibility, GridQuery, FrustumGridVisibility};
pub use environment::{Environment, WaterPass};
pub use feature_renderer::{FeatureRenderer, AlphaTestState};
pub use material_objects::{MaterialObjectDrawer, MaterialPass};
pub use impostors::{FarTextureHandler, GroundDecals};

/// Service bundle owned by the drawer.
pub struct FeatureDrawerServices {
    pub grid_visibility: Box<dyn GridVisibility>,
    pub environment: Box<dyn Environment>,
    pub renderer: Box<dyn FeatureRenderer>,
    pub material_objects: Box<dyn MaterialObjectDrawer>,
    pub far_textures: Box<dyn FarTextureHandler>,
    pub decals: Box<dyn GroundDecals>,
}
