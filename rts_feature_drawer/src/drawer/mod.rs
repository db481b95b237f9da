//! Feature drawing core
//!
//! Spatial grid, per-camera classification, per-pass batching, lifecycle
//! tracking and the frame orchestrator tying them together.

mod draw_quad_grid;
mod frame_context;
mod culler;
mod batcher;
mod tracker;
mod feature_drawer;

pub use draw_quad_grid::{DrawQuadGrid, DrawQuadCell, ModelBin};
pub use frame_context::FrameContext;
pub use culler::{FeatureCuller, PassFlags, ClassifyStats};
pub use batcher::{FeatureBatcher, PassKind, PassStats, ALPHA_TEST_THRESHOLD};
pub use tracker::FeatureTracker;
pub use feature_drawer::{FeatureDrawer, FrameStats};
