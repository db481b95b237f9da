/// FeatureBatcher: submits the features classified for a pass.
///
/// Walks the quads visited this frame, one model type at a time, binding
/// each texture group once. A feature is submitted only if its flag matches
/// the pass; everything else is skipped without touching render state.

use std::ops::AddAssign;
use slotmap::SlotMap;

use crate::camera::Camera;
use crate::feature::{DrawableFeature, DrawFlag, FeatureKey, ModelType};
use crate::services::{FeatureDrawerServices, MaterialPass};
use crate::fd_trace;
use super::culler::FeatureCuller;
use super::draw_quad_grid::DrawQuadGrid;
use super::frame_context::FrameContext;

/// Alpha test threshold of the alpha and shadow passes.
pub const ALPHA_TEST_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    Opaque,
    Alpha,
    Shadow,
}

impl PassKind {
    /// The only flag this pass submits.
    pub fn expected_flag(self) -> DrawFlag {
        match self {
            PassKind::Opaque => DrawFlag::Opaque,
            PassKind::Alpha => DrawFlag::AlphaFading,
            PassKind::Shadow => DrawFlag::Shadow,
        }
    }

    pub fn material_pass(self) -> MaterialPass {
        match self {
            PassKind::Opaque => MaterialPass::Opaque,
            PassKind::Alpha => MaterialPass::Alpha,
            PassKind::Shadow => MaterialPass::Shadow,
        }
    }
}

/// Counters of one or more `run_pass` calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Quads walked (visited this frame)
    pub visited_quads: usize,
    /// Features whose flag matched the pass
    pub candidates: usize,
    /// Features drawn through the renderer
    pub submitted: usize,
    /// Features taken over by the material service
    pub claimed: usize,
    /// Features handed to the impostor renderer
    pub queued_far: usize,
    /// Candidates that failed the final visibility check
    pub rejected: usize,
}

impl AddAssign for PassStats {
    fn add_assign(&mut self, other: Self) {
        self.visited_quads += other.visited_quads;
        self.candidates += other.candidates;
        self.submitted += other.submitted;
        self.claimed += other.claimed;
        self.queued_far += other.queued_far;
        self.rejected += other.rejected;
    }
}

pub struct FeatureBatcher<'a> {
    grid: &'a DrawQuadGrid,
    features: &'a SlotMap<FeatureKey, DrawableFeature>,
    culler: &'a FeatureCuller,
    camera: &'a Camera,
    frame: &'a FrameContext,
}

impl<'a> FeatureBatcher<'a> {
    pub fn new(
        grid: &'a DrawQuadGrid,
        features: &'a SlotMap<FeatureKey, DrawableFeature>,
        culler: &'a FeatureCuller,
        camera: &'a Camera,
        frame: &'a FrameContext,
    ) -> Self {
        Self { grid, features, culler, camera, frame }
    }

    /// Submit every feature of `model_type` flagged for `pass`.
    ///
    /// During the opaque pass, impostor-flagged features are queued with the
    /// far-texture handler instead.
    pub fn run_pass(
        &self,
        model_type: ModelType,
        pass: PassKind,
        services: &mut FeatureDrawerServices,
    ) -> PassStats {
        let mut stats = PassStats::default();
        let fixed_function = pass == PassKind::Alpha && services.renderer.wants_fixed_function_alpha();

        let visited = self.grid.cells().iter().filter(|cell| cell.visited_in(self.frame.draw_frame));
        for cell in visited {
            stats.visited_quads += 1;

            for (texture, keys) in cell.bin(model_type).textures() {
                services.renderer.bind_model_type_texture(model_type, texture);

                for &key in keys {
                    if let Some(feature) = self.features.get(key) {
                        self.submit(key, feature, pass, fixed_function, services, &mut stats);
                    }
                }
            }
        }

        fd_trace!("rts::FeatureBatcher", "{:?} pass, {:?}: {:?}", pass, model_type, stats);
        stats
    }

    fn submit(
        &self,
        key: FeatureKey,
        feature: &DrawableFeature,
        pass: PassKind,
        fixed_function: bool,
        services: &mut FeatureDrawerServices,
        stats: &mut PassStats,
    ) {
        let flag = feature.draw_flag();
        if flag == DrawFlag::FarImpostor && pass == PassKind::Opaque {
            services.far_textures.queue(key, feature);
            stats.queued_far += 1;
            return;
        }
        if flag != pass.expected_flag() {
            return;
        }
        stats.candidates += 1;

        if !self.culler.can_draw(feature, self.camera, self.frame) {
            stats.rejected += 1;
            return;
        }
        if services.material_objects.add_material_object(key, feature, pass.material_pass()) {
            stats.claimed += 1;
            return;
        }

        let renderer = &mut services.renderer;
        match pass {
            PassKind::Opaque => renderer.set_team_colour(feature.team, 1.0),
            PassKind::Alpha => {
                let alpha = feature.draw_alpha();
                renderer.set_team_colour(feature.team, alpha);
                renderer.set_feature_alpha(alpha, alpha * ALPHA_TEST_THRESHOLD, fixed_function);
            }
            PassKind::Shadow => {}
        }

        renderer.push_transform(&feature.transform);
        renderer.draw_model(key, feature);
        renderer.pop_transform();
        stats.submitted += 1;
    }
}

#[cfg(test)]
#[path = "batcher_tests.rs"]
mod tests;
