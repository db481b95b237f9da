/// FeatureCuller: per-camera visibility classification.
///
/// For one camera and pass, every feature in every quad the grid traversal
/// visits gets exactly one `DrawFlag` (and a `draw_alpha`). The batcher then
/// only submits features whose flag matches the pass it runs.

use bitflags::bitflags;
use slotmap::SlotMap;

use crate::camera::{Camera, CameraKind};
use crate::config::{FeatureDrawerConfig, FRUSTUM_HEIGHT_PADDING};
use crate::feature::{DrawableFeature, DrawFlag, DrawQuad, FeatureKey};
use crate::services::{Environment, GridQuery, GridVisibility, WaterPass};
use crate::{fd_trace, fd_warn};
use super::draw_quad_grid::DrawQuadGrid;
use super::frame_context::FrameContext;

bitflags! {
    /// Pass conditions that change how features are classified.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PassFlags: u8 {
        /// Water reflection pass in progress
        const DRAW_REFLECTION = 1 << 0;
        /// Water refraction pass in progress
        const DRAW_REFRACTION = 1 << 1;
        /// Classifying for the shadow camera
        const DRAW_SHADOW = 1 << 2;
        /// Features past their model range may become impostors
        const DRAW_FAR = 1 << 3;
    }
}

impl PassFlags {
    pub fn for_pass(camera: &Camera, water: WaterPass, draw_far: bool) -> Self {
        let mut flags = PassFlags::empty();
        flags.set(PassFlags::DRAW_REFLECTION, water == WaterPass::Reflection);
        flags.set(PassFlags::DRAW_REFRACTION, water == WaterPass::Refraction);
        flags.set(PassFlags::DRAW_SHADOW, camera.is_shadow());
        flags.set(PassFlags::DRAW_FAR, draw_far);
        flags
    }
}

/// Counters of one classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyStats {
    pub visited_quads: usize,
    pub classified: usize,
}

pub struct FeatureCuller {
    config: FeatureDrawerConfig,
    /// Last frame each classifying camera kind ran. Recorded only; every
    /// request reclassifies.
    last_classified: [Option<u64>; CameraKind::CLASSIFYING.len()],
}

impl FeatureCuller {
    pub fn new(config: FeatureDrawerConfig) -> Self {
        Self {
            config,
            last_classified: [None; CameraKind::CLASSIFYING.len()],
        }
    }

    pub fn config(&self) -> &FeatureDrawerConfig {
        &self.config
    }

    pub fn last_classified_frame(&self, kind: CameraKind) -> Option<u64> {
        kind.classification_slot().and_then(|slot| self.last_classified[slot])
    }

    /// Squared distance past which a feature is no longer drawn as a model.
    pub fn far_length(&self, feature: &DrawableFeature) -> f32 {
        feature.sq_radius() * self.config.unit_draw_dist_sqr()
    }

    /// Null-camera fade: clears the alpha, never matches.
    pub fn reset_fade(feature: &mut DrawableFeature) {
        feature.set_draw_alpha(0.0);
    }

    /// Distance fade of one feature.
    ///
    /// Sets `draw_alpha` and returns `Opaque` or `AlphaFading` when the
    /// feature is drawn as a model, `None` when it is not (no camera, or
    /// past the fade range).
    pub fn compute_fade(
        &self,
        feature: &mut DrawableFeature,
        camera: Option<&Camera>,
        sq_fade_begin: f32,
        sq_fade_end: f32,
    ) -> Option<DrawFlag> {
        Self::reset_fade(feature);

        let camera = camera?;

        if !feature.alpha_fade {
            feature.set_draw_alpha(1.0);
            return Some(DrawFlag::Opaque);
        }

        let sq_dist = camera.sq_distance_to(feature.pos);
        let far_length = self.far_length(feature);
        if sq_dist >= far_length {
            return None;
        }

        // Small features end their fade at the impostor distance, keeping
        // the same begin/end ratio.
        let (fade_begin, fade_end) = if far_length < sq_fade_end {
            (far_length * (sq_fade_begin / sq_fade_end), far_length)
        } else {
            (sq_fade_begin, sq_fade_end)
        };

        if sq_dist < fade_begin {
            feature.set_draw_alpha(1.0);
            return Some(DrawFlag::Opaque);
        }
        if sq_dist < fade_end {
            let alpha = 1.0 - (sq_dist - fade_begin) / (fade_end - fade_begin);
            feature.set_draw_alpha(alpha);
            return Some(if alpha >= 1.0 { DrawFlag::Opaque } else { DrawFlag::AlphaFading });
        }

        None
    }

    /// Classify one feature for the camera and store its flag.
    pub fn classify_feature(
        &self,
        feature: &mut DrawableFeature,
        camera: &Camera,
        flags: PassFlags,
        frame: &FrameContext,
        environment: &dyn Environment,
    ) -> DrawFlag {
        feature.set_draw_flag(DrawFlag::NoDraw);
        let flag = self.select_flag(feature, camera, flags, frame, environment);
        feature.set_draw_flag(flag);
        flag
    }

    fn select_flag(
        &self,
        feature: &mut DrawableFeature,
        camera: &Camera,
        flags: PassFlags,
        frame: &FrameContext,
        environment: &dyn Environment,
    ) -> DrawFlag {
        if feature.no_draw || feature.in_void || !frame.sees(feature) {
            return DrawFlag::NoDraw;
        }
        if flags.contains(PassFlags::DRAW_SHADOW) {
            return DrawFlag::Shadow;
        }
        if flags.contains(PassFlags::DRAW_REFRACTION) && !feature.in_water {
            return DrawFlag::NoDraw;
        }
        if flags.contains(PassFlags::DRAW_REFLECTION)
            && !environment.object_visible_reflection(feature.draw_mid_pos(), camera.position(), feature.draw_radius)
        {
            return DrawFlag::NoDraw;
        }

        let sq_fade_begin = self.config.sq_fade_begin();
        let sq_fade_end = self.config.sq_fade_end();
        if let Some(flag) = self.compute_fade(feature, Some(camera), sq_fade_begin, sq_fade_end) {
            return flag;
        }

        // A fading feature never snaps to a fully opaque impostor
        if flags.contains(PassFlags::DRAW_FAR) && !feature.alpha_fade {
            DrawFlag::FarImpostor
        } else {
            DrawFlag::NoDraw
        }
    }

    /// Grid traversal parameters for the current frame.
    pub fn grid_query(&self, grid: &DrawQuadGrid, frame: &FrameContext, extra_size: f32) -> GridQuery {
        GridQuery {
            min_height: frame.min_height - FRUSTUM_HEIGHT_PADDING,
            max_height: frame.max_height + FRUSTUM_HEIGHT_PADDING,
            max_distance: self.config.draw_distance,
            quad_size: DrawQuadGrid::QUAD_WORLD_SIZE,
            extra_size,
            quads_x: grid.quads_x(),
            quads_y: grid.quads_y(),
        }
    }

    /// Classify every feature in the quads visible from `camera`.
    ///
    /// Visited quads are stamped with the current frame so the batcher only
    /// walks them.
    #[allow(clippy::too_many_arguments)]
    pub fn classify(
        &mut self,
        camera: &Camera,
        frame: &FrameContext,
        extra_size: f32,
        draw_far: bool,
        grid: &mut DrawQuadGrid,
        features: &mut SlotMap<FeatureKey, DrawableFeature>,
        grid_visibility: &dyn GridVisibility,
        environment: &dyn Environment,
    ) -> ClassifyStats {
        if let Some(slot) = camera.kind().classification_slot() {
            self.last_classified[slot] = Some(frame.draw_frame);
        }

        let flags = PassFlags::for_pass(camera, environment.water_pass(), draw_far);
        let query = self.grid_query(grid, frame, extra_size);
        let mut stats = ClassifyStats::default();
        let culler = &*self;

        grid_visibility.for_each_visible_quad(camera, &query, &mut |x, z| {
            debug_assert!(x < query.quads_x && z < query.quads_y, "quad ({}, {}) outside the grid", x, z);
            let Some(index) = grid.quad_index(x, z) else {
                fd_warn!("rts::FeatureCuller", "Skipping quad ({}, {}) outside the {}x{} grid",
                    x, z, query.quads_x, query.quads_y);
                return;
            };

            grid.mark_visited(index, frame.draw_frame);
            stats.visited_quads += 1;

            let Some(cell) = grid.cell(index) else {
                return;
            };
            for key in cell.feature_keys() {
                let Some(feature) = features.get_mut(key) else {
                    fd_warn!("rts::FeatureCuller", "Quad {} holds unknown feature {:?}", index, key);
                    continue;
                };
                debug_assert_eq!(feature.draw_quad(), DrawQuad::Cell(index));
                culler.classify_feature(feature, camera, flags, frame, environment);
                stats.classified += 1;
            }
        });

        fd_trace!("rts::FeatureCuller", "{:?} camera, frame {}: {} quads, {} features ({:?})",
            camera.kind(), frame.draw_frame, stats.visited_quads, stats.classified, flags);

        stats
    }

    /// Final check before a feature is submitted in any pass.
    pub fn can_draw(&self, feature: &DrawableFeature, camera: &Camera, frame: &FrameContext) -> bool {
        if feature.no_draw || feature.in_void || !frame.sees(feature) {
            return false;
        }

        if feature.alpha_fade && !camera.is_shadow() {
            let sq_dist = camera.sq_distance_to(feature.pos);
            if sq_dist >= self.far_length(feature).min(self.config.sq_fade_end()) {
                return false;
            }
        }

        camera.in_view(feature.draw_mid_pos(), feature.draw_radius)
    }
}

#[cfg(test)]
#[path = "culler_tests.rs"]
mod tests;
