/// FeatureDrawer: per-frame orchestration of the feature passes.
///
/// Owns the grid, the tracked features, the culler and the services. The
/// engine forwards simulation events (`feature_created`, `feature_moved`,
/// `feature_destroyed`), calls `update` once per frame and then the draw
/// entry points for each camera/pass it renders.

use glam::Vec3;

use crate::camera::{Camera, CameraKind};
use crate::config::{FeatureDrawerConfig, MapDims};
use crate::error::Result;
use crate::feature::{DrawableFeature, FeatureKey, FeatureModel, ModelType};
use crate::services::{AlphaTestState, FeatureDrawerServices, MaterialPass, WaterPass};
use crate::{fd_bail, fd_debug, fd_info, fd_warn};
use super::batcher::{FeatureBatcher, PassKind, PassStats, ALPHA_TEST_THRESHOLD};
use super::culler::FeatureCuller;
use super::draw_quad_grid::DrawQuadGrid;
use super::frame_context::FrameContext;
use super::tracker::FeatureTracker;

/// Counters of the current frame, reset by `update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Number of grid classifications run
    pub classifications: usize,
    pub deferred: PassStats,
    pub opaque: PassStats,
    pub alpha: PassStats,
    pub shadow: PassStats,
}

/// Camera state the current flags were computed for.
#[derive(Debug, Clone, PartialEq)]
struct ClassificationStamp {
    frame: u64,
    camera: Camera,
    water: WaterPass,
}

pub struct FeatureDrawer {
    map: MapDims,
    grid: DrawQuadGrid,
    tracker: FeatureTracker,
    culler: FeatureCuller,
    services: FeatureDrawerServices,
    draw_forward: bool,
    draw_deferred: bool,
    classification: Option<ClassificationStamp>,
    stats: FrameStats,
}

impl FeatureDrawer {
    /// Create a drawer for a map.
    ///
    /// The configuration is validated first. Deferred drawing starts enabled
    /// when the renderer supports it.
    pub fn new(config: FeatureDrawerConfig, map: MapDims, mut services: FeatureDrawerServices) -> Result<Self> {
        let config = config.validated()?;
        let grid = DrawQuadGrid::new(map)?;

        services.material_objects.read_lod_scales();
        let draw_deferred = services.renderer.supports_deferred();

        fd_info!("rts::FeatureDrawer",
            "Feature drawer ready: {}x{} quads, draw distance {}, fade distance {}, deferred {}",
            grid.quads_x(), grid.quads_y(), config.draw_distance, config.fade_distance, draw_deferred);

        Ok(Self {
            map,
            grid,
            tracker: FeatureTracker::new(),
            culler: FeatureCuller::new(config),
            services,
            draw_forward: true,
            draw_deferred,
            classification: None,
            stats: FrameStats::default(),
        })
    }

    // ===== SIMULATION EVENTS =====

    pub fn feature_created(&mut self, feature: DrawableFeature) -> FeatureKey {
        self.tracker.feature_created(feature, &mut self.grid)
    }

    /// Returns false for an unknown key.
    pub fn feature_destroyed(&mut self, key: FeatureKey) -> bool {
        self.tracker
            .feature_destroyed(
                key,
                &mut self.grid,
                self.services.decals.as_mut(),
                self.services.material_objects.as_mut(),
            )
            .is_some()
    }

    /// The simulation moved a feature (its `pos` is already updated).
    pub fn feature_moved(&mut self, key: FeatureKey, old_pos: Vec3) -> bool {
        self.tracker.feature_moved(key, old_pos, &mut self.grid)
    }

    /// Move a feature and update its quad. Returns false for an unknown key.
    pub fn set_feature_position(&mut self, key: FeatureKey, pos: Vec3) -> bool {
        self.tracker.set_position(key, pos, &mut self.grid)
    }

    /// Change a feature's model (e.g. a wreck decaying into heaps).
    /// Returns false for an unknown key.
    pub fn set_feature_model(&mut self, key: FeatureKey, model: Option<FeatureModel>) -> bool {
        self.tracker.set_model(key, model, &mut self.grid)
    }

    // ===== FRAME =====

    /// Start of a render frame: interpolate draw positions and reset alphas.
    pub fn update(&mut self, frame: &FrameContext) {
        self.tracker.update_draw_positions(frame.time_offset);
        self.stats = FrameStats::default();
    }

    /// Main feature draw for the active camera.
    ///
    /// Classifies the visible quads, then runs the deferred pass (when
    /// enabled and no water pass is in progress), the forward opaque pass
    /// and the impostor flush, all inside the fog bracket.
    pub fn draw(&mut self, camera: &Camera, frame: &FrameContext) {
        self.services.environment.setup_fog();

        let info_texture = self.services.environment.info_texture_enabled();
        if info_texture {
            self.services.environment.bind_info_texture();
        }

        self.classify(camera, frame, 0.0, true);

        let water = self.services.environment.water_pass();
        if self.draw_deferred && self.services.renderer.supports_deferred() && !water.is_active() {
            self.services.material_objects.begin_deferred_pass();
            self.stats.deferred = self.render_opaque(camera, frame, true);
            self.services.material_objects.end_deferred_pass();
        }

        if self.draw_forward {
            self.stats.opaque = self.render_opaque(camera, frame, false);
        }

        self.services.far_textures.draw();

        if info_texture {
            self.services.environment.unbind_info_texture();
        }
        self.services.environment.disable_fog();
    }

    /// Opaque pass on its own (e.g. from a water or deferred renderer).
    ///
    /// Reuses the current classification only when it was made this frame
    /// for the same camera (position and frustum) and water state.
    pub fn draw_opaque_pass(&mut self, camera: &Camera, frame: &FrameContext, deferred: bool) {
        self.ensure_classified(camera, frame);
        let stats = self.render_opaque(camera, frame, deferred);
        if deferred {
            self.stats.deferred = stats;
        } else {
            self.stats.opaque = stats;
        }
    }

    /// Draw the features fading with distance. Same classification reuse
    /// rule as `draw_opaque_pass`.
    pub fn draw_alpha_pass(&mut self, camera: &Camera, frame: &FrameContext) {
        self.ensure_classified(camera, frame);

        self.services.renderer.setup_alpha_drawing(false);
        self.services.renderer.push_alpha_test(AlphaTestState {
            threshold: ALPHA_TEST_THRESHOLD,
            depth_write: true,
        });
        self.services.environment.setup_fog();

        let mut stats = PassStats::default();
        for model_type in ModelType::ALL {
            self.services.renderer.push_model_render_state(model_type);
            stats += self.run_pass(camera, frame, model_type, PassKind::Alpha);
            self.services.renderer.pop_model_render_state(model_type);
        }

        self.services.environment.disable_fog();
        self.services.renderer.pop_alpha_test();
        self.services.renderer.reset_alpha_drawing(false);

        self.services.material_objects.set_draw_pass_global_lod_factor();
        self.services.material_objects.draw_material_objects(MaterialPass::Alpha, false);

        self.stats.alpha = stats;
    }

    /// Render features into the shadow map.
    pub fn draw_shadow_pass(&mut self, shadow_camera: &Camera, frame: &FrameContext) {
        if !shadow_camera.is_shadow() {
            fd_warn!("rts::FeatureDrawer", "Shadow pass requested with a {:?} camera", shadow_camera.kind());
            return;
        }

        self.services.renderer.begin_shadow_generation();
        self.classify(shadow_camera, frame, 0.0, false);

        self.services.renderer.bind_blank_texture();
        self.services.renderer.push_alpha_test(AlphaTestState {
            threshold: ALPHA_TEST_THRESHOLD,
            depth_write: false,
        });

        // 3DO models are wound clockwise and have holes
        self.services.renderer.set_face_culling(false);
        let mut stats = self.run_pass(shadow_camera, frame, ModelType::ThreeDo, PassKind::Shadow);
        self.services.renderer.set_face_culling(true);

        for model_type in [ModelType::S3o, ModelType::Assimp] {
            stats += self.run_pass(shadow_camera, frame, model_type, PassKind::Shadow);
        }

        self.services.renderer.pop_alpha_test();
        self.services.renderer.end_shadow_generation();

        self.services.material_objects.set_draw_pass_global_lod_factor();
        self.services.material_objects.draw_material_objects(MaterialPass::Shadow, false);

        self.stats.shadow = stats;
    }

    /// Draw a single feature outside the batched passes (selection
    /// highlight, build previews...).
    ///
    /// The material service gets the first chance; otherwise the full
    /// opaque state is pushed around the draw. With `no_transform` the
    /// caller has already set up the model matrix.
    pub fn draw_individual(&mut self, key: FeatureKey, no_transform: bool) -> Result<()> {
        let Some(feature) = self.tracker.feature(key) else {
            fd_bail!("rts::FeatureDrawer", InvalidFeature, "unknown feature {:?}", key);
        };
        let Some(model) = feature.model() else {
            fd_bail!("rts::FeatureDrawer", InvalidFeature, "feature {:?} has no model", key);
        };

        if self.services.material_objects.draw_single_object(key, feature, no_transform) {
            return Ok(());
        }

        let renderer = &mut self.services.renderer;
        renderer.setup_opaque_drawing(false);
        renderer.push_model_render_state(model.model_type);
        renderer.bind_model_type_texture(model.model_type, model.texture);
        renderer.set_team_colour(feature.team, 1.0);

        if no_transform {
            renderer.draw_model(key, feature);
        } else {
            renderer.push_transform(&feature.transform);
            renderer.draw_model(key, feature);
            renderer.pop_transform();
        }

        renderer.pop_model_render_state(model.model_type);
        renderer.reset_opaque_drawing(false);
        Ok(())
    }

    /// Rebuild the grid for new map dimensions (after loading a saved game)
    /// and re-register every live feature. On error the current grid is
    /// kept.
    pub fn rebuild_after_load(&mut self, map: MapDims) -> Result<()> {
        self.grid = DrawQuadGrid::new(map)?;
        self.map = map;
        self.classification = None;

        let registered = self.tracker.register_all(&mut self.grid);
        fd_info!("rts::FeatureDrawer", "Rebuilt {}x{} draw quads, {} features registered",
            self.grid.quads_x(), self.grid.quads_y(), registered);
        Ok(())
    }

    // ===== SETTINGS / STATE =====

    pub fn set_draw_forward(&mut self, enabled: bool) {
        self.draw_forward = enabled;
    }

    pub fn set_draw_deferred(&mut self, enabled: bool) {
        self.draw_deferred = enabled;
    }

    pub fn draw_forward(&self) -> bool {
        self.draw_forward
    }

    pub fn draw_deferred(&self) -> bool {
        self.draw_deferred
    }

    pub fn config(&self) -> &FeatureDrawerConfig {
        self.culler.config()
    }

    pub fn map(&self) -> MapDims {
        self.map
    }

    pub fn grid(&self) -> &DrawQuadGrid {
        &self.grid
    }

    pub fn tracker(&self) -> &FeatureTracker {
        &self.tracker
    }

    pub fn feature(&self, key: FeatureKey) -> Option<&DrawableFeature> {
        self.tracker.feature(key)
    }

    /// Simulation-side attribute changes (LOS, water, no_draw...).
    pub fn feature_mut(&mut self, key: FeatureKey) -> Option<&mut DrawableFeature> {
        self.tracker.feature_mut(key)
    }

    pub fn last_classified_frame(&self, kind: CameraKind) -> Option<u64> {
        self.culler.last_classified_frame(kind)
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    // ===== INTERNALS =====

    fn classify(&mut self, camera: &Camera, frame: &FrameContext, extra_size: f32, draw_far: bool) {
        let water = self.services.environment.water_pass();
        self.culler.classify(
            camera,
            frame,
            extra_size,
            draw_far,
            &mut self.grid,
            self.tracker.features_mut(),
            self.services.grid_visibility.as_ref(),
            self.services.environment.as_ref(),
        );
        self.classification = Some(ClassificationStamp {
            frame: frame.draw_frame,
            camera: camera.clone(),
            water,
        });
        self.stats.classifications += 1;
    }

    fn ensure_classified(&mut self, camera: &Camera, frame: &FrameContext) {
        let reusable = !camera.is_shadow()
            && self.classification.as_ref().is_some_and(|stamp| {
                stamp.frame == frame.draw_frame
                    && stamp.water == self.services.environment.water_pass()
                    && stamp.camera == *camera
            });
        if reusable {
            fd_debug!("rts::FeatureDrawer", "Reusing {:?} classification of frame {}", camera.kind(), frame.draw_frame);
        } else {
            self.classify(camera, frame, 0.0, true);
        }
    }

    fn render_opaque(&mut self, camera: &Camera, frame: &FrameContext, deferred: bool) -> PassStats {
        self.services.renderer.setup_opaque_drawing(deferred);

        let mut stats = PassStats::default();
        for model_type in ModelType::ALL {
            self.services.renderer.push_model_render_state(model_type);
            stats += self.run_pass(camera, frame, model_type, PassKind::Opaque);
            self.services.renderer.pop_model_render_state(model_type);
        }

        self.services.renderer.reset_opaque_drawing(deferred);

        // Features claimed by the material service in the loop above
        self.services.material_objects.set_draw_pass_global_lod_factor();
        self.services.material_objects.draw_material_objects(MaterialPass::Opaque, deferred);

        stats
    }

    fn run_pass(&mut self, camera: &Camera, frame: &FrameContext, model_type: ModelType, pass: PassKind) -> PassStats {
        let batcher = FeatureBatcher::new(&self.grid, self.tracker.features(), &self.culler, camera, frame);
        batcher.run_pass(model_type, pass, &mut self.services)
    }
}

impl Drop for FeatureDrawer {
    fn drop(&mut self) {
        for &key in self.tracker.live_keys() {
            self.services.decals.force_detach(key);
        }
    }
}

#[cfg(test)]
#[path = "feature_drawer_tests.rs"]
mod tests;
