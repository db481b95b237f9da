/// Mock services for unit tests (no GPU required)
///
/// Every mock appends a string command to a shared log so tests can assert
/// on the exact call sequence, the same way a mock command list records
/// commands. Behaviour is driven by a shared `MockSettings` that tests may
/// change between frames.

use std::sync::{Arc, Mutex, MutexGuard};
use glam::{Mat4, Vec3};
use rustc_hash::FxHashSet;

use crate::camera::Camera;
use crate::feature::{DrawableFeature, FeatureKey, ModelType, TextureKey};
use super::{
    AlphaTestState, Environment, FarTextureHandler, FeatureDrawerServices, FeatureRenderer,
    GridQuery, GridVisibility, GroundDecals, MaterialObjectDrawer, MaterialPass, WaterPass,
};

type CommandLog = Arc<Mutex<Vec<String>>>;

fn push(log: &CommandLog, command: String) {
    if let Ok(mut commands) = log.lock() {
        commands.push(command);
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) struct MockSettings {
    pub water_pass: WaterPass,
    pub reflection_visible: bool,
    pub info_texture: bool,
    pub supports_deferred: bool,
    pub fixed_function_alpha: bool,
    /// Features claimed by the material service in any pass
    pub claimed: FxHashSet<FeatureKey>,
    /// Features the material service draws on its own in `draw_single_object`
    pub single_objects: FxHashSet<FeatureKey>,
    /// Quads reported visible; `None` = every quad of the grid
    pub visible_quads: Option<Vec<(usize, usize)>>,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            water_pass: WaterPass::None,
            reflection_visible: true,
            info_texture: false,
            supports_deferred: false,
            fixed_function_alpha: false,
            claimed: FxHashSet::default(),
            single_objects: FxHashSet::default(),
            visible_quads: None,
        }
    }
}

type SharedSettings = Arc<Mutex<MockSettings>>;

fn read<T>(settings: &SharedSettings, f: impl FnOnce(&MockSettings) -> T) -> T {
    let guard = settings.lock().unwrap();
    f(&guard)
}

// ============================================================================
// Harness
// ============================================================================

pub(crate) struct MockHarness {
    log: CommandLog,
    settings: SharedSettings,
}

impl MockHarness {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            settings: Arc::new(Mutex::new(MockSettings::default())),
        }
    }

    pub fn services(&self) -> FeatureDrawerServices {
        FeatureDrawerServices {
            grid_visibility: Box::new(MockGridVisibility { settings: self.settings.clone() }),
            environment: Box::new(MockEnvironment { log: self.log.clone(), settings: self.settings.clone() }),
            renderer: Box::new(MockFeatureRenderer { log: self.log.clone(), settings: self.settings.clone() }),
            material_objects: Box::new(MockMaterialObjects { log: self.log.clone(), settings: self.settings.clone() }),
            far_textures: Box::new(MockFarTextures { log: self.log.clone() }),
            decals: Box::new(MockDecals { log: self.log.clone() }),
        }
    }

    pub fn settings(&self) -> MutexGuard<'_, MockSettings> {
        self.settings.lock().unwrap()
    }

    pub fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    /// Number of recorded commands equal to `command`.
    pub fn count(&self, command: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|c| c.as_str() == command).count()
    }

    /// Index of the first recorded command equal to `command`.
    pub fn position(&self, command: &str) -> Option<usize> {
        self.log.lock().unwrap().iter().position(|c| c == command)
    }

    pub fn drew(&self, key: FeatureKey) -> bool {
        self.count(&draw_model_command(key)) > 0
    }
}

pub(crate) fn draw_model_command(key: FeatureKey) -> String {
    format!("draw_model:{:?}", key)
}

// ============================================================================
// Mock GridVisibility
// ============================================================================

pub(crate) struct MockGridVisibility {
    settings: SharedSettings,
}

impl GridVisibility for MockGridVisibility {
    fn for_each_visible_quad(
        &self,
        _camera: &Camera,
        query: &GridQuery,
        visitor: &mut dyn FnMut(usize, usize),
    ) {
        match read(&self.settings, |s| s.visible_quads.clone()) {
            Some(quads) => {
                for (x, z) in quads {
                    visitor(x, z);
                }
            }
            None => {
                for z in 0..query.quads_y {
                    for x in 0..query.quads_x {
                        visitor(x, z);
                    }
                }
            }
        }
    }
}

// ============================================================================
// Mock Environment
// ============================================================================

pub(crate) struct MockEnvironment {
    log: CommandLog,
    settings: SharedSettings,
}

impl Environment for MockEnvironment {
    fn setup_fog(&mut self) {
        push(&self.log, "setup_fog".to_string());
    }

    fn disable_fog(&mut self) {
        push(&self.log, "disable_fog".to_string());
    }

    fn water_pass(&self) -> WaterPass {
        read(&self.settings, |s| s.water_pass)
    }

    fn object_visible_reflection(&self, _mid_pos: Vec3, _camera_pos: Vec3, _radius: f32) -> bool {
        read(&self.settings, |s| s.reflection_visible)
    }

    fn info_texture_enabled(&self) -> bool {
        read(&self.settings, |s| s.info_texture)
    }

    fn bind_info_texture(&mut self) {
        push(&self.log, "bind_info_texture".to_string());
    }

    fn unbind_info_texture(&mut self) {
        push(&self.log, "unbind_info_texture".to_string());
    }
}

// ============================================================================
// Mock FeatureRenderer
// ============================================================================

pub(crate) struct MockFeatureRenderer {
    log: CommandLog,
    settings: SharedSettings,
}

impl FeatureRenderer for MockFeatureRenderer {
    fn supports_deferred(&self) -> bool {
        read(&self.settings, |s| s.supports_deferred)
    }

    fn setup_opaque_drawing(&mut self, deferred: bool) {
        push(&self.log, format!("setup_opaque_drawing:{}", deferred));
    }

    fn reset_opaque_drawing(&mut self, deferred: bool) {
        push(&self.log, format!("reset_opaque_drawing:{}", deferred));
    }

    fn setup_alpha_drawing(&mut self, deferred: bool) {
        push(&self.log, format!("setup_alpha_drawing:{}", deferred));
    }

    fn reset_alpha_drawing(&mut self, deferred: bool) {
        push(&self.log, format!("reset_alpha_drawing:{}", deferred));
    }

    fn wants_fixed_function_alpha(&self) -> bool {
        read(&self.settings, |s| s.fixed_function_alpha)
    }

    fn push_model_render_state(&mut self, model_type: ModelType) {
        push(&self.log, format!("push_model_render_state:{:?}", model_type));
    }

    fn pop_model_render_state(&mut self, model_type: ModelType) {
        push(&self.log, format!("pop_model_render_state:{:?}", model_type));
    }

    fn bind_model_type_texture(&mut self, model_type: ModelType, texture: TextureKey) {
        push(&self.log, format!("bind_texture:{:?}:{}", model_type, texture.0));
    }

    fn bind_blank_texture(&mut self) {
        push(&self.log, "bind_blank_texture".to_string());
    }

    fn push_alpha_test(&mut self, state: AlphaTestState) {
        push(&self.log, format!("push_alpha_test:{:.2}:{}", state.threshold, state.depth_write));
    }

    fn pop_alpha_test(&mut self) {
        push(&self.log, "pop_alpha_test".to_string());
    }

    fn begin_shadow_generation(&mut self) {
        push(&self.log, "begin_shadow_generation".to_string());
    }

    fn end_shadow_generation(&mut self) {
        push(&self.log, "end_shadow_generation".to_string());
    }

    fn set_face_culling(&mut self, enabled: bool) {
        push(&self.log, format!("set_face_culling:{}", enabled));
    }

    fn set_team_colour(&mut self, team: u32, alpha: f32) {
        push(&self.log, format!("set_team_colour:{}:{:.2}", team, alpha));
    }

    fn set_feature_alpha(&mut self, alpha: f32, alpha_test_threshold: f32, fixed_function: bool) {
        push(&self.log, format!("set_feature_alpha:{:.2}:{:.2}:{}", alpha, alpha_test_threshold, fixed_function));
    }

    fn push_transform(&mut self, _transform: &Mat4) {
        push(&self.log, "push_transform".to_string());
    }

    fn pop_transform(&mut self) {
        push(&self.log, "pop_transform".to_string());
    }

    fn draw_model(&mut self, key: FeatureKey, _feature: &DrawableFeature) {
        push(&self.log, draw_model_command(key));
    }
}

// ============================================================================
// Mock MaterialObjectDrawer
// ============================================================================

pub(crate) struct MockMaterialObjects {
    log: CommandLog,
    settings: SharedSettings,
}

impl MaterialObjectDrawer for MockMaterialObjects {
    fn add_material_object(&mut self, key: FeatureKey, _feature: &DrawableFeature, pass: MaterialPass) -> bool {
        let claimed = read(&self.settings, |s| s.claimed.contains(&key));
        if claimed {
            push(&self.log, format!("claim:{:?}:{:?}", pass, key));
        }
        claimed
    }

    fn set_draw_pass_global_lod_factor(&mut self) {
        push(&self.log, "set_draw_pass_global_lod_factor".to_string());
    }

    fn draw_material_objects(&mut self, pass: MaterialPass, deferred: bool) {
        push(&self.log, format!("draw_material_objects:{:?}:{}", pass, deferred));
    }

    fn begin_deferred_pass(&mut self) {
        push(&self.log, "begin_deferred_pass".to_string());
    }

    fn end_deferred_pass(&mut self) {
        push(&self.log, "end_deferred_pass".to_string());
    }

    fn draw_single_object(&mut self, key: FeatureKey, _feature: &DrawableFeature, no_transform: bool) -> bool {
        let handled = read(&self.settings, |s| s.single_objects.contains(&key));
        if handled {
            push(&self.log, format!("draw_single_object:{:?}:{}", key, no_transform));
        }
        handled
    }

    fn reset_object_lod(&mut self, key: FeatureKey) {
        push(&self.log, format!("reset_object_lod:{:?}", key));
    }

    fn read_lod_scales(&mut self) {
        push(&self.log, "read_lod_scales".to_string());
    }
}

// ============================================================================
// Mock FarTextureHandler / GroundDecals
// ============================================================================

pub(crate) struct MockFarTextures {
    log: CommandLog,
}

impl FarTextureHandler for MockFarTextures {
    fn queue(&mut self, key: FeatureKey, _feature: &DrawableFeature) {
        push(&self.log, format!("far_queue:{:?}", key));
    }

    fn draw(&mut self) {
        push(&self.log, "far_draw".to_string());
    }
}

pub(crate) struct MockDecals {
    log: CommandLog,
}

impl GroundDecals for MockDecals {
    fn force_detach(&mut self, key: FeatureKey) {
        push(&self.log, format!("force_detach:{:?}", key));
    }
}
