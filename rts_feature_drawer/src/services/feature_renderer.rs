/// Model renderer trait.
///
/// Everything the drawer needs from the GPU side: render state for the
/// opaque/alpha/shadow passes, texture binding, team colour and the model
/// draw call itself. Calls always come in matched push/pop or setup/reset
/// pairs.

use glam::Mat4;
use crate::feature::{DrawableFeature, FeatureKey, ModelType, TextureKey};

/// Alpha test state pushed around a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaTestState {
    /// Fragments with alpha at or below this are discarded
    pub threshold: f32,
    /// Force depth writes on while the state is pushed
    pub depth_write: bool,
}

pub trait FeatureRenderer: Send + Sync {
    /// Whether a geometry buffer exists for deferred shading.
    fn supports_deferred(&self) -> bool;

    fn setup_opaque_drawing(&mut self, deferred: bool);

    fn reset_opaque_drawing(&mut self, deferred: bool);

    fn setup_alpha_drawing(&mut self, deferred: bool);

    fn reset_alpha_drawing(&mut self, deferred: bool);

    /// Whether alpha has to go through the fixed-function material colour
    /// instead of the model shader.
    fn wants_fixed_function_alpha(&self) -> bool;

    fn push_model_render_state(&mut self, model_type: ModelType);

    fn pop_model_render_state(&mut self, model_type: ModelType);

    fn bind_model_type_texture(&mut self, model_type: ModelType, texture: TextureKey);

    /// Bind the 1x1 opaque texture (shadow pass, models without a mask).
    fn bind_blank_texture(&mut self);

    fn push_alpha_test(&mut self, state: AlphaTestState);

    fn pop_alpha_test(&mut self);

    /// Shadow map generation: depth bias on, shadow program bound.
    fn begin_shadow_generation(&mut self);

    fn end_shadow_generation(&mut self);

    fn set_face_culling(&mut self, enabled: bool);

    fn set_team_colour(&mut self, team: u32, alpha: f32);

    /// Per-feature alpha for the alpha pass.
    fn set_feature_alpha(&mut self, alpha: f32, alpha_test_threshold: f32, fixed_function: bool);

    fn push_transform(&mut self, transform: &Mat4);

    fn pop_transform(&mut self);

    /// Submit the model geometry with the current state.
    fn draw_model(&mut self, key: FeatureKey, feature: &DrawableFeature);
}
