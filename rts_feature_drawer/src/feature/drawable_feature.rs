/// Drawable feature types.
///
/// A DrawableFeature is owned by the FeatureTracker (slot map) and referred to
/// everywhere else by its FeatureKey. Simulation attributes are public; the
/// draw state (interpolated position, flag, alpha, quad) is written only by
/// the drawer.

use glam::{Mat4, Vec3};
use slotmap::new_key_type;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a feature known to the drawer.
    pub struct FeatureKey;
}

// ===== ENUMS =====

/// Per-frame render classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawFlag {
    /// Not drawn in the current pass
    #[default]
    NoDraw,
    /// Drawn as a fully opaque model
    Opaque,
    /// Drawn in the alpha pass with `draw_alpha`
    AlphaFading,
    /// Drawn into the shadow map
    Shadow,
    /// Replaced by a far-texture impostor
    FarImpostor,
}

/// Draw quad membership of a feature.
///
/// Integer form (see `as_raw`): `Cell(i)` is `i`, `Unregistered` is -1 and
/// `Excluded` is -2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawQuad {
    /// Not in any quad yet (or removed)
    Unregistered,
    /// Never tracked by the grid (non-model draw type)
    Excluded,
    /// Registered in the quad with this index
    Cell(usize),
}

impl DrawQuad {
    pub fn as_raw(self) -> i32 {
        match self {
            DrawQuad::Unregistered => -1,
            DrawQuad::Excluded => -2,
            DrawQuad::Cell(index) => index as i32,
        }
    }

    pub fn cell(self) -> Option<usize> {
        match self {
            DrawQuad::Cell(index) => Some(index),
            _ => None,
        }
    }
}

/// How the simulation wants the feature drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawType {
    /// Drawn from a 3D model (the only type this drawer handles)
    #[default]
    Model,
    /// Drawn by the tree renderer
    Tree,
    /// Not drawn at all
    None,
}

/// Model format; each format has its own render state and bin in a quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    /// Legacy format with clockwise winding and holes
    ThreeDo,
    S3o,
    Assimp,
}

impl ModelType {
    pub const COUNT: usize = 3;

    pub const ALL: [ModelType; Self::COUNT] = [ModelType::ThreeDo, ModelType::S3o, ModelType::Assimp];

    pub fn index(self) -> usize {
        match self {
            ModelType::ThreeDo => 0,
            ModelType::S3o => 1,
            ModelType::Assimp => 2,
        }
    }
}

/// Texture set a model is bound to, within its model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureKey(pub u32);

/// Model reference of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureModel {
    pub model_type: ModelType,
    pub texture: TextureKey,
}

// ===== DESC =====

/// Creation parameters of a DrawableFeature.
#[derive(Debug, Clone)]
pub struct FeatureDesc {
    pub pos: Vec3,
    /// Model center; defaults to `pos` when built with `at`
    pub mid_pos: Vec3,
    pub speed: Vec3,
    pub radius: f32,
    pub draw_radius: f32,
    pub transform: Mat4,
    pub draw_type: DrawType,
    pub model: Option<FeatureModel>,
    pub alpha_fade: bool,
    pub team: u32,
    pub los_ally_mask: u64,
}

impl FeatureDesc {
    /// Model feature at `pos`, fade-capable, visible to every ally team.
    pub fn at(pos: Vec3, radius: f32, model: FeatureModel) -> Self {
        Self {
            pos,
            mid_pos: pos,
            speed: Vec3::ZERO,
            radius,
            draw_radius: radius,
            transform: Mat4::from_translation(pos),
            draw_type: DrawType::Model,
            model: Some(model),
            alpha_fade: true,
            team: 0,
            los_ally_mask: u64::MAX,
        }
    }
}

// ===== DRAWABLE FEATURE =====

#[derive(Debug, Clone)]
pub struct DrawableFeature {
    // Simulation-owned attributes (read-only to the drawer)
    pub pos: Vec3,
    pub mid_pos: Vec3,
    pub speed: Vec3,
    pub draw_radius: f32,
    pub transform: Mat4,
    /// Fade with distance instead of popping out
    pub alpha_fade: bool,
    pub team: u32,
    /// Bit `n` set = in line of sight of ally team `n`
    pub los_ally_mask: u64,
    pub in_water: bool,
    pub in_void: bool,
    pub no_draw: bool,

    radius: f32,
    sq_radius: f32,
    // Model changes go through `FeatureTracker::set_model`
    draw_type: DrawType,
    model: Option<FeatureModel>,

    // Draw state (written by the drawer only)
    draw_pos: Vec3,
    draw_mid_pos: Vec3,
    draw_flag: DrawFlag,
    draw_alpha: f32,
    draw_quad: DrawQuad,
}

impl DrawableFeature {
    pub fn new(desc: FeatureDesc) -> Self {
        Self {
            pos: desc.pos,
            mid_pos: desc.mid_pos,
            speed: desc.speed,
            draw_radius: desc.draw_radius,
            transform: desc.transform,
            alpha_fade: desc.alpha_fade,
            team: desc.team,
            los_ally_mask: desc.los_ally_mask,
            in_water: false,
            in_void: false,
            no_draw: false,
            radius: desc.radius,
            sq_radius: desc.radius * desc.radius,
            draw_type: desc.draw_type,
            model: desc.model,
            draw_pos: desc.pos,
            draw_mid_pos: desc.mid_pos,
            draw_flag: DrawFlag::NoDraw,
            draw_alpha: 0.0,
            draw_quad: DrawQuad::Unregistered,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn sq_radius(&self) -> f32 {
        self.sq_radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
        self.sq_radius = radius * radius;
    }

    /// Move the feature: position, model center and transform translation
    /// shift together.
    pub fn set_position(&mut self, pos: Vec3) {
        let delta = pos - self.pos;
        self.pos = pos;
        self.mid_pos += delta;
        self.transform.w_axis += delta.extend(0.0);
    }

    pub fn is_in_los_for_ally_team(&self, ally_team: usize) -> bool {
        ally_team < 64 && (self.los_ally_mask >> ally_team) & 1 == 1
    }

    pub fn draw_type(&self) -> DrawType {
        self.draw_type
    }

    pub fn model(&self) -> Option<FeatureModel> {
        self.model
    }

    pub fn model_type(&self) -> Option<ModelType> {
        self.model.map(|model| model.model_type)
    }

    // ===== DRAW STATE =====

    /// Interpolated position for the current frame.
    pub fn draw_pos(&self) -> Vec3 {
        self.draw_pos
    }

    /// Interpolated model center for the current frame.
    pub fn draw_mid_pos(&self) -> Vec3 {
        self.draw_mid_pos
    }

    pub fn draw_flag(&self) -> DrawFlag {
        self.draw_flag
    }

    pub fn draw_alpha(&self) -> f32 {
        self.draw_alpha
    }

    pub fn draw_quad(&self) -> DrawQuad {
        self.draw_quad
    }

    pub(crate) fn set_draw_flag(&mut self, flag: DrawFlag) {
        self.draw_flag = flag;
    }

    pub(crate) fn set_draw_alpha(&mut self, alpha: f32) {
        self.draw_alpha = alpha;
    }

    pub(crate) fn set_draw_quad(&mut self, quad: DrawQuad) {
        self.draw_quad = quad;
    }

    /// Only valid while the feature is out of the grid.
    pub(crate) fn set_model(&mut self, model: Option<FeatureModel>) {
        debug_assert!(self.draw_quad.cell().is_none());
        self.model = model;
    }

    /// Interpolate the draw positions `time_offset` frames ahead.
    pub(crate) fn update_draw_pos(&mut self, time_offset: f32) {
        self.draw_pos = self.pos + self.speed * time_offset;
        self.draw_mid_pos = self.mid_pos + self.speed * time_offset;
    }
}

#[cfg(test)]
#[path = "drawable_feature_tests.rs"]
mod tests;
