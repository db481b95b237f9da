/// World environment seen by the feature drawer: fog, water passes and the
/// info-texture overlay.

use glam::Vec3;

/// Water render pass currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaterPass {
    #[default]
    None,
    /// Mirrored scene above the water surface
    Reflection,
    /// Scene below the water surface
    Refraction,
}

impl WaterPass {
    pub fn is_active(self) -> bool {
        self != WaterPass::None
    }
}

pub trait Environment: Send + Sync {
    fn setup_fog(&mut self);

    fn disable_fog(&mut self);

    fn water_pass(&self) -> WaterPass;

    /// Whether an object centered at `mid_pos` shows up in the water
    /// reflection seen from `camera_pos`.
    fn object_visible_reflection(&self, mid_pos: Vec3, camera_pos: Vec3, radius: f32) -> bool;

    /// Whether an info texture (LOS, metal, height...) overlays the map.
    fn info_texture_enabled(&self) -> bool;

    fn bind_info_texture(&mut self);

    fn unbind_info_texture(&mut self);
}
