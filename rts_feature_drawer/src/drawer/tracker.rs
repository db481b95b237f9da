/// FeatureTracker: owns the drawable features and follows their lifecycle.
///
/// Creation, movement and destruction events from the simulation land here.
/// The tracker keeps the grid in sync with feature positions and the live
/// list of model features that the per-frame update walks.

use glam::Vec3;
use slotmap::SlotMap;

use crate::feature::{DrawableFeature, DrawQuad, DrawType, FeatureKey, FeatureModel};
use crate::services::{GroundDecals, MaterialObjectDrawer};
use crate::fd_trace;
use super::culler::FeatureCuller;
use super::draw_quad_grid::DrawQuadGrid;

pub struct FeatureTracker {
    features: SlotMap<FeatureKey, DrawableFeature>,
    /// Model features, unordered
    live: Vec<FeatureKey>,
}

impl FeatureTracker {
    pub fn new() -> Self {
        Self {
            features: SlotMap::with_key(),
            live: Vec::new(),
        }
    }

    // ===== LIFECYCLE =====

    /// Start tracking a new feature.
    ///
    /// Features not drawn as models are stored but permanently excluded
    /// from the grid and the live list.
    pub fn feature_created(&mut self, mut feature: DrawableFeature, grid: &mut DrawQuadGrid) -> FeatureKey {
        if feature.draw_type() != DrawType::Model {
            feature.set_draw_quad(DrawQuad::Excluded);
            let key = self.features.insert(feature);
            fd_trace!("rts::FeatureTracker", "Feature {:?} created, not a model", key);
            return key;
        }

        feature.set_draw_quad(DrawQuad::Unregistered);
        FeatureCuller::reset_fade(&mut feature);

        let key = self.features.insert(feature);
        grid.update_draw_quad(key, &mut self.features[key]);
        self.live.push(key);

        fd_trace!("rts::FeatureTracker", "Feature {:?} created in quad {}",
            key, self.features[key].draw_quad().as_raw());
        key
    }

    /// Stop tracking a feature. Returns it, or `None` for an unknown key.
    pub fn feature_destroyed(
        &mut self,
        key: FeatureKey,
        grid: &mut DrawQuadGrid,
        decals: &mut dyn GroundDecals,
        material_objects: &mut dyn MaterialObjectDrawer,
    ) -> Option<DrawableFeature> {
        let mut feature = self.features.remove(key)?;

        if feature.draw_type() == DrawType::Model {
            if let Some(position) = self.live.iter().position(|&k| k == key) {
                self.live.swap_remove(position);
            }
        }
        if matches!(feature.draw_quad(), DrawQuad::Cell(_)) {
            grid.remove(key, &mut feature);
        }

        decals.force_detach(key);
        material_objects.reset_object_lod(key);

        fd_trace!("rts::FeatureTracker", "Feature {:?} destroyed", key);
        Some(feature)
    }

    /// The feature moved from `old_pos`; move it to its new quad if needed.
    ///
    /// Returns true when the feature changed quad.
    pub fn feature_moved(&mut self, key: FeatureKey, old_pos: Vec3, grid: &mut DrawQuadGrid) -> bool {
        let Some(feature) = self.features.get_mut(key) else {
            return false;
        };
        let moved = grid.update_draw_quad(key, feature);
        if moved {
            fd_trace!("rts::FeatureTracker", "Feature {:?} moved from {:?} to quad {}",
                key, old_pos, feature.draw_quad().as_raw());
        }
        moved
    }

    /// Set a feature's position and follow the move in the grid.
    ///
    /// Returns false for an unknown key.
    pub fn set_position(&mut self, key: FeatureKey, pos: Vec3, grid: &mut DrawQuadGrid) -> bool {
        let Some(feature) = self.features.get_mut(key) else {
            return false;
        };
        let old_pos = feature.pos;
        feature.set_position(pos);
        self.feature_moved(key, old_pos, grid);
        true
    }

    /// Swap a feature's model, moving it to the bin of the new model type
    /// and texture. Without a model the feature leaves the grid.
    ///
    /// Returns false for an unknown key.
    pub fn set_model(&mut self, key: FeatureKey, model: Option<FeatureModel>, grid: &mut DrawQuadGrid) -> bool {
        let Some(feature) = self.features.get_mut(key) else {
            return false;
        };
        if feature.draw_quad() == DrawQuad::Excluded {
            feature.set_model(model);
            return true;
        }

        if matches!(feature.draw_quad(), DrawQuad::Cell(_)) {
            grid.remove(key, feature);
        }
        feature.set_model(model);
        grid.update_draw_quad(key, feature);

        fd_trace!("rts::FeatureTracker", "Feature {:?} model set to {:?}, quad {}",
            key, model, feature.draw_quad().as_raw());
        true
    }

    // ===== FRAME UPDATE =====

    /// Interpolate draw positions and clear last frame's alpha.
    pub fn update_draw_positions(&mut self, time_offset: f32) {
        for &key in &self.live {
            if let Some(feature) = self.features.get_mut(key) {
                feature.update_draw_pos(time_offset);
                FeatureCuller::reset_fade(feature);
            }
        }
    }

    /// Re-register every live feature in a freshly built grid.
    pub fn register_all(&mut self, grid: &mut DrawQuadGrid) -> usize {
        let mut registered = 0;
        for &key in &self.live {
            if let Some(feature) = self.features.get_mut(key) {
                feature.set_draw_quad(DrawQuad::Unregistered);
                grid.update_draw_quad(key, feature);
                if feature.draw_quad().cell().is_some() {
                    registered += 1;
                }
            }
        }
        registered
    }

    // ===== ACCESSORS =====

    pub fn feature(&self, key: FeatureKey) -> Option<&DrawableFeature> {
        self.features.get(key)
    }

    /// Mutable access for simulation-owned attributes (LOS, water, ...).
    /// Position changes go through `set_position`, model changes through
    /// `set_model`.
    pub fn feature_mut(&mut self, key: FeatureKey) -> Option<&mut DrawableFeature> {
        self.features.get_mut(key)
    }

    pub fn features(&self) -> &SlotMap<FeatureKey, DrawableFeature> {
        &self.features
    }

    pub(crate) fn features_mut(&mut self) -> &mut SlotMap<FeatureKey, DrawableFeature> {
        &mut self.features
    }

    /// Keys of the live model features, in no particular order.
    pub fn live_keys(&self) -> &[FeatureKey] {
        &self.live
    }

    /// Number of tracked features, excluded ones included.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
