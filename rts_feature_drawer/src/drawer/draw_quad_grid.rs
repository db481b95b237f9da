/// DrawQuadGrid: fixed 2D grid of draw quads over the map.
///
/// Each quad covers `DRAW_QUAD_SIZE × DRAW_QUAD_SIZE` heightmap squares and
/// holds one `ModelBin` per model type. A bin groups feature keys by texture
/// so the batcher binds each texture once per quad.
///
/// Invariant: a feature with `DrawQuad::Cell(i)` is in exactly one bin of
/// quad `i` (the bin of its model type, under its texture), and a feature
/// with any other `DrawQuad` is in no bin at all.

use glam::Vec3;
use rustc_hash::FxHashMap;
use crate::config::{MapDims, DRAW_QUAD_SIZE, SQUARE_SIZE};
use crate::error::Result;
use crate::feature::{DrawableFeature, DrawQuad, FeatureKey, ModelType, TextureKey};
use crate::{fd_bail, fd_info, fd_trace, fd_warn};

/// Features of one model type in one quad, grouped by texture.
#[derive(Debug, Default)]
pub struct ModelBin {
    textures: FxHashMap<TextureKey, Vec<FeatureKey>>,
}

impl ModelBin {
    fn add(&mut self, texture: TextureKey, key: FeatureKey) {
        self.textures.entry(texture).or_default().push(key);
    }

    fn remove(&mut self, texture: TextureKey, key: FeatureKey) -> bool {
        let Some(keys) = self.textures.get_mut(&texture) else {
            return false;
        };
        let Some(position) = keys.iter().position(|&k| k == key) else {
            return false;
        };
        keys.swap_remove(position);
        if keys.is_empty() {
            self.textures.remove(&texture);
        }
        true
    }

    /// Texture groups, in no particular order. Groups are never empty.
    pub fn textures(&self) -> impl Iterator<Item = (TextureKey, &[FeatureKey])> {
        self.textures.iter().map(|(&texture, keys)| (texture, keys.as_slice()))
    }

    pub fn contains(&self, key: FeatureKey) -> bool {
        self.textures.values().any(|keys| keys.contains(&key))
    }

    pub fn len(&self) -> usize {
        self.textures.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// One draw quad.
#[derive(Debug, Default)]
pub struct DrawQuadCell {
    last_draw_frame: Option<u64>,
    bins: [ModelBin; ModelType::COUNT],
}

impl DrawQuadCell {
    /// Last frame a classification visited this quad.
    pub fn last_draw_frame(&self) -> Option<u64> {
        self.last_draw_frame
    }

    pub fn visited_in(&self, frame: u64) -> bool {
        self.last_draw_frame == Some(frame)
    }

    pub fn bin(&self, model_type: ModelType) -> &ModelBin {
        &self.bins[model_type.index()]
    }

    /// Every feature in the quad, all model types.
    pub fn feature_keys(&self) -> impl Iterator<Item = FeatureKey> + '_ {
        self.bins
            .iter()
            .flat_map(|bin| bin.textures.values())
            .flat_map(|keys| keys.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.bins.iter().map(ModelBin::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.iter().all(ModelBin::is_empty)
    }
}

pub struct DrawQuadGrid {
    quads_x: usize,
    quads_y: usize,
    cells: Vec<DrawQuadCell>,
}

impl DrawQuadGrid {
    /// Edge length of a quad in world units.
    pub const QUAD_WORLD_SIZE: f32 = DRAW_QUAD_SIZE as f32 * SQUARE_SIZE;

    /// Create an empty grid covering the map.
    ///
    /// Fails when the map is smaller than one quad on either axis.
    pub fn new(map: MapDims) -> Result<Self> {
        let quads_x = map.draw_quads_x();
        let quads_y = map.draw_quads_y();
        if quads_x == 0 || quads_y == 0 {
            fd_bail!("rts::DrawQuadGrid", InvalidMapDimensions,
                "map of {}x{} squares is smaller than one draw quad ({} squares)",
                map.mapx, map.mapy, DRAW_QUAD_SIZE);
        }

        let mut cells = Vec::with_capacity(quads_x * quads_y);
        cells.resize_with(quads_x * quads_y, DrawQuadCell::default);

        fd_info!("rts::DrawQuadGrid", "Created {}x{} draw quads", quads_x, quads_y);

        Ok(Self { quads_x, quads_y, cells })
    }

    pub fn quads_x(&self) -> usize {
        self.quads_x
    }

    pub fn quads_y(&self) -> usize {
        self.quads_y
    }

    /// Total number of quads.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Quad containing a world position; positions off the map clamp to
    /// the border quads.
    pub fn quad_index_for(&self, pos: Vec3) -> usize {
        let x = Self::clamp_axis(pos.x, self.quads_x);
        let z = Self::clamp_axis(pos.z, self.quads_y);
        z * self.quads_x + x
    }

    fn clamp_axis(coord: f32, quads: usize) -> usize {
        let quad = (coord / Self::QUAD_WORLD_SIZE).floor() as i64;
        quad.clamp(0, quads as i64 - 1) as usize
    }

    /// Index of quad `(x, z)`, or `None` outside the grid.
    pub fn quad_index(&self, x: usize, z: usize) -> Option<usize> {
        (x < self.quads_x && z < self.quads_y).then(|| z * self.quads_x + x)
    }

    pub fn cell(&self, index: usize) -> Option<&DrawQuadCell> {
        self.cells.get(index)
    }

    pub fn cells(&self) -> &[DrawQuadCell] {
        &self.cells
    }

    /// Number of features registered in all quads.
    pub fn feature_count(&self) -> usize {
        self.cells.iter().map(DrawQuadCell::len).sum()
    }

    pub(crate) fn mark_visited(&mut self, index: usize, frame: u64) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.last_draw_frame = Some(frame);
        }
    }

    /// Register the feature in the quad under its position, or move it there.
    ///
    /// Excluded features and features without a model are left alone. A
    /// feature already in the target quad is not touched. Returns true when
    /// the feature changed quad.
    pub fn update_draw_quad(&mut self, key: FeatureKey, feature: &mut DrawableFeature) -> bool {
        let old_quad = feature.draw_quad();
        if old_quad == DrawQuad::Excluded {
            return false;
        }
        let Some(model) = feature.model() else {
            return false;
        };

        let new_index = self.quad_index_for(feature.pos);
        if old_quad == DrawQuad::Cell(new_index) {
            return false;
        }
        debug_assert!(new_index < self.cells.len());

        if let DrawQuad::Cell(old_index) = old_quad {
            debug_assert!(old_index < self.cells.len());
            let removed = self.cells
                .get_mut(old_index)
                .is_some_and(|cell| cell.bins[model.model_type.index()].remove(model.texture, key));
            if !removed {
                fd_warn!("rts::DrawQuadGrid", "Feature {:?} missing from its quad {}", key, old_index);
            }
        }

        self.cells[new_index].bins[model.model_type.index()].add(model.texture, key);
        feature.set_draw_quad(DrawQuad::Cell(new_index));

        fd_trace!("rts::DrawQuadGrid", "Feature {:?} quad {} -> {}",
            key, old_quad.as_raw(), new_index);
        true
    }

    /// Take the feature out of its quad. Returns false if it was in none.
    pub fn remove(&mut self, key: FeatureKey, feature: &mut DrawableFeature) -> bool {
        let DrawQuad::Cell(index) = feature.draw_quad() else {
            return false;
        };
        let removed = match (feature.model(), self.cells.get_mut(index)) {
            (Some(model), Some(cell)) => cell.bins[model.model_type.index()].remove(model.texture, key),
            _ => false,
        };
        if !removed {
            fd_warn!("rts::DrawQuadGrid", "Feature {:?} missing from its quad {}", key, index);
        }
        feature.set_draw_quad(DrawQuad::Unregistered);
        removed
    }
}

#[cfg(test)]
#[path = "draw_quad_grid_tests.rs"]
mod tests;
