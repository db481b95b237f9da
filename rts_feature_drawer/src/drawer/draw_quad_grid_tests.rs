use glam::Vec3;
use slotmap::SlotMap;
use crate::config::MapDims;
use crate::error::Error;
use crate::feature::{DrawableFeature, DrawQuad, DrawType, FeatureDesc, FeatureKey, FeatureModel, ModelType, TextureKey};
use super::*;

const Q: f32 = DrawQuadGrid::QUAD_WORLD_SIZE;

fn model(model_type: ModelType, texture: u32) -> FeatureModel {
    FeatureModel { model_type, texture: TextureKey(texture) }
}

fn add(features: &mut SlotMap<FeatureKey, DrawableFeature>, pos: Vec3, model: FeatureModel) -> FeatureKey {
    features.insert(DrawableFeature::new(FeatureDesc::at(pos, 10.0, model)))
}

/// Every registered feature sits in the bin its draw_quad names, and
/// nothing else is in any bin.
fn assert_grid_consistent(grid: &DrawQuadGrid, features: &SlotMap<FeatureKey, DrawableFeature>) {
    let mut registered = 0;
    for (key, feature) in features.iter() {
        match feature.draw_quad() {
            DrawQuad::Cell(index) => {
                let model = feature.model().unwrap();
                let cell = grid.cell(index).unwrap();
                assert!(cell.bin(model.model_type).contains(key));
                registered += 1;
            }
            _ => {
                for cell in grid.cells() {
                    assert!(cell.feature_keys().all(|k| k != key));
                }
            }
        }
    }
    assert_eq!(grid.feature_count(), registered);
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_grid_dimensions() {
    let grid = DrawQuadGrid::new(MapDims::new(2048, 1024)).unwrap();
    assert_eq!(grid.quads_x(), 64);
    assert_eq!(grid.quads_y(), 32);
    assert_eq!(grid.len(), 64 * 32);
    assert_eq!(grid.feature_count(), 0);
    assert!(grid.cells().iter().all(|cell| cell.last_draw_frame().is_none()));
}

#[test]
fn test_map_smaller_than_one_quad_is_rejected() {
    match DrawQuadGrid::new(MapDims::new(16, 512)) {
        Err(Error::InvalidMapDimensions(_)) => {}
        other => panic!("expected InvalidMapDimensions, got {:?}", other.map(|g| g.len())),
    }
}

// ============================================================================
// Quad index
// ============================================================================

#[test]
fn test_quad_index_for_positions() {
    let grid = DrawQuadGrid::new(MapDims::new(2048, 2048)).unwrap();

    assert_eq!(grid.quad_index_for(Vec3::new(0.0, 0.0, 0.0)), 0);
    assert_eq!(grid.quad_index_for(Vec3::new(2.5 * Q, 50.0, 3.5 * Q)), 194);
    assert_eq!(grid.quad_index_for(Vec3::new(Q, 0.0, 0.0)), 1);
    assert_eq!(grid.quad_index_for(Vec3::new(Q - 0.01, 0.0, 0.0)), 0);
}

#[test]
fn test_quad_index_clamps_off_map_positions() {
    let grid = DrawQuadGrid::new(MapDims::new(2048, 2048)).unwrap();

    assert_eq!(grid.quad_index_for(Vec3::new(-500.0, 0.0, -500.0)), 0);
    assert_eq!(grid.quad_index_for(Vec3::new(1.0e7, 0.0, 1.0e7)), 64 * 64 - 1);
    assert_eq!(grid.quad_index_for(Vec3::new(-10.0, 0.0, 1.0e7)), 63 * 64);
}

#[test]
fn test_quad_index_from_coords() {
    let grid = DrawQuadGrid::new(MapDims::new(2048, 2048)).unwrap();
    assert_eq!(grid.quad_index(2, 3), Some(194));
    assert_eq!(grid.quad_index(64, 0), None);
    assert_eq!(grid.quad_index(0, 64), None);
}

// ============================================================================
// Insert / relocate / remove
// ============================================================================

#[test]
fn test_insert_registers_in_model_bin() {
    let mut grid = DrawQuadGrid::new(MapDims::new(2048, 2048)).unwrap();
    let mut features = SlotMap::with_key();
    let key = add(&mut features, Vec3::new(2.5 * Q, 0.0, 3.5 * Q), model(ModelType::S3o, 4));

    assert!(grid.update_draw_quad(key, &mut features[key]));

    assert_eq!(features[key].draw_quad(), DrawQuad::Cell(194));
    let cell = grid.cell(194).unwrap();
    assert!(cell.bin(ModelType::S3o).contains(key));
    assert!(cell.bin(ModelType::ThreeDo).is_empty());
    let textures: Vec<_> = cell.bin(ModelType::S3o).textures().collect();
    assert_eq!(textures, vec![(TextureKey(4), &[key][..])]);
    assert_grid_consistent(&grid, &features);
}

#[test]
fn test_relocation_between_quads() {
    let mut grid = DrawQuadGrid::new(MapDims::new(2048, 2048)).unwrap();
    let mut features = SlotMap::with_key();
    let key = add(&mut features, Vec3::new(2.5 * Q, 0.0, 3.5 * Q), model(ModelType::S3o, 1));
    grid.update_draw_quad(key, &mut features[key]);

    features[key].set_position(Vec3::new(2.5 * Q, 0.0, 4.5 * Q));
    assert!(grid.update_draw_quad(key, &mut features[key]));

    assert_eq!(features[key].draw_quad(), DrawQuad::Cell(258));
    assert!(grid.cell(194).unwrap().is_empty());
    assert!(grid.cell(258).unwrap().bin(ModelType::S3o).contains(key));
    assert_grid_consistent(&grid, &features);
}

#[test]
fn test_move_within_quad_is_noop() {
    let mut grid = DrawQuadGrid::new(MapDims::new(2048, 2048)).unwrap();
    let mut features = SlotMap::with_key();
    let key = add(&mut features, Vec3::new(10.0, 0.0, 10.0), model(ModelType::Assimp, 0));
    grid.update_draw_quad(key, &mut features[key]);

    features[key].set_position(Vec3::new(200.0, 0.0, 30.0));
    assert!(!grid.update_draw_quad(key, &mut features[key]));

    assert_eq!(features[key].draw_quad(), DrawQuad::Cell(0));
    assert_eq!(grid.cell(0).unwrap().len(), 1);
}

#[test]
fn test_excluded_and_modelless_features_stay_out() {
    let mut grid = DrawQuadGrid::new(MapDims::new(512, 512)).unwrap();
    let mut features = SlotMap::with_key();

    let mut desc = FeatureDesc::at(Vec3::ZERO, 5.0, model(ModelType::S3o, 0));
    desc.draw_type = DrawType::Tree;
    let excluded = features.insert(DrawableFeature::new(desc));
    features[excluded].set_draw_quad(DrawQuad::Excluded);

    let mut desc = FeatureDesc::at(Vec3::ZERO, 5.0, model(ModelType::S3o, 0));
    desc.model = None;
    let modelless = features.insert(DrawableFeature::new(desc));

    assert!(!grid.update_draw_quad(excluded, &mut features[excluded]));
    assert!(!grid.update_draw_quad(modelless, &mut features[modelless]));

    assert_eq!(features[excluded].draw_quad(), DrawQuad::Excluded);
    assert_eq!(features[modelless].draw_quad(), DrawQuad::Unregistered);
    assert_eq!(grid.feature_count(), 0);
}

#[test]
fn test_remove_clears_bin_and_quad() {
    let mut grid = DrawQuadGrid::new(MapDims::new(512, 512)).unwrap();
    let mut features = SlotMap::with_key();
    let a = add(&mut features, Vec3::new(10.0, 0.0, 10.0), model(ModelType::ThreeDo, 2));
    let b = add(&mut features, Vec3::new(20.0, 0.0, 10.0), model(ModelType::ThreeDo, 2));
    grid.update_draw_quad(a, &mut features[a]);
    grid.update_draw_quad(b, &mut features[b]);

    assert!(grid.remove(a, &mut features[a]));
    assert!(!grid.remove(a, &mut features[a]));

    assert_eq!(features[a].draw_quad(), DrawQuad::Unregistered);
    let bin = grid.cell(0).unwrap().bin(ModelType::ThreeDo);
    assert!(!bin.contains(a));
    assert!(bin.contains(b));
    assert_grid_consistent(&grid, &features);

    assert!(grid.remove(b, &mut features[b]));
    assert!(grid.cell(0).unwrap().bin(ModelType::ThreeDo).textures().next().is_none());
}

#[test]
fn test_many_moves_keep_grid_consistent() {
    let mut grid = DrawQuadGrid::new(MapDims::new(1024, 1024)).unwrap();
    let mut features = SlotMap::with_key();
    let keys: Vec<_> = (0..40)
        .map(|i| {
            let model_type = ModelType::ALL[i % ModelType::COUNT];
            add(&mut features, Vec3::new(i as f32 * 97.0, 0.0, i as f32 * 53.0), model(model_type, (i % 5) as u32))
        })
        .collect();
    for &key in &keys {
        grid.update_draw_quad(key, &mut features[key]);
    }

    for step in 0..5 {
        for (i, &key) in keys.iter().enumerate() {
            let pos = Vec3::new(((i * 131 + step * 509) % 9000) as f32 - 500.0, 0.0, ((i * 71 + step * 313) % 9000) as f32);
            features[key].set_position(pos);
            grid.update_draw_quad(key, &mut features[key]);
            assert_eq!(features[key].draw_quad(), DrawQuad::Cell(grid.quad_index_for(pos)));
        }
        assert_grid_consistent(&grid, &features);
    }

    for &key in keys.iter().step_by(3) {
        grid.remove(key, &mut features[key]);
    }
    assert_grid_consistent(&grid, &features);
}

#[test]
fn test_mark_visited() {
    let mut grid = DrawQuadGrid::new(MapDims::new(512, 512)).unwrap();
    grid.mark_visited(3, 42);
    grid.mark_visited(10_000, 42);

    assert!(grid.cell(3).unwrap().visited_in(42));
    assert!(!grid.cell(3).unwrap().visited_in(43));
    assert!(!grid.cell(2).unwrap().visited_in(42));
}
