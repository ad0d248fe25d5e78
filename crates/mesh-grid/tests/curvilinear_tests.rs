//! End-to-end tests for curvilinear grid point location and sampling.

use mesh_grid::{sample_points, Grid, SamplingMethod};
use test_utils::{
    assert_approx_eq, curvilinear_grid_2d, curvilinear_grid_3d, curvilinear_grid_with,
    sheared_coords, test_field_value, three_by_three_two_layer, unit_square_coords, MISSING,
};

// ============================================================================
// Reference scenario: 3x3 unit cells, two layers at Z = {0, 10}
// ============================================================================

#[test]
fn test_scenario_cell_resolution() {
    let grid = three_by_three_two_layer();

    // (1.5, 1.5, 5.0) sits in the cell bounded by nodes (1,1)-(2,2),
    // between the two layers.
    assert_eq!(grid.cell_indices(&[1.5, 1.5, 5.0]), Some(vec![1, 1, 0]));
    assert!(grid.inside(&[1.5, 1.5, 5.0]));
}

#[test]
fn test_scenario_linear_value() {
    let grid = three_by_three_two_layer();

    // Cell corners average to 1501.5 on the bottom layer and 101501.5 on
    // the top; the layer weights are (0.5, 0.5).
    let v = grid.value_linear(&[1.5, 1.5, 5.0]);
    assert_approx_eq!(v, 51501.5, 0.1);
}

#[test]
fn test_scenario_nearest_value() {
    let grid = three_by_three_two_layer();

    // All four corners tie on horizontal weight and both layers tie on
    // vertical weight; the scan-order corner (cell origin, lower layer)
    // wins the tie.
    let v = grid.value_nearest(&[1.5, 1.5, 5.0]);
    assert_eq!(v, test_field_value(1, 1, 0));

    // Decidedly nearer to node (2, 2) and the top layer.
    let v = grid.value_nearest(&[1.9, 1.9, 9.0]);
    assert_eq!(v, test_field_value(2, 2, 1));
}

// ============================================================================
// Inside / outside contract
// ============================================================================

#[test]
fn test_points_inside_known_cells() {
    let grid = curvilinear_grid_2d(4, 4);

    for j in 0..3 {
        for i in 0..3 {
            let p = [i as f64 + 0.5, j as f64 + 0.5];
            assert_eq!(grid.cell_indices(&p), Some(vec![i, j]), "cell ({i},{j})");
            assert!(grid.inside(&p));
        }
    }
}

#[test]
fn test_outside_extents() {
    let grid = three_by_three_two_layer();

    for p in [
        [-0.5, 1.0, 5.0],
        [2.5, 1.0, 5.0],
        [1.0, -0.5, 5.0],
        [1.0, 2.5, 5.0],
    ] {
        assert!(!grid.inside(&p), "{p:?}");
        assert_eq!(grid.cell_indices(&p), None, "{p:?}");
        assert_eq!(grid.value_linear(&p), MISSING, "{p:?}");
        assert_eq!(grid.value_nearest(&p), MISSING, "{p:?}");
    }
}

#[test]
fn test_outside_vertical_range() {
    let grid = three_by_three_two_layer();

    // Horizontal position is fine; Z is out of range on either side.
    assert!(!grid.inside(&[1.5, 1.5, -0.1]));
    assert!(!grid.inside(&[1.5, 1.5, 10.5]));
    assert_eq!(grid.value_linear(&[1.5, 1.5, 10.5]), MISSING);
    assert_eq!(grid.cell_indices(&[1.5, 1.5, -0.1]), None);
}

// ============================================================================
// Round-trip: index -> coords -> cell -> coords
// ============================================================================

#[test]
fn test_roundtrip_interior_indices() {
    let grid = curvilinear_grid_3d(4, 4, &[0.0, 5.0, 10.0]);

    for idx in [[1usize, 1, 1], [2, 1, 1], [1, 2, 1], [2, 2, 1]] {
        let coords = grid.user_coordinates(&idx);
        let cell = grid.cell_indices(&coords).expect("node coordinate is inside");
        assert_eq!(cell, idx.to_vec(), "cell for index {idx:?}");
        assert_eq!(grid.user_coordinates(&cell), coords);
    }
}

#[test]
fn test_user_coordinates_clamps() {
    let grid = three_by_three_two_layer();
    assert_eq!(grid.user_coordinates(&[1, 2, 0]), vec![1.0, 2.0, 0.0]);
    assert_eq!(grid.user_coordinates(&[9, 9, 9]), vec![2.0, 2.0, 10.0]);
}

// ============================================================================
// Interpolation on a genuinely non-rectilinear mesh
// ============================================================================

#[test]
fn test_sheared_mesh_linear_field() {
    // Nodes at (i + 0.5 j, j) carrying the value 1000 i + j; in physical
    // coordinates that is the linear field 1000 x - 499 y, which the
    // Wachspress blend must reproduce exactly.
    let grid = curvilinear_grid_with(sheared_coords(4, 4, 0.5), None, None);

    assert_eq!(grid.cell_indices(&[2.0, 1.5]), Some(vec![1, 1]));

    let v = grid.value_linear(&[2.0, 1.5]);
    assert_approx_eq!(v, 1000.0 * 2.0 - 499.0 * 1.5, 1e-2);

    let v = grid.value_linear(&[1.3, 0.4]);
    assert_approx_eq!(v, 1000.0 * 1.3 - 499.0 * 0.4, 1e-2);
}

// ============================================================================
// Missing-value propagation
// ============================================================================

#[test]
fn test_missing_corner_renormalizes() {
    // Node (1,1) on the bottom layer is missing; the other three corners
    // of the center cell share the weight.
    let mut data = Vec::new();
    for k in 0..2 {
        for j in 0..3 {
            for i in 0..3 {
                if (i, j, k) == (1, 1, 0) {
                    data.push(MISSING);
                } else {
                    data.push(test_field_value(i, j, k));
                }
            }
        }
    }
    let grid = curvilinear_grid_with(
        unit_square_coords(3, 3),
        Some(&[0.0, 10.0]),
        Some(data),
    );

    // Bottom-layer blend at the cell center: mean of the surviving corners.
    let expected0 = (test_field_value(2, 1, 0)
        + test_field_value(2, 2, 0)
        + test_field_value(1, 2, 0)) as f64
        / 3.0;
    let v = grid.value_linear(&[1.5, 1.5, 0.0]);
    assert_approx_eq!(v, expected0, 0.1);
}

#[test]
fn test_missing_layer_uses_other_layer() {
    // The entire top layer is missing: its vertical weight is zeroed and
    // the bottom layer is used in full, even halfway between layers.
    let mut data = Vec::new();
    for k in 0..2 {
        for j in 0..3 {
            for i in 0..3 {
                if k == 1 {
                    data.push(MISSING);
                } else {
                    data.push(test_field_value(i, j, k));
                }
            }
        }
    }
    let grid = curvilinear_grid_with(
        unit_square_coords(3, 3),
        Some(&[0.0, 10.0]),
        Some(data),
    );

    let v = grid.value_linear(&[1.5, 1.5, 5.0]);
    assert_approx_eq!(v, 1501.5, 0.1);
}

#[test]
fn test_all_missing_returns_sentinel() {
    let data = vec![MISSING; 18];
    let grid = curvilinear_grid_with(
        unit_square_coords(3, 3),
        Some(&[0.0, 10.0]),
        Some(data),
    );
    assert_eq!(grid.value_linear(&[1.5, 1.5, 5.0]), MISSING);
    // The point still locates: missing data is not "outside".
    assert!(grid.inside(&[1.5, 1.5, 5.0]));
}

// ============================================================================
// Supplemental queries
// ============================================================================

#[test]
fn test_node_indices() {
    let grid = three_by_three_two_layer();

    assert_eq!(grid.node_indices(&[1.6, 1.6, 9.0]), Some(vec![2, 2, 0]));
    // Z clamps to the nearest end layer when out of range.
    assert_eq!(grid.node_indices(&[0.1, 0.1, -5.0]), Some(vec![0, 0, 0]));
    assert_eq!(grid.node_indices(&[0.1, 0.1, 99.0]), Some(vec![0, 0, 1]));
}

#[test]
fn test_bounding_box() {
    let grid = three_by_three_two_layer();
    let (minu, maxu) = grid.bounding_box(&[1, 1, 0], &[2, 2, 1]);
    assert_eq!(minu, vec![1.0, 1.0, 0.0]);
    assert_eq!(maxu, vec![2.0, 2.0, 10.0]);
}

#[test]
fn test_enclosing_region() {
    let grid = curvilinear_grid_3d(4, 4, &[0.0, 5.0, 10.0]);

    let (min, max) = grid.enclosing_region(&[1.2, 1.2, 5.5], &[1.8, 1.8, 9.5]);
    assert_eq!(min, vec![1, 1, 1]);
    assert_eq!(max, vec![2, 2, 2]);

    // A region covering everything keeps the full box.
    let (min, max) = grid.enclosing_region(&[-10.0, -10.0, -10.0], &[10.0, 10.0, 20.0]);
    assert_eq!(min, vec![0, 0, 0]);
    assert_eq!(max, vec![3, 3, 2]);
}

#[test]
fn test_min_cell_extents() {
    let grid = three_by_three_two_layer();
    let ext = grid.min_cell_extents();
    assert_eq!(ext, vec![1.0, 1.0, 10.0]);
}

// ============================================================================
// Batch sampling and trait-object use
// ============================================================================

#[test]
fn test_sample_points_matches_single_queries() {
    let grid = three_by_three_two_layer();

    let points: Vec<Vec<f64>> = (0..40)
        .map(|n| {
            vec![
                (n % 7) as f64 * 0.4 - 0.2,
                (n % 5) as f64 * 0.6 - 0.3,
                (n % 11) as f64 * 1.3 - 1.0,
            ]
        })
        .collect();

    for method in [SamplingMethod::Linear, SamplingMethod::Nearest] {
        let batch = sample_points(&grid, &points, method);
        assert_eq!(batch.len(), points.len());
        for (point, &sampled) in points.iter().zip(&batch) {
            assert_eq!(sampled, grid.value(point, method), "{point:?}");
        }
    }
}

#[test]
fn test_grid_trait_object() {
    let grid: Box<dyn Grid> = Box::new(three_by_three_two_layer());

    assert_eq!(grid.dimensions(), &[3, 3, 2]);
    assert_eq!(grid.geometry_dim(), 3);
    assert!(grid.inside(&[1.5, 1.5, 5.0]));

    let batch = sample_points(grid.as_ref(), &[vec![1.5, 1.5, 5.0]], SamplingMethod::Linear);
    assert_approx_eq!(batch[0], 51501.5, 0.1);
}
