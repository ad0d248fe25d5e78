//! End-to-end tests for layered unstructured grids.
//!
//! The fixture mesh is a unit lattice with per-node layer elevations
//! `z(node, k) = 10 k + 0.5 (node % nx)`, so the vertical column at a
//! query point genuinely depends on the horizontal weights.

use mesh_grid::Grid;
use test_utils::{
    assert_approx_eq, layered_lattice_grid, layered_lattice_value, layered_lattice_z, MISSING,
};

#[test]
fn test_cell_location_in_face() {
    let grid = layered_lattice_grid(3, 3, 3);

    // (0.5, 0.5) is the center of face 0 (nodes 0, 1, 4, 3). The blended
    // column there is z_k = 10 k + 0.25, so z = 5.25 brackets layers 0-1.
    assert_eq!(grid.cell_indices(&[0.5, 0.5, 5.25]), Some(vec![0, 0]));
    assert_eq!(grid.cell_indices(&[0.5, 0.5, 15.25]), Some(vec![0, 1]));
    assert!(grid.inside(&[0.5, 0.5, 5.25]));

    // Center of the last face (nodes 4, 5, 8, 7).
    assert_eq!(grid.cell_indices(&[1.5, 1.5, 5.75]), Some(vec![3, 0]));
}

#[test]
fn test_outside_horizontal() {
    let grid = layered_lattice_grid(3, 3, 3);

    assert!(!grid.inside(&[-0.5, 0.5, 5.0]));
    assert_eq!(grid.cell_indices(&[2.5, 0.5, 5.0]), None);
    assert_eq!(grid.value_linear(&[-0.5, 0.5, 5.0]), MISSING);
    assert_eq!(grid.value_nearest(&[-0.5, 0.5, 5.0]), MISSING);
}

#[test]
fn test_outside_reconstructed_column() {
    let grid = layered_lattice_grid(3, 3, 3);

    // The blended column at (0.5, 0.5) tops out at 20.25, below the
    // grid-wide maximum elevation of 21: a point between the two is
    // outside at this horizontal position even though the global extents
    // contain it.
    assert!(grid.extents().contains(&[0.5, 0.5, 20.5]));
    assert!(!grid.inside(&[0.5, 0.5, 20.5]));
    assert_eq!(grid.value_linear(&[0.5, 0.5, 20.5]), MISSING);

    assert!(!grid.inside(&[0.5, 0.5, -1.0]));
}

#[test]
fn test_linear_value_blends_both_layers() {
    let grid = layered_lattice_grid(3, 3, 3);

    // Face 0 center: equal horizontal weights over nodes 0, 1, 4, 3 give
    // 2000 + k per layer; z = 5.25 splits the layer pair evenly.
    let v = grid.value_linear(&[0.5, 0.5, 5.25]);
    assert_approx_eq!(v, 2000.5, 1e-3);

    // At the bottom of the column only layer 0 contributes.
    let v = grid.value_linear(&[0.5, 0.5, 0.25]);
    assert_approx_eq!(v, 2000.0, 1e-3);
}

#[test]
fn test_nearest_value_picks_heaviest_node() {
    let grid = layered_lattice_grid(3, 3, 3);

    // (0.6, 0.55) weights node 4 (upper-right of face 0) heaviest; the
    // blended column keeps z = 5.25 closer to layer 0.
    let v = grid.value_nearest(&[0.6, 0.55, 5.25]);
    assert_eq!(v, layered_lattice_value(4, 0));

    // Near the top of the bracketing pair the upper layer wins.
    let v = grid.value_nearest(&[0.6, 0.55, 9.5]);
    assert_eq!(v, layered_lattice_value(4, 1));
}

#[test]
fn test_missing_node_renormalizes() {
    // Same lattice, but with node 4's bottom-layer value missing.
    let grid = layered_lattice_grid(3, 3, 2);
    let mv = grid.missing_value();
    assert_eq!(mv, MISSING);

    // Build a sibling grid with patched data through the public surface.
    let coords = grid.layered_coords().clone();
    let faces = grid.faces().to_vec();
    let index = std::sync::Arc::new(
        mesh_grid::LayeredGrid::build_index(&coords).expect("index over fixture coords"),
    );
    let mut data = Vec::new();
    for k in 0..2 {
        for node in 0..9 {
            if (node, k) == (4, 0) {
                data.push(MISSING);
            } else {
                data.push(layered_lattice_value(node, k));
            }
        }
    }
    let storage = mesh_grid::BlockStorage::contiguous(vec![9, 2], data, MISSING)
        .expect("patched storage");
    let patched =
        mesh_grid::LayeredGrid::new(storage, coords, faces, index).expect("patched grid");

    // Bottom-layer blend at the face center loses node 4 and renormalizes
    // over nodes 0, 1, 3.
    let expected0 = (layered_lattice_value(0, 0)
        + layered_lattice_value(1, 0)
        + layered_lattice_value(3, 0)) as f64
        / 3.0;
    // z = 0.25 is exactly the bottom of the blended column, so only the
    // renormalized bottom layer contributes.
    let v = patched.value_linear(&[0.5, 0.5, 0.25]);
    assert_approx_eq!(v, expected0, 0.1);
}

#[test]
fn test_user_coordinates_and_node_indices() {
    let grid = layered_lattice_grid(3, 3, 3);

    assert_eq!(
        grid.user_coordinates(&[4, 1]),
        vec![1.0, 1.0, layered_lattice_z(3, 4, 1)]
    );

    // Nearest node to (1.1, 0.9) is node 4; its own column brackets
    // z = 12 between layers 1 and 2.
    assert_eq!(grid.node_indices(&[1.1, 0.9, 12.0]), Some(vec![4, 1]));
    // Out-of-range Z clamps to the end layers.
    assert_eq!(grid.node_indices(&[1.1, 0.9, -5.0]), Some(vec![4, 0]));
    assert_eq!(grid.node_indices(&[1.1, 0.9, 99.0]), Some(vec![4, 2]));
}

#[test]
fn test_first_face_in_scan_order_wins() {
    let grid = layered_lattice_grid(3, 3, 2);

    // (1.0, 0.5) lies exactly on the edge shared by faces 0 and 1; the
    // lowest-numbered incident face claims it.
    let cell = grid.cell_indices(&[1.0, 0.5, 5.5]).expect("edge point is inside");
    assert_eq!(cell[0], 0);
}
