//! Coordinate-iterator traversal and random-access equivalence.

use mesh_grid::util::vectorize_coords;
use mesh_grid::{CoordIterator, Grid};
use test_utils::{curvilinear_grid_3d, layered_lattice_grid, three_by_three_two_layer};

#[test]
fn test_traversal_matches_user_coordinates() {
    let grid = three_by_three_two_layer();
    let dims = grid.dimensions().to_vec();

    let mut count = 0;
    for (n, coords) in grid.coord_iter().enumerate() {
        let index = vectorize_coords(n, &dims);
        assert_eq!(coords, grid.user_coordinates(&index), "element {n}");
        count += 1;
    }
    assert_eq!(count, 18);
}

#[test]
fn test_advance_equals_sequential() {
    let grid = curvilinear_grid_3d(3, 4, &[0.0, 2.0, 7.0]);
    let total = 3 * 4 * 3;

    // Every skip distance, including those that wrap from the horizontal
    // plane into the next vertical layer and the one landing on the end.
    for n in 0..=total {
        let mut skipper = grid.coord_begin();
        skipper.advance(n as i64);

        let mut stepper = grid.coord_begin();
        for _ in 0..n {
            stepper.next();
        }

        assert_eq!(skipper.position(), stepper.position(), "after {n} steps");
        assert_eq!(skipper.next(), stepper.next(), "value after {n} steps");
    }
}

#[test]
fn test_split_advance_equals_one_advance() {
    let grid = curvilinear_grid_3d(4, 4, &[0.0, 1.0]);

    let mut split = grid.coord_begin();
    split.advance(7);
    split.advance(11);

    let mut whole = grid.coord_begin();
    whole.advance(18);

    assert_eq!(split.position(), whole.position());
    assert_eq!(split.next(), whole.next());
}

#[test]
fn test_end_sentinel_termination() {
    let grid = three_by_three_two_layer();
    let end = grid.coord_end();

    // The sentinel's slowest-axis index equals that axis's extent.
    assert_eq!(end.position(), &[0, 0, 2]);

    let mut it = grid.coord_begin();
    let mut visited = 0;
    while it.position() != end.position() {
        it.next();
        visited += 1;
    }
    assert_eq!(visited, 18);
}

#[test]
fn test_restart_reproduces_sequence() {
    let grid = three_by_three_two_layer();

    let first: Vec<Vec<f64>> = grid.coord_begin().collect();
    let second: Vec<Vec<f64>> = grid.coord_begin().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 18);
}

#[test]
fn test_layered_traversal_order() {
    let grid = layered_lattice_grid(3, 2, 2);
    let coords: Vec<Vec<f64>> = grid.coord_iter().collect();
    assert_eq!(coords.len(), 12);

    // Node sweep repeats per layer while Z keeps moving.
    assert_eq!(coords[0], grid.user_coordinates(&[0, 0]));
    assert_eq!(coords[5], grid.user_coordinates(&[5, 0]));
    assert_eq!(coords[6], grid.user_coordinates(&[0, 1]));
    assert_eq!(coords[11], grid.user_coordinates(&[5, 1]));
}

#[test]
fn test_layered_advance_equivalence() {
    let grid = layered_lattice_grid(3, 3, 2);
    let total = 18;

    for n in 0..=total {
        let mut skipper = grid.coord_begin();
        skipper.advance(n as i64);

        let mut stepper = grid.coord_begin();
        for _ in 0..n {
            stepper.next();
        }

        assert_eq!(skipper.position(), stepper.position(), "after {n} steps");
        assert_eq!(skipper.next(), stepper.next(), "value after {n} steps");
    }
}
