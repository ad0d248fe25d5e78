//! Ready-made grid fixtures for common test scenarios.

use std::sync::Arc;

use mesh_grid::{
    BlockStorage, CurvilinearGrid, HorizontalCoords, LayeredCoords, LayeredGrid, VerticalAxis,
};

use crate::generators::{create_test_field, unit_square_coords};
use crate::MISSING;

/// A 2D unit-square curvilinear grid with the standard test field.
pub fn curvilinear_grid_2d(nx: usize, ny: usize) -> CurvilinearGrid {
    curvilinear_grid_with(unit_square_coords(nx, ny), None, None)
}

/// A 3D unit-square curvilinear grid with the given layer elevations and
/// the standard test field.
pub fn curvilinear_grid_3d(nx: usize, ny: usize, levels: &[f64]) -> CurvilinearGrid {
    curvilinear_grid_with(unit_square_coords(nx, ny), Some(levels), None)
}

/// Build a curvilinear grid from arbitrary coordinates, layer elevations,
/// and (optionally) explicit field data.
///
/// With `data` omitted, the standard `i * 1000 + j + k * 100000` field is
/// used so samples can be verified arithmetically.
pub fn curvilinear_grid_with(
    coords: HorizontalCoords,
    levels: Option<&[f64]>,
    data: Option<Vec<f32>>,
) -> CurvilinearGrid {
    let [nx, ny] = coords.dims();
    let nz = levels.map(|l| l.len()).unwrap_or(1);

    let data = data.unwrap_or_else(|| create_test_field(nx, ny, nz));
    let mut dims = vec![nx, ny];
    if levels.is_some() {
        dims.push(nz);
    }
    let storage = BlockStorage::contiguous(dims, data, MISSING).expect("fixture storage");

    let vertical = levels.map(|l| VerticalAxis::new(l.to_vec()).expect("fixture vertical axis"));
    let index = Arc::new(CurvilinearGrid::build_index(&coords).expect("fixture index"));

    CurvilinearGrid::new(storage, coords, vertical, index).expect("fixture grid")
}

/// The reference scenario: a 3x3 unit-square horizontal mesh with two
/// layers at Z = 0 and Z = 10.
pub fn three_by_three_two_layer() -> CurvilinearGrid {
    curvilinear_grid_3d(3, 3, &[0.0, 10.0])
}

/// A layered unstructured grid built from a structured template.
///
/// Nodes sit on the unit lattice (`node = j * nx + i` at `(i, j)`), faces
/// are the lattice quads, and the elevation of node `n` at layer `k` is
/// `k * 10 + 0.5 * (n % nx)` — per-node Z variation, monotonic along the
/// layer axis. Values follow `node * 1000 + k`.
pub fn layered_lattice_grid(nx: usize, ny: usize, n_layers: usize) -> LayeredGrid {
    let n_nodes = nx * ny;

    let mut x = Vec::with_capacity(n_nodes);
    let mut y = Vec::with_capacity(n_nodes);
    for j in 0..ny {
        for i in 0..nx {
            x.push(i as f64);
            y.push(j as f64);
        }
    }

    let mut z = Vec::with_capacity(n_nodes * n_layers);
    for k in 0..n_layers {
        for node in 0..n_nodes {
            z.push(layered_lattice_z(nx, node, k));
        }
    }
    let coords = LayeredCoords::new(x, y, z, n_layers).expect("fixture layered coords");

    let mut faces = Vec::new();
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let origin = j * nx + i;
            faces.push([origin, origin + 1, origin + nx + 1, origin + nx]);
        }
    }

    let mut data = Vec::with_capacity(n_nodes * n_layers);
    for k in 0..n_layers {
        for node in 0..n_nodes {
            data.push((node * 1000 + k) as f32);
        }
    }
    let storage =
        BlockStorage::contiguous(vec![n_nodes, n_layers], data, MISSING).expect("fixture storage");

    let index = Arc::new(LayeredGrid::build_index(&coords).expect("fixture index"));
    LayeredGrid::new(storage, coords, faces, index).expect("fixture grid")
}

/// The elevation used by [`layered_lattice_grid`] for `node` at `layer`.
pub fn layered_lattice_z(nx: usize, node: usize, layer: usize) -> f64 {
    layer as f64 * 10.0 + 0.5 * (node % nx) as f64
}

/// The value used by [`layered_lattice_grid`] for `node` at `layer`.
pub fn layered_lattice_value(node: usize, layer: usize) -> f32 {
    (node * 1000 + layer) as f32
}
