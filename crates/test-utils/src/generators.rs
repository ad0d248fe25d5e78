//! Generators for synthetic mesh coordinates and field values.
//!
//! These generators create predictable, verifiable patterns that can be
//! checked arithmetically from the test site.

use mesh_grid::{HorizontalCoords, ScalarField2};

/// Unit-square curvilinear coordinates: node `(i, j)` sits at `(i, j)`.
///
/// Cells are exact unit squares, so expected cell indices and
/// interpolation weights can be written down directly.
pub fn unit_square_coords(nx: usize, ny: usize) -> HorizontalCoords {
    let mut xs = Vec::with_capacity(nx * ny);
    let mut ys = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            xs.push(i as f64);
            ys.push(j as f64);
        }
    }
    HorizontalCoords::new(
        ScalarField2::new([nx, ny], xs).expect("generated X field is well-formed"),
        ScalarField2::new([nx, ny], ys).expect("generated Y field is well-formed"),
    )
    .expect("generated fields share one index space")
}

/// Sheared curvilinear coordinates: node `(i, j)` sits at
/// `(i + shear * j, j)`.
///
/// Genuinely non-rectilinear (cells are parallelograms) while staying
/// monotonic along both grid axes.
pub fn sheared_coords(nx: usize, ny: usize, shear: f64) -> HorizontalCoords {
    let mut xs = Vec::with_capacity(nx * ny);
    let mut ys = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            xs.push(i as f64 + shear * j as f64);
            ys.push(j as f64);
        }
    }
    HorizontalCoords::new(
        ScalarField2::new([nx, ny], xs).expect("generated X field is well-formed"),
        ScalarField2::new([nx, ny], ys).expect("generated Y field is well-formed"),
    )
    .expect("generated fields share one index space")
}

/// A value field with the pattern `i * 1000 + j + k * 100000`, canonical
/// (i fastest) order.
///
/// Any sample can be verified by recomputing the pattern from its index.
pub fn create_test_field(nx: usize, ny: usize, nz: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                data.push((i * 1000 + j + k * 100_000) as f32);
            }
        }
    }
    data
}

/// The expected value of [`create_test_field`] at node `(i, j, k)`.
pub fn test_field_value(i: usize, j: usize, k: usize) -> f32 {
    (i * 1000 + j + k * 100_000) as f32
}

/// A constant-valued field.
pub fn constant_field(len: usize, value: f32) -> Vec<f32> {
    vec![value; len]
}
