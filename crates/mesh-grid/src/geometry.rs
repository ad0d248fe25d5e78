//! Generalized barycentric coordinates on quadrilateral cells.

use nalgebra::{Point2, Vector2};

/// 2D cross product (z component of the 3D cross).
fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.perp(&b)
}

/// Wachspress coordinates of `p` within a quadrilateral.
///
/// `verts` lists the four corners in cyclic order (either winding).
/// Returns `Some(weights)` summing to 1 when the point is inside or on the
/// boundary of the quad, `None` otherwise.
///
/// The weights are evaluated in product form,
/// `w_i = C_i * A_{i+1} * A_{i+2}`, where `A_j` is the signed area of the
/// triangle spanned by edge `j` and `p`, and `C_i` the corner area at
/// vertex `i`. Unlike the ratio form this involves no division by the edge
/// areas, so a point exactly on an edge or vertex yields the correct
/// degenerate weights (the on-edge corner pair splits the full weight)
/// instead of dividing by zero.
///
/// Weights are meaningful for convex quads; the inside test itself (uniform
/// sign of the four edge areas) is what callers rely on to pick a cell.
pub fn wachspress_weights(verts: &[Point2<f64>; 4], p: Point2<f64>) -> Option<[f64; 4]> {
    // Twice the signed area of each edge triangle (v_i, v_{i+1}, p).
    let mut area = [0.0f64; 4];
    for i in 0..4 {
        let a = verts[i];
        let b = verts[(i + 1) % 4];
        area[i] = cross(b - a, p - a);
    }

    // The edge areas sum to twice the signed quad area, independent of p;
    // the sign gives the winding. Normalize to a counter-clockwise view.
    let total: f64 = area.iter().sum();
    if total == 0.0 {
        // Fully degenerate (zero-area) quad contains nothing.
        return None;
    }
    if total < 0.0 {
        for a in &mut area {
            *a = -*a;
        }
    }

    // Inside iff the point is on the interior side of every edge, with a
    // relative tolerance so points on shared edges are claimed by one of
    // the adjacent cells rather than falling between them.
    let eps = 1.0e-12 * total.abs();
    if area.iter().any(|&a| a < -eps) {
        return None;
    }
    for a in &mut area {
        if *a < 0.0 {
            *a = 0.0;
        }
    }

    let mut weights = [0.0f64; 4];
    for i in 0..4 {
        let prev = verts[(i + 3) % 4];
        let here = verts[i];
        let next = verts[(i + 1) % 4];
        let corner = cross(here - prev, next - here);
        weights[i] = corner * area[(i + 1) % 4] * area[(i + 2) % 4];
    }

    let sum: f64 = weights.iter().sum();
    if sum == 0.0 {
        return None;
    }
    for w in &mut weights {
        *w /= sum;
    }

    Some(weights)
}
