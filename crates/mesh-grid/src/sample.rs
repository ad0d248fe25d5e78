//! Value blending with missing-data awareness.

use rayon::prelude::*;

use crate::grid::Grid;
use crate::types::SamplingMethod;

/// Blend four corner samples with generalized barycentric weights.
///
/// A corner equal to the `missing` sentinel has its weight zeroed and the
/// remaining weights are renormalized to sum to 1, so absent corners drop
/// out of the blend instead of poisoning it. If all four corners are
/// missing, the result is the sentinel itself. With no missing corners this
/// is the plain weighted sum.
///
/// The result always lies within the convex hull of the non-missing inputs;
/// exact bitwise reproducibility across platforms is not promised.
pub fn interpolate_quad(values: [f32; 4], lambda: [f64; 4], missing: f32) -> f32 {
    let mut weights = lambda;
    let mut total = 0.0f64;
    let mut n_missing = 0;
    for i in 0..4 {
        if values[i] == missing {
            weights[i] = 0.0;
            n_missing += 1;
        } else {
            total += weights[i];
        }
    }

    if n_missing == 4 {
        return missing;
    }

    if n_missing > 0 {
        if total <= 0.0 {
            // The surviving corners carry no weight (point on the far edge
            // of a partially-missing cell); nothing meaningful to blend.
            return missing;
        }
        let scale = 1.0 / total;
        for w in &mut weights {
            *w *= scale;
        }
    }

    let mut v = 0.0f64;
    for i in 0..4 {
        if values[i] != missing {
            v += values[i] as f64 * weights[i];
        }
    }
    v as f32
}

/// Sample a batch of points in parallel.
///
/// Queries are pure functions of immutable grid state, so the batch is
/// embarrassingly parallel: each output slot is written by exactly one
/// task and no locking is involved.
pub fn sample_points<G>(grid: &G, points: &[Vec<f64>], method: SamplingMethod) -> Vec<f32>
where
    G: Grid + ?Sized,
{
    points
        .par_iter()
        .map(|point| grid.value(point, method))
        .collect()
}
