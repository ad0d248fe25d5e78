//! Coordinate storage for curvilinear and layered unstructured meshes.
//!
//! Horizontal coordinates of a curvilinear mesh are two scalar fields (X and
//! Y) over the same 2D index space. The vertical axis is either a single
//! monotonic sequence of layer elevations shared by every horizontal
//! position ([`VerticalAxis`]), or, for layered unstructured meshes, a
//! per-node column ([`LayeredCoords`]) that is only monotonic along the
//! layer axis for a fixed node.

use nalgebra::Point2;

use crate::error::{GridError, Result};

/// One scalar coordinate component over a 2D index space, row-major with
/// `i` fastest.
#[derive(Debug, Clone)]
pub struct ScalarField2 {
    dims: [usize; 2],
    values: Vec<f64>,
}

impl ScalarField2 {
    /// Wrap a row-major value array.
    pub fn new(dims: [usize; 2], values: Vec<f64>) -> Result<Self> {
        let expected = dims[0] * dims[1];
        if values.len() != expected {
            return Err(GridError::dimension_mismatch(format!(
                "coordinate field has {} values, dimensions {}x{} require {}",
                values.len(),
                dims[0],
                dims[1],
                expected
            )));
        }
        Ok(Self { dims, values })
    }

    /// Index-space dimensions `[nx, ny]`.
    pub fn dims(&self) -> [usize; 2] {
        self.dims
    }

    /// Value at node `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.dims[0] && j < self.dims[1]);
        self.values[j * self.dims[0] + i]
    }

    /// The raw values in canonical (i-fastest) order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Min and max over the index sub-box `[min, max]` (inclusive, clamped).
    pub fn range(&self, min: [usize; 2], max: [usize; 2]) -> (f64, f64) {
        let i1 = max[0].min(self.dims[0] - 1);
        let j1 = max[1].min(self.dims[1] - 1);
        let i0 = min[0].min(i1);
        let j0 = min[1].min(j1);

        let mut lo = self.get(i0, j0);
        let mut hi = lo;
        for j in j0..=j1 {
            for i in i0..=i1 {
                let v = self.get(i, j);
                if v < lo {
                    lo = v;
                }
                if v > hi {
                    hi = v;
                }
            }
        }
        (lo, hi)
    }
}

/// The X and Y coordinate fields of a curvilinear mesh's horizontal plane.
///
/// Immutable once constructed; both fields share one index space.
#[derive(Debug, Clone)]
pub struct HorizontalCoords {
    x: ScalarField2,
    y: ScalarField2,
}

impl HorizontalCoords {
    /// Pair two coordinate fields, validating that their index spaces match.
    pub fn new(x: ScalarField2, y: ScalarField2) -> Result<Self> {
        if x.dims() != y.dims() {
            return Err(GridError::dimension_mismatch(format!(
                "X field is {:?}, Y field is {:?}",
                x.dims(),
                y.dims()
            )));
        }
        Ok(Self { x, y })
    }

    /// Index-space dimensions `[nx, ny]`.
    pub fn dims(&self) -> [usize; 2] {
        self.x.dims()
    }

    /// Number of horizontal nodes.
    pub fn node_count(&self) -> usize {
        let [nx, ny] = self.dims();
        nx * ny
    }

    /// Physical position of node `(i, j)`.
    pub fn point(&self, i: usize, j: usize) -> Point2<f64> {
        Point2::new(self.x.get(i, j), self.y.get(i, j))
    }

    /// The X component field.
    pub fn x(&self) -> &ScalarField2 {
        &self.x
    }

    /// The Y component field.
    pub fn y(&self) -> &ScalarField2 {
        &self.y
    }
}

/// Outcome of locating a value along a monotonic coordinate sequence.
///
/// All three variants occur in normal operation; callers must handle each
/// rather than assume the in-range case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bracket {
    /// Off the front of the sequence (clamp to layer 0).
    Below,
    /// Off the back of the sequence (clamp to the top layer).
    Above,
    /// Between layers `k` and `k + 1`, with linear weights for the pair.
    Inside {
        /// Lower layer of the bracketing pair.
        k: usize,
        /// Weights for layers `k` and `k + 1`; they sum to 1.
        weights: [f64; 2],
    },
}

/// Binary search for the cell of a monotonic sequence containing `x`.
///
/// The sequence may be increasing or decreasing; `Below`/`Above` refer to
/// the front and back of the sequence, not to the smaller or larger value.
/// The bracketing test uses the sign of `(x - lo) * (x - mid)`, which works
/// for either orientation.
pub fn binary_search_range(sorted: &[f64], x: f64) -> Bracket {
    debug_assert!(sorted.len() >= 2);
    let n = sorted.len();
    let ascending = sorted[0] <= sorted[n - 1];

    if ascending {
        if x < sorted[0] {
            return Bracket::Below;
        }
        if x > sorted[n - 1] {
            return Bracket::Above;
        }
    } else {
        if x > sorted[0] {
            return Bracket::Below;
        }
        if x < sorted[n - 1] {
            return Bracket::Above;
        }
    }

    let mut i0 = 0usize;
    let mut i1 = n - 1;
    let mut x0 = sorted[i0];
    while i1 - i0 > 1 {
        let mid = (i0 + i1) >> 1;
        let xm = sorted[mid];
        if xm == x {
            // Landed exactly on a layer boundary.
            i0 = mid;
            break;
        }
        if (x - x0) * (x - xm) <= 0.0 {
            i1 = mid;
        } else {
            i0 = mid;
            x0 = xm;
        }
    }

    let k = i0;
    let w0 = 1.0 - (x - sorted[k]) / (sorted[k + 1] - sorted[k]);
    Bracket::Inside {
        k,
        weights: [w0, 1.0 - w0],
    }
}

/// A strictly monotonic sequence of layer elevations shared by all
/// horizontal positions of a curvilinear grid.
#[derive(Debug, Clone)]
pub struct VerticalAxis {
    levels: Vec<f64>,
}

impl VerticalAxis {
    /// Validate and wrap a layer-elevation sequence.
    ///
    /// At least two layers are required, and consecutive elevations must be
    /// strictly monotonic (either direction).
    pub fn new(levels: Vec<f64>) -> Result<Self> {
        if levels.len() < 2 {
            return Err(GridError::dimension_mismatch(format!(
                "vertical axis needs at least 2 layers, got {}",
                levels.len()
            )));
        }
        let ascending = levels[0] < levels[1];
        for k in 1..levels.len() {
            let step_up = levels[k - 1] < levels[k];
            if levels[k - 1] == levels[k] || step_up != ascending {
                return Err(GridError::NonMonotonic { layer: k });
            }
        }
        Ok(Self { levels })
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the axis has no layers. Always false for a constructed axis.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Elevation of layer `k`.
    pub fn level(&self, k: usize) -> f64 {
        self.levels[k]
    }

    /// All layer elevations in layer order.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Smallest and largest elevation, regardless of orientation.
    pub fn min_max(&self) -> (f64, f64) {
        let first = self.levels[0];
        let last = self.levels[self.levels.len() - 1];
        (first.min(last), first.max(last))
    }

    /// Locate `z` along the axis.
    pub fn locate(&self, z: f64) -> Bracket {
        binary_search_range(&self.levels, z)
    }

    /// Smallest layer index range whose elevations cover `[zmin, zmax]`.
    pub fn enclosing(&self, zmin: f64, zmax: f64) -> (usize, usize) {
        let n = self.levels.len();
        let ascending = self.levels[0] <= self.levels[n - 1];
        let (front, back) = if ascending { (zmin, zmax) } else { (zmax, zmin) };

        let mut kmin = 0;
        for k in 0..n {
            let at_or_before = if ascending {
                self.levels[k] <= front
            } else {
                self.levels[k] >= front
            };
            if at_or_before {
                kmin = k;
            } else {
                break;
            }
        }

        let mut kmax = n - 1;
        for k in (0..n).rev() {
            let at_or_after = if ascending {
                self.levels[k] >= back
            } else {
                self.levels[k] <= back
            };
            if at_or_after {
                kmax = k;
            } else {
                break;
            }
        }

        (kmin, kmax)
    }
}

/// Coordinates of a layered unstructured mesh: per-node X/Y plus a
/// per-(node, layer) Z field, node fastest.
#[derive(Debug, Clone)]
pub struct LayeredCoords {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    n_nodes: usize,
    n_layers: usize,
}

impl LayeredCoords {
    /// Validate and assemble layered coordinates.
    ///
    /// `z` holds `n_layers` planes of `n_nodes` values each, node fastest.
    /// Every node's column must be strictly monotonic along the layer axis,
    /// all in the same direction.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>, n_layers: usize) -> Result<Self> {
        let n_nodes = x.len();
        if y.len() != n_nodes {
            return Err(GridError::dimension_mismatch(format!(
                "X has {} nodes, Y has {}",
                n_nodes,
                y.len()
            )));
        }
        if n_layers < 2 {
            return Err(GridError::dimension_mismatch(format!(
                "layered mesh needs at least 2 layers, got {n_layers}"
            )));
        }
        if z.len() != n_nodes * n_layers {
            return Err(GridError::dimension_mismatch(format!(
                "Z has {} values, {} nodes x {} layers require {}",
                z.len(),
                n_nodes,
                n_layers,
                n_nodes * n_layers
            )));
        }
        if n_nodes == 0 {
            return Err(GridError::dimension_mismatch(
                "layered mesh has no nodes".to_string(),
            ));
        }

        let ascending = z[0] < z[n_nodes];
        for node in 0..n_nodes {
            for k in 1..n_layers {
                let lo = z[(k - 1) * n_nodes + node];
                let hi = z[k * n_nodes + node];
                if lo == hi || (lo < hi) != ascending {
                    return Err(GridError::NonMonotonic { layer: k });
                }
            }
        }

        Ok(Self {
            x,
            y,
            z,
            n_nodes,
            n_layers,
        })
    }

    /// Number of horizontal nodes.
    pub fn node_count(&self) -> usize {
        self.n_nodes
    }

    /// Number of vertical layers.
    pub fn layer_count(&self) -> usize {
        self.n_layers
    }

    /// Horizontal position of a node.
    pub fn point(&self, node: usize) -> Point2<f64> {
        Point2::new(self.x[node], self.y[node])
    }

    /// Per-node X values.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Per-node Y values.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Elevation of `node` at `layer`.
    pub fn z(&self, node: usize, layer: usize) -> f64 {
        debug_assert!(node < self.n_nodes && layer < self.n_layers);
        self.z[layer * self.n_nodes + node]
    }

    /// The raw Z values, node fastest.
    pub fn z_values(&self) -> &[f64] {
        &self.z
    }

    /// Global min and max elevation over all nodes and layers.
    pub fn z_range(&self) -> (f64, f64) {
        let mut lo = self.z[0];
        let mut hi = lo;
        for &v in &self.z {
            if v < lo {
                lo = v;
            }
            if v > hi {
                hi = v;
            }
        }
        (lo, hi)
    }
}
