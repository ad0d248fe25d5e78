//! Curvilinear (logically structured, non-rectilinear) grids.
//!
//! The horizontal plane is a smooth but non-uniform mesh described by X/Y
//! coordinate fields; the optional vertical axis is a shared monotonic
//! layer sequence. Point location seeds from the nearest mesh node (via
//! the spatial index) and tests the small neighborhood of cells touching
//! that node — a local search that relies on the nearest node being
//! adjacent to the containing cell, which grid regularity guarantees.

use std::sync::Arc;

use nalgebra::Point2;
use spatial_index::NodeIndex;

use crate::coords::{Bracket, HorizontalCoords, VerticalAxis};
use crate::error::{GridError, Result};
use crate::geometry::wachspress_weights;
use crate::grid::Grid;
use crate::iterator::{CoordIterator, CurvCoordIter};
use crate::sample::interpolate_quad;
use crate::storage::BlockStorage;
use crate::types::Extents;

/// Result of locating a point within the grid: the enclosing cell plus
/// the interpolation weights for its corners and layer pair. Transient,
/// computed per query.
#[derive(Debug, Clone, Copy)]
struct CellLocation {
    cell: [usize; 3],
    lambda: [f64; 4],
    zwgt: [f64; 2],
}

/// A curvilinear grid with per-node horizontal coordinates and a shared
/// vertical layer axis.
///
/// The spatial index is an externally built, shared read-only handle; the
/// grid never mutates or rebuilds it. Construction fully completes before
/// any query runs, after which all state is frozen.
#[derive(Debug, Clone)]
pub struct CurvilinearGrid {
    storage: BlockStorage,
    coords: HorizontalCoords,
    vertical: Option<VerticalAxis>,
    index: Arc<NodeIndex<[usize; 2]>>,
    extents: Extents,
    periodic: Vec<bool>,
    monotonic_scan: bool,
}

impl CurvilinearGrid {
    /// Assemble a grid from storage, coordinate fields, and a prebuilt
    /// node index.
    ///
    /// `vertical` must be present exactly when the storage is 3D, with one
    /// level per vertical layer. The coordinate fields must cover the
    /// horizontal index space of the storage, and the index must have been
    /// built over the same node set (see [`CurvilinearGrid::build_index`]).
    pub fn new(
        storage: BlockStorage,
        coords: HorizontalCoords,
        vertical: Option<VerticalAxis>,
        index: Arc<NodeIndex<[usize; 2]>>,
    ) -> Result<Self> {
        let dims = storage.dims().to_vec();
        let [nx, ny] = coords.dims();

        if nx != dims[0] || ny != dims[1] {
            return Err(GridError::dimension_mismatch(format!(
                "coordinate fields are {nx}x{ny}, storage is {}x{}",
                dims[0], dims[1]
            )));
        }
        if nx < 2 || ny < 2 {
            return Err(GridError::dimension_mismatch(
                "curvilinear grid needs at least 2 nodes per horizontal axis",
            ));
        }
        match (&vertical, dims.len()) {
            (None, 2) => {}
            (Some(axis), 3) => {
                if axis.len() != dims[2] {
                    return Err(GridError::dimension_mismatch(format!(
                        "vertical axis has {} layers, storage has {}",
                        axis.len(),
                        dims[2]
                    )));
                }
            }
            (Some(_), _) => {
                return Err(GridError::dimension_mismatch(
                    "vertical axis supplied for 2D storage",
                ));
            }
            (None, _) => {
                return Err(GridError::dimension_mismatch(
                    "3D storage requires a vertical axis",
                ));
            }
        }
        if index.len() != coords.node_count() {
            return Err(GridError::dimension_mismatch(format!(
                "index covers {} nodes, mesh has {}",
                index.len(),
                coords.node_count()
            )));
        }

        let (xlo, xhi) = coords.x().range([0, 0], [nx - 1, ny - 1]);
        let (ylo, yhi) = coords.y().range([0, 0], [nx - 1, ny - 1]);
        let mut min = vec![xlo, ylo];
        let mut max = vec![xhi, yhi];
        if let Some(axis) = &vertical {
            let (zlo, zhi) = axis.min_max();
            min.push(zlo);
            max.push(zhi);
        }

        let monotonic_scan = detect_monotonic(&coords);
        if !monotonic_scan {
            tracing::warn!(
                "horizontal coordinates are not monotonic along the grid axes; \
                 enclosing_region will fall back to the full grid box"
            );
        }
        tracing::debug!(
            nx,
            ny,
            nz = vertical.as_ref().map(|v| v.len()).unwrap_or(1),
            "assembled curvilinear grid"
        );

        let periodic = vec![false; dims.len()];
        Ok(Self {
            storage,
            coords,
            vertical,
            index,
            extents: Extents::new(min, max),
            periodic,
            monotonic_scan,
        })
    }

    /// Build a node index over a mesh's horizontal coordinates.
    ///
    /// Callers typically wrap the result in an [`Arc`] and share it between
    /// the grid and any sibling grids defined over the same mesh.
    pub fn build_index(coords: &HorizontalCoords) -> Result<NodeIndex<[usize; 2]>> {
        let [nx, ny] = coords.dims();
        let mut points = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                points.push((coords.point(i, j), [i, j]));
            }
        }
        tracing::debug!(nodes = points.len(), "building curvilinear node index");
        Ok(NodeIndex::build(points)?)
    }

    /// Mark axes as periodic; queries on periodic axes are clamped to the
    /// extents before any search begins.
    pub fn with_periodic(mut self, periodic: Vec<bool>) -> Self {
        debug_assert_eq!(periodic.len(), self.storage.dims().len());
        self.periodic = periodic;
        self
    }

    /// The horizontal coordinate fields.
    pub fn horizontal_coords(&self) -> &HorizontalCoords {
        &self.coords
    }

    /// The vertical layer axis, if the grid is 3D.
    pub fn vertical_axis(&self) -> Option<&VerticalAxis> {
        self.vertical.as_ref()
    }

    /// Iterator positioned at the first node.
    pub fn coord_begin(&self) -> CurvCoordIter<'_> {
        CurvCoordIter::begin(&self.coords, self.vertical.as_ref())
    }

    /// Iterator positioned at the end sentinel.
    pub fn coord_end(&self) -> CurvCoordIter<'_> {
        CurvCoordIter::end(&self.coords, self.vertical.as_ref())
    }

    fn clamp_coord(&self, point: &mut [f64]) {
        for (axis, &flag) in self.periodic.iter().enumerate() {
            if flag && axis < point.len() {
                point[axis] = self.extents.clamp_axis(axis, point[axis]);
            }
        }
    }

    /// Locate the cell containing `(x, y, z)` and compute its weights.
    ///
    /// Seeds from the nearest node, then walks the up-to-four cells
    /// sharing that node, clamped so the neighborhood never indexes
    /// outside the cell range. The first cell whose quad contains the
    /// point wins; this is the documented tie-break for points on shared
    /// edges and vertices. The scan runs from the cell anchored at the
    /// seed node outward, so a query exactly on a node resolves to the
    /// cell whose origin is that node.
    fn locate(&self, x: f64, y: f64, z: f64) -> Option<CellLocation> {
        let p = Point2::new(x, y);
        let (_, seed, _) = self.index.nearest(p)?;
        let [si, sj] = *seed;

        let [nx, ny] = self.coords.dims();
        let i0 = si.saturating_sub(1);
        let i1 = if si < nx - 1 { si } else { nx - 2 };
        let j0 = sj.saturating_sub(1);
        let j1 = if sj < ny - 1 { sj } else { ny - 2 };

        let mut hit: Option<([usize; 2], [f64; 4])> = None;
        'scan: for jj in (j0..=j1).rev() {
            for ii in (i0..=i1).rev() {
                let verts = [
                    self.coords.point(ii, jj),
                    self.coords.point(ii + 1, jj),
                    self.coords.point(ii + 1, jj + 1),
                    self.coords.point(ii, jj + 1),
                ];
                if let Some(lambda) = wachspress_weights(&verts, p) {
                    hit = Some(([ii, jj], lambda));
                    break 'scan;
                }
            }
        }
        let ([i, j], lambda) = hit?;

        let Some(axis) = &self.vertical else {
            return Some(CellLocation {
                cell: [i, j, 0],
                lambda,
                zwgt: [1.0, 0.0],
            });
        };

        match axis.locate(z) {
            Bracket::Inside { k, weights } => Some(CellLocation {
                cell: [i, j, k],
                lambda,
                zwgt: weights,
            }),
            _ => None,
        }
    }

    fn vertical_component(&self, point: &[f64]) -> f64 {
        if self.geometry_dim() == 3 {
            point.get(2).copied().unwrap_or(0.0)
        } else {
            0.0
        }
    }

    /// Indices of the node nearest to `point`: the horizontal nearest
    /// neighbor, plus the vertical layer clamped into range.
    pub fn node_indices(&self, point: &[f64]) -> Option<Vec<usize>> {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);

        let (_, seed, _) = self.index.nearest(Point2::new(p[0], p[1]))?;
        let mut indices = seed.to_vec();

        if let Some(axis) = &self.vertical {
            let k = match axis.locate(self.vertical_component(&p)) {
                Bracket::Below => 0,
                Bracket::Above => axis.len() - 1,
                Bracket::Inside { k, .. } => k,
            };
            indices.push(k);
        }
        Some(indices)
    }

    /// Physical bounding box of the index sub-box `[min, max]` (inclusive,
    /// clamped). Horizontal bounds visit every node of one plane, since
    /// the horizontal coordinates are constant over Z.
    pub fn bounding_box(&self, min: &[usize], max: &[usize]) -> (Vec<f64>, Vec<f64>) {
        let [nx, ny] = self.coords.dims();
        let clamp2 = |idx: &[usize]| -> [usize; 2] {
            [
                idx.first().copied().unwrap_or(0).min(nx - 1),
                idx.get(1).copied().unwrap_or(0).min(ny - 1),
            ]
        };
        let lo2 = clamp2(min);
        let hi2 = clamp2(max);

        let (xlo, xhi) = self.coords.x().range(lo2, hi2);
        let (ylo, yhi) = self.coords.y().range(lo2, hi2);
        let mut minu = vec![xlo, ylo];
        let mut maxu = vec![xhi, yhi];

        if let Some(axis) = &self.vertical {
            let klo = min.get(2).copied().unwrap_or(0).min(axis.len() - 1);
            let khi = max.get(2).copied().unwrap_or(0).min(axis.len() - 1);
            let (z0, z1) = (axis.level(klo), axis.level(khi));
            minu.push(z0.min(z1));
            maxu.push(z0.max(z1));
        }

        (minu, maxu)
    }

    /// Smallest index box covering the physical box `[minu, maxu]`.
    ///
    /// The boundary-shrinking scans assume the horizontal coordinates are
    /// monotonic along their own grid axis (x along i, y along j), which
    /// rotated or folded curvilinear meshes violate. When construction
    /// detected a non-monotonic mesh, the scans are skipped and the full
    /// grid box is returned instead.
    pub fn enclosing_region(&self, minu: &[f64], maxu: &[f64]) -> (Vec<usize>, Vec<usize>) {
        let mut lo = minu.to_vec();
        let mut hi = maxu.to_vec();
        self.clamp_coord(&mut lo);
        self.clamp_coord(&mut hi);

        let dims = self.storage.dims();
        let mut min: Vec<usize> = vec![0; dims.len()];
        let mut max: Vec<usize> = dims.iter().map(|&d| d - 1).collect();

        if self.monotonic_scan {
            let [nx, ny] = self.coords.dims();
            let x = self.coords.x();
            let y = self.coords.y();

            // Shrink from the bottom: skip rows lying entirely below the
            // box, then mirror from the top.
            for j in 0..ny {
                if (0..nx).all(|i| y.get(i, j) < lo[1]) {
                    min[1] = j;
                } else {
                    break;
                }
            }
            for j in (0..ny).rev() {
                if (0..nx).all(|i| y.get(i, j) > hi[1]) {
                    max[1] = j;
                } else {
                    break;
                }
            }

            // Columns, restricted to the surviving rows.
            for i in 0..nx {
                if (min[1]..=max[1]).all(|j| x.get(i, j) < lo[0]) {
                    min[0] = i;
                } else {
                    break;
                }
            }
            for i in (0..nx).rev() {
                if (min[1]..=max[1]).all(|j| x.get(i, j) > hi[0]) {
                    max[0] = i;
                } else {
                    break;
                }
            }
        }

        if let Some(axis) = &self.vertical {
            let zlo = lo.get(2).copied().unwrap_or(f64::NEG_INFINITY);
            let zhi = hi.get(2).copied().unwrap_or(f64::INFINITY);
            let (kmin, kmax) = axis.enclosing(zlo, zhi);
            min[2] = kmin;
            max[2] = kmax;
        }

        (min, max)
    }

    /// Smallest node spacing along each axis, measured between consecutive
    /// nodes in index order.
    pub fn min_cell_extents(&self) -> Vec<f64> {
        let [nx, ny] = self.coords.dims();
        let x = self.coords.x();
        let y = self.coords.y();

        let mut minx = x.get(1, 0) - x.get(0, 0);
        for j in 0..ny {
            for i in 1..nx {
                let dx = x.get(i, j) - x.get(i - 1, j);
                if dx < minx {
                    minx = dx;
                }
            }
        }

        let mut miny = y.get(0, 1) - y.get(0, 0);
        for i in 0..nx {
            for j in 1..ny {
                let dy = y.get(i, j) - y.get(i, j - 1);
                if dy < miny {
                    miny = dy;
                }
            }
        }

        let mut out = vec![minx, miny];
        if let Some(axis) = &self.vertical {
            let levels = axis.levels();
            let mut minz = levels[1] - levels[0];
            for k in 2..levels.len() {
                let dz = levels[k] - levels[k - 1];
                if dz < minz {
                    minz = dz;
                }
            }
            out.push(minz);
        }
        out
    }
}

/// Whether x grows along i and y grows along j everywhere — the property
/// the `enclosing_region` scans rely on.
fn detect_monotonic(coords: &HorizontalCoords) -> bool {
    let [nx, ny] = coords.dims();
    let x = coords.x();
    let y = coords.y();
    for j in 0..ny {
        for i in 1..nx {
            if x.get(i, j) < x.get(i - 1, j) {
                return false;
            }
        }
    }
    for i in 0..nx {
        for j in 1..ny {
            if y.get(i, j) < y.get(i, j - 1) {
                return false;
            }
        }
    }
    true
}

impl Grid for CurvilinearGrid {
    fn dimensions(&self) -> &[usize] {
        self.storage.dims()
    }

    fn geometry_dim(&self) -> usize {
        if self.vertical.is_some() {
            3
        } else {
            2
        }
    }

    fn missing_value(&self) -> f32 {
        self.storage.missing_value()
    }

    fn extents(&self) -> &Extents {
        &self.extents
    }

    fn user_coordinates(&self, indices: &[usize]) -> Vec<f64> {
        let [nx, ny] = self.coords.dims();
        let i = indices.first().copied().unwrap_or(0).min(nx - 1);
        let j = indices.get(1).copied().unwrap_or(0).min(ny - 1);

        let mut out = vec![self.coords.x().get(i, j), self.coords.y().get(i, j)];
        if let Some(axis) = &self.vertical {
            let k = indices.get(2).copied().unwrap_or(0).min(axis.len() - 1);
            out.push(axis.level(k));
        }
        out
    }

    fn cell_indices(&self, point: &[f64]) -> Option<Vec<usize>> {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);

        let loc = self.locate(p[0], p[1], self.vertical_component(&p))?;
        let mut indices = vec![loc.cell[0], loc.cell[1]];
        if self.geometry_dim() == 3 {
            indices.push(loc.cell[2]);
        }
        Some(indices)
    }

    fn inside(&self, point: &[f64]) -> bool {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);

        // Cheap rejection against the cached extents before any search.
        if !self.extents.contains(&p) {
            return false;
        }

        self.locate(p[0], p[1], self.vertical_component(&p)).is_some()
    }

    fn value_nearest(&self, point: &[f64]) -> f32 {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);

        let Some(loc) = self.locate(p[0], p[1], self.vertical_component(&p)) else {
            return self.missing_value();
        };

        // The nearest corner carries the largest horizontal weight; the
        // nearer layer the larger vertical weight.
        let [i, j, k] = loc.cell;
        let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
        let mut best = 0;
        for c in 1..4 {
            if loc.lambda[c] > loc.lambda[best] {
                best = c;
            }
        }
        let (ci, cj) = corners[best];
        let ck = if loc.zwgt[1] > loc.zwgt[0] { k + 1 } else { k };
        self.storage.get(ci, cj, ck)
    }

    fn value_linear(&self, point: &[f64]) -> f32 {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);

        let mv = self.missing_value();
        let Some(loc) = self.locate(p[0], p[1], self.vertical_component(&p)) else {
            return mv;
        };

        let [i, j, k] = loc.cell;
        let corners = |layer: usize| -> [f32; 4] {
            [
                self.storage.get(i, j, layer),
                self.storage.get(i + 1, j, layer),
                self.storage.get(i + 1, j + 1, layer),
                self.storage.get(i, j + 1, layer),
            ]
        };

        let v0 = interpolate_quad(corners(k), loc.lambda, mv);
        if self.geometry_dim() == 2 {
            return v0;
        }

        // A layer whose blended value came out missing loses its vertical
        // weight, so the other layer is used in full.
        let mut zwgt = loc.zwgt;
        if v0 == mv {
            zwgt[0] = 0.0;
        }
        let v1 = interpolate_quad(corners(k + 1), loc.lambda, mv);
        if v1 == mv {
            zwgt[1] = 0.0;
        }

        if zwgt[0] == 0.0 {
            v1
        } else if zwgt[1] == 0.0 {
            v0
        } else {
            (v0 as f64 * zwgt[0] + v1 as f64 * zwgt[1]) as f32
        }
    }

    fn coord_iter(&self) -> Box<dyn CoordIterator + '_> {
        Box::new(self.coord_begin())
    }
}
