//! Layered unstructured grids.
//!
//! An unstructured 2D horizontal mesh of quadrilateral faces, extruded
//! through discrete vertical layers. Unlike the curvilinear case the
//! vertical coordinate varies per node, so the vertical column at a query
//! point does not exist until the horizontal weights are known: it is
//! reconstructed per query by blending the four face nodes' columns, then
//! binary-searched like any other monotonic sequence.

use std::sync::Arc;

use nalgebra::Point2;
use spatial_index::NodeIndex;

use crate::coords::{binary_search_range, Bracket, LayeredCoords};
use crate::error::{GridError, Result};
use crate::geometry::wachspress_weights;
use crate::grid::Grid;
use crate::iterator::{CoordIterator, LayeredCoordIter};
use crate::sample::interpolate_quad;
use crate::storage::BlockStorage;
use crate::types::Extents;

/// Result of locating a point: the enclosing face and layer pair plus the
/// interpolation weights. Transient, computed per query.
#[derive(Debug, Clone, Copy)]
struct FaceLocation {
    face: usize,
    nodes: [usize; 4],
    lambda: [f64; 4],
    k: usize,
    zwgt: [f64; 2],
}

/// A layered unstructured grid with samples located at nodes.
///
/// Storage is node-major over `[node_count, layer_count]`. The spatial
/// index over node positions is an externally built shared handle, never
/// mutated by the grid.
#[derive(Debug, Clone)]
pub struct LayeredGrid {
    storage: BlockStorage,
    coords: LayeredCoords,
    faces: Vec<[usize; 4]>,
    /// CSR adjacency: faces incident to each node, in face-id order.
    node_face_offsets: Vec<usize>,
    node_face_ids: Vec<usize>,
    index: Arc<NodeIndex<usize>>,
    extents: Extents,
    periodic: Vec<bool>,
}

impl LayeredGrid {
    /// Assemble a grid from node-major storage, layered coordinates, quad
    /// connectivity, and a prebuilt node index.
    pub fn new(
        storage: BlockStorage,
        coords: LayeredCoords,
        faces: Vec<[usize; 4]>,
        index: Arc<NodeIndex<usize>>,
    ) -> Result<Self> {
        let dims = storage.dims().to_vec();
        if dims.len() != 2 {
            return Err(GridError::dimension_mismatch(
                "layered storage must be 2D (node, layer)",
            ));
        }
        if dims[0] != coords.node_count() || dims[1] != coords.layer_count() {
            return Err(GridError::dimension_mismatch(format!(
                "storage is {}x{}, coordinates describe {} nodes x {} layers",
                dims[0],
                dims[1],
                coords.node_count(),
                coords.layer_count()
            )));
        }
        if faces.is_empty() {
            return Err(GridError::connectivity("mesh has no faces"));
        }
        for (fid, face) in faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&v| v >= coords.node_count()) {
                return Err(GridError::connectivity(format!(
                    "face {fid} references node {bad}, mesh has {}",
                    coords.node_count()
                )));
            }
        }
        if index.len() != coords.node_count() {
            return Err(GridError::dimension_mismatch(format!(
                "index covers {} nodes, mesh has {}",
                index.len(),
                coords.node_count()
            )));
        }

        // Two-pass CSR build keeps each node's face list in face-id order,
        // which fixes the scan order for the tie-break.
        let n_nodes = coords.node_count();
        let mut offsets = vec![0usize; n_nodes + 1];
        for face in &faces {
            for &v in face {
                offsets[v + 1] += 1;
            }
        }
        for i in 1..offsets.len() {
            offsets[i] += offsets[i - 1];
        }
        let mut ids = vec![0usize; offsets[n_nodes]];
        let mut cursor = offsets.clone();
        for (fid, face) in faces.iter().enumerate() {
            for &v in face {
                ids[cursor[v]] = fid;
                cursor[v] += 1;
            }
        }

        let (xlo, xhi) = min_max(coords.x());
        let (ylo, yhi) = min_max(coords.y());
        let (zlo, zhi) = coords.z_range();

        tracing::debug!(
            nodes = n_nodes,
            faces = faces.len(),
            layers = coords.layer_count(),
            "assembled layered unstructured grid"
        );

        Ok(Self {
            storage,
            coords,
            faces,
            node_face_offsets: offsets,
            node_face_ids: ids,
            index,
            extents: Extents::new(vec![xlo, ylo, zlo], vec![xhi, yhi, zhi]),
            periodic: vec![false; 3],
        })
    }

    /// Build a node index over a layered mesh's horizontal positions.
    pub fn build_index(coords: &LayeredCoords) -> Result<NodeIndex<usize>> {
        let points = (0..coords.node_count()).map(|node| (coords.point(node), node));
        tracing::debug!(nodes = coords.node_count(), "building layered node index");
        Ok(NodeIndex::build(points)?)
    }

    /// Mark axes as periodic; queries on periodic axes are clamped to the
    /// extents before any search begins.
    pub fn with_periodic(mut self, periodic: Vec<bool>) -> Self {
        debug_assert_eq!(periodic.len(), 3);
        self.periodic = periodic;
        self
    }

    /// The layered mesh coordinates.
    pub fn layered_coords(&self) -> &LayeredCoords {
        &self.coords
    }

    /// The quad faces of the horizontal mesh.
    pub fn faces(&self) -> &[[usize; 4]] {
        &self.faces
    }

    /// Iterator positioned at the first node of the bottom layer.
    pub fn coord_begin(&self) -> LayeredCoordIter<'_> {
        LayeredCoordIter::begin(&self.coords)
    }

    fn clamp_coord(&self, point: &mut [f64]) {
        for (axis, &flag) in self.periodic.iter().enumerate() {
            if flag && axis < point.len() {
                point[axis] = self.extents.clamp_axis(axis, point[axis]);
            }
        }
    }

    /// Faces incident to `node`.
    fn faces_of(&self, node: usize) -> &[usize] {
        &self.node_face_ids[self.node_face_offsets[node]..self.node_face_offsets[node + 1]]
    }

    /// Locate the face and layer pair containing `(x, y, z)`.
    ///
    /// Seeds from the nearest node and scans the faces sharing it; the
    /// first face whose quad contains the point wins. The vertical column
    /// at the point is then reconstructed from the face nodes' columns
    /// using the horizontal weights.
    fn locate(&self, x: f64, y: f64, z: f64) -> Option<FaceLocation> {
        let p = Point2::new(x, y);
        let (_, seed, _) = self.index.nearest(p)?;

        let mut hit: Option<(usize, [usize; 4], [f64; 4])> = None;
        for &fid in self.faces_of(*seed) {
            let nodes = self.faces[fid];
            let verts = [
                self.coords.point(nodes[0]),
                self.coords.point(nodes[1]),
                self.coords.point(nodes[2]),
                self.coords.point(nodes[3]),
            ];
            if let Some(lambda) = wachspress_weights(&verts, p) {
                hit = Some((fid, nodes, lambda));
                break;
            }
        }
        let (face, nodes, lambda) = hit?;

        let n_layers = self.coords.layer_count();
        let mut column = Vec::with_capacity(n_layers);
        for k in 0..n_layers {
            let mut zk = 0.0;
            for c in 0..4 {
                zk += lambda[c] * self.coords.z(nodes[c], k);
            }
            column.push(zk);
        }

        match binary_search_range(&column, z) {
            Bracket::Inside { k, weights } => Some(FaceLocation {
                face,
                nodes,
                lambda,
                k,
                zwgt: weights,
            }),
            _ => None,
        }
    }

    /// Indices of the node nearest to `point`: the horizontal nearest
    /// neighbor, plus that node's own layer clamped into range.
    pub fn node_indices(&self, point: &[f64]) -> Option<Vec<usize>> {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);

        let (_, seed, _) = self.index.nearest(Point2::new(p[0], p[1]))?;
        let node = *seed;

        let n_layers = self.coords.layer_count();
        let column: Vec<f64> = (0..n_layers).map(|k| self.coords.z(node, k)).collect();
        let k = match binary_search_range(&column, p.get(2).copied().unwrap_or(0.0)) {
            Bracket::Below => 0,
            Bracket::Above => n_layers - 1,
            Bracket::Inside { k, .. } => k,
        };

        Some(vec![node, k])
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let mut lo = values[0];
    let mut hi = lo;
    for &v in values {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }
    (lo, hi)
}

impl Grid for LayeredGrid {
    fn dimensions(&self) -> &[usize] {
        self.storage.dims()
    }

    fn geometry_dim(&self) -> usize {
        3
    }

    fn missing_value(&self) -> f32 {
        self.storage.missing_value()
    }

    fn extents(&self) -> &Extents {
        &self.extents
    }

    fn user_coordinates(&self, indices: &[usize]) -> Vec<f64> {
        let node = indices
            .first()
            .copied()
            .unwrap_or(0)
            .min(self.coords.node_count() - 1);
        let layer = indices
            .get(1)
            .copied()
            .unwrap_or(0)
            .min(self.coords.layer_count() - 1);
        let p = self.coords.point(node);
        vec![p.x, p.y, self.coords.z(node, layer)]
    }

    fn cell_indices(&self, point: &[f64]) -> Option<Vec<usize>> {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);

        let loc = self.locate(p[0], p[1], p.get(2).copied().unwrap_or(0.0))?;
        Some(vec![loc.face, loc.k])
    }

    fn inside(&self, point: &[f64]) -> bool {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);
        self.locate(p[0], p[1], p.get(2).copied().unwrap_or(0.0))
            .is_some()
    }

    fn value_nearest(&self, point: &[f64]) -> f32 {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);

        let Some(loc) = self.locate(p[0], p[1], p.get(2).copied().unwrap_or(0.0)) else {
            return self.missing_value();
        };

        // The nearest node in the plane carries the largest horizontal
        // weight; the nearer of the two layers the larger vertical weight.
        let mut best = 0;
        for c in 1..4 {
            if loc.lambda[c] > loc.lambda[best] {
                best = c;
            }
        }
        let layer = if loc.zwgt[1] > loc.zwgt[0] {
            loc.k + 1
        } else {
            loc.k
        };
        self.storage.get(loc.nodes[best], layer, 0)
    }

    fn value_linear(&self, point: &[f64]) -> f32 {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);

        let mv = self.missing_value();
        let Some(loc) = self.locate(p[0], p[1], p.get(2).copied().unwrap_or(0.0)) else {
            return mv;
        };

        let corners = |layer: usize| -> [f32; 4] {
            [
                self.storage.get(loc.nodes[0], layer, 0),
                self.storage.get(loc.nodes[1], layer, 0),
                self.storage.get(loc.nodes[2], layer, 0),
                self.storage.get(loc.nodes[3], layer, 0),
            ]
        };

        let v0 = interpolate_quad(corners(loc.k), loc.lambda, mv);

        let mut zwgt = loc.zwgt;
        if v0 == mv {
            zwgt[0] = 0.0;
        }
        let v1 = interpolate_quad(corners(loc.k + 1), loc.lambda, mv);
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
