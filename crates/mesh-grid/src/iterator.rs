//! Lazy coordinate traversal over logically multi-axis meshes.
//!
//! Horizontal and vertical coordinates live in independent arrays, so the
//! iterators keep an explicit multi-index plus a linear offset into the
//! horizontal plane, and reposition from the linear offset on random
//! access instead of doing pointer arithmetic across axis boundaries.
//!
//! The end position is a sentinel whose slowest-axis index equals that
//! axis's extent; `position()` equality against an end iterator terminates
//! loops the same way index comparison would.

use crate::coords::{HorizontalCoords, LayeredCoords, VerticalAxis};
use crate::util::{linearize_coords, vectorize_coords};

/// Sequential plus random-access traversal of node coordinates.
///
/// `next()` yields the coordinate at the current position and steps
/// forward; [`advance`](CoordIterator::advance) repositions by a signed
/// element offset and must land on the same coordinate as the equivalent
/// number of sequential steps.
pub trait CoordIterator: Iterator<Item = Vec<f64>> {
    /// Move by `offset` elements (negative moves backward, clamped at the
    /// first element; moving past the last element lands on the end
    /// sentinel).
    fn advance(&mut self, offset: i64);

    /// The current multi-dimensional index.
    fn position(&self) -> &[usize];

    /// Whether the iterator is at the end sentinel.
    fn is_end(&self) -> bool;
}

/// Coordinate iterator for curvilinear grids.
///
/// Horizontal coordinates are re-fetched from the X/Y fields through a
/// shared plane offset; the vertical coordinate is looked up by layer.
#[derive(Debug, Clone)]
pub struct CurvCoordIter<'a> {
    coords: &'a HorizontalCoords,
    vertical: Option<&'a VerticalAxis>,
    dims: Vec<usize>,
    index: Vec<usize>,
    offset2d: usize,
}

impl<'a> CurvCoordIter<'a> {
    /// Iterator positioned at the first node.
    pub fn begin(coords: &'a HorizontalCoords, vertical: Option<&'a VerticalAxis>) -> Self {
        let [nx, ny] = coords.dims();
        let mut dims = vec![nx, ny];
        if let Some(axis) = vertical {
            dims.push(axis.len());
        }
        let index = vec![0; dims.len()];
        Self {
            coords,
            vertical,
            dims,
            index,
            offset2d: 0,
        }
    }

    /// Iterator positioned at the end sentinel.
    pub fn end(coords: &'a HorizontalCoords, vertical: Option<&'a VerticalAxis>) -> Self {
        let mut it = Self::begin(coords, vertical);
        let last = it.dims.len() - 1;
        it.index[last] = it.dims[last];
        it
    }

    fn current(&self) -> Vec<f64> {
        let x = self.coords.x().values()[self.offset2d];
        let y = self.coords.y().values()[self.offset2d];
        match self.vertical {
            Some(axis) => vec![x, y, axis.level(self.index[self.dims.len() - 1])],
            None => vec![x, y],
        }
    }

    fn step(&mut self) {
        self.index[0] += 1;
        self.offset2d += 1;
        if self.index[0] < self.dims[0] {
            return;
        }

        self.index[0] = 0;
        self.index[1] += 1;
        if self.index[1] < self.dims[1] {
            return;
        }
        if self.dims.len() == 2 {
            // index[1] == dims[1] is the end sentinel.
            return;
        }

        self.index[1] = 0;
        self.index[2] += 1;
        self.offset2d = 0;
        // index[2] == dims[2] is the end sentinel.
    }
}

impl Iterator for CurvCoordIter<'_> {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Vec<f64>> {
        if self.is_end() {
            return None;
        }
        let out = self.current();
        self.step();
        Some(out)
    }
}

impl CoordIterator for CurvCoordIter<'_> {
    fn advance(&mut self, offset: i64) {
        let total: usize = self.dims.iter().product();
        let current = if self.is_end() {
            total as i64
        } else {
            linearize_coords(&self.index, &self.dims) as i64
        };

        let target = (current + offset).max(0);
        if target >= total as i64 {
            let last = self.dims.len() - 1;
            self.index = vec![0; self.dims.len()];
            self.index[last] = self.dims[last];
            self.offset2d = 0;
            return;
        }

        self.index = vectorize_coords(target as usize, &self.dims);
        self.offset2d = self.index[1] * self.dims[0] + self.index[0];
    }

    fn position(&self) -> &[usize] {
        &self.index
    }

    fn is_end(&self) -> bool {
        let last = self.dims.len() - 1;
        self.index[last] >= self.dims[last]
    }
}

/// Coordinate iterator for axis-aligned regular grids; coordinates are
/// derived arithmetically from the index.
#[derive(Debug, Clone)]
pub struct RegularCoordIter {
    dims: Vec<usize>,
    origin: Vec<f64>,
    spacing: Vec<f64>,
    index: Vec<usize>,
}

impl RegularCoordIter {
    /// Iterator positioned at the first node.
    pub fn begin(dims: Vec<usize>, origin: Vec<f64>, spacing: Vec<f64>) -> Self {
        let index = vec![0; dims.len()];
        Self {
            dims,
            origin,
            spacing,
            index,
        }
    }

    fn current(&self) -> Vec<f64> {
        self.index
            .iter()
            .enumerate()
            .map(|(axis, &i)| self.origin[axis] + i as f64 * self.spacing[axis])
            .collect()
    }

    fn step(&mut self) {
        for axis in 0..self.dims.len() {
            self.index[axis] += 1;
            if self.index[axis] < self.dims[axis] || axis == self.dims.len() - 1 {
                return;
            }
            self.index[axis] = 0;
        }
    }
}

impl Iterator for RegularCoordIter {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Vec<f64>> {
        if self.is_end() {
            return None;
        }
        let out = self.current();
        self.step();
        Some(out)
    }
}

impl CoordIterator for RegularCoordIter {
    fn advance(&mut self, offset: i64) {
        let total: usize = self.dims.iter().product();
        let current = if self.is_end() {
            total as i64
        } else {
            linearize_coords(&self.index, &self.dims) as i64
        };

        let target = (current + offset).max(0);
        if target >= total as i64 {
            let last = self.dims.len() - 1;
            self.index = vec![0; self.dims.len()];
            self.index[last] = self.dims[last];
            return;
        }
        self.index = vectorize_coords(target as usize, &self.dims);
    }

    fn position(&self) -> &[usize] {
        &self.index
    }

    fn is_end(&self) -> bool {
        let last = self.dims.len() - 1;
        self.index[last] >= self.dims[last]
    }
}

/// Coordinate iterator for layered unstructured grids.
///
/// The 2D node position wraps modulo the node count while the flat Z
/// field advances linearly; advancing is forward-only, as the layered
/// traversal has no meaningful backward motion.
#[derive(Debug, Clone)]
pub struct LayeredCoordIter<'a> {
    coords: &'a LayeredCoords,
    /// `[node, layer]`; `layer == layer_count` is the end sentinel.
    index: Vec<usize>,
}

impl<'a> LayeredCoordIter<'a> {
    /// Iterator positioned at the first node of the bottom layer.
    pub fn begin(coords: &'a LayeredCoords) -> Self {
        Self {
            coords,
            index: vec![0, 0],
        }
    }

    fn current(&self) -> Vec<f64> {
        let node = self.index[0];
        let layer = self.index[1];
        let p = self.coords.point(node);
        vec![p.x, p.y, self.coords.z(node, layer)]
    }

    fn step(&mut self) {
        self.index[0] += 1;
        if self.index[0] == self.coords.node_count() {
            self.index[0] = 0;
            self.index[1] += 1;
        }
    }
}

impl Iterator for LayeredCoordIter<'_> {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Vec<f64>> {
        if self.is_end() {
            return None;
        }
        let out = self.current();
        self.step();
        Some(out)
    }
}

impl CoordIterator for LayeredCoordIter<'_> {
    fn advance(&mut self, offset: i64) {
        debug_assert!(offset >= 0, "layered traversal is forward-only");
        let offset = offset.max(0) as usize;

        let n = self.coords.node_count();
        let total = n * self.coords.layer_count();
        let linear = self.index[1] * n + self.index[0] + offset;
        if linear >= total {
            self.index = vec![0, self.coords.layer_count()];
            return;
        }
        self.index = vec![linear % n, linear / n];
    }

    fn position(&self) -> &[usize] {
        &self.index
    }

    fn is_end(&self) -> bool {
        self.index[1] >= self.coords.layer_count()
    }
}
