//! Axis-aligned, uniformly spaced grids.

use crate::error::{GridError, Result};
use crate::grid::Grid;
use crate::iterator::{CoordIterator, RegularCoordIter};
use crate::sample::interpolate_quad;
use crate::storage::BlockStorage;
use crate::types::Extents;

/// The degenerate mesh variant: axis-aligned with uniform spacing, so cell
/// location is direct arithmetic and no spatial index is involved.
#[derive(Debug, Clone)]
pub struct RegularGrid {
    storage: BlockStorage,
    extents: Extents,
    spacing: Vec<f64>,
    periodic: Vec<bool>,
}

impl RegularGrid {
    /// Create a regular grid spanning `[min, max]` on each axis.
    pub fn new(storage: BlockStorage, min: Vec<f64>, max: Vec<f64>) -> Result<Self> {
        let dims = storage.dims().to_vec();
        if min.len() != dims.len() || max.len() != dims.len() {
            return Err(GridError::dimension_mismatch(format!(
                "extents have {}/{} axes, grid has {}",
                min.len(),
                max.len(),
                dims.len()
            )));
        }
        if dims.iter().any(|&d| d < 2) {
            return Err(GridError::dimension_mismatch(
                "regular grid needs at least 2 nodes per axis",
            ));
        }
        for axis in 0..dims.len() {
            if max[axis] <= min[axis] {
                return Err(GridError::dimension_mismatch(format!(
                    "axis {} extent [{}, {}] is empty",
                    axis, min[axis], max[axis]
                )));
            }
        }

        let spacing = dims
            .iter()
            .enumerate()
            .map(|(axis, &d)| (max[axis] - min[axis]) / (d - 1) as f64)
            .collect();

        let periodic = vec![false; dims.len()];
        Ok(Self {
            storage,
            extents: Extents::new(min, max),
            spacing,
            periodic,
        })
    }

    /// Mark axes as periodic; queries on periodic axes are clamped to the
    /// extents before location.
    pub fn with_periodic(mut self, periodic: Vec<bool>) -> Self {
        debug_assert_eq!(periodic.len(), self.storage.dims().len());
        self.periodic = periodic;
        self
    }

    /// Node spacing per axis.
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    fn clamp_coord(&self, point: &mut [f64]) {
        for (axis, &flag) in self.periodic.iter().enumerate() {
            if flag && axis < point.len() {
                point[axis] = self.extents.clamp_axis(axis, point[axis]);
            }
        }
    }

    /// Cell origin and in-cell fraction per axis, or `None` outside.
    fn locate(&self, point: &[f64]) -> Option<(Vec<usize>, Vec<f64>)> {
        let dims = self.storage.dims();
        let mut cell = Vec::with_capacity(dims.len());
        let mut frac = Vec::with_capacity(dims.len());
        for axis in 0..dims.len() {
            let v = point.get(axis).copied().unwrap_or(self.extents.min[axis]);
            if v < self.extents.min[axis] || v > self.extents.max[axis] {
                return None;
            }
            let t = (v - self.extents.min[axis]) / self.spacing[axis];
            let i = (t.floor() as usize).min(dims[axis] - 2);
            cell.push(i);
            frac.push(t - i as f64);
        }
        Some((cell, frac))
    }
}

impl Grid for RegularGrid {
    fn dimensions(&self) -> &[usize] {
        self.storage.dims()
    }

    fn geometry_dim(&self) -> usize {
        self.storage.dims().len()
    }

    fn missing_value(&self) -> f32 {
        self.storage.missing_value()
    }

    fn extents(&self) -> &Extents {
        &self.extents
    }

    fn user_coordinates(&self, indices: &[usize]) -> Vec<f64> {
        let dims = self.storage.dims();
        debug_assert_eq!(indices.len(), dims.len());
        (0..dims.len())
            .map(|axis| {
                let i = indices.get(axis).copied().unwrap_or(0).min(dims[axis] - 1);
                self.extents.min[axis] + i as f64 * self.spacing[axis]
            })
            .collect()
    }

    fn cell_indices(&self, point: &[f64]) -> Option<Vec<usize>> {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);
        self.locate(&p).map(|(cell, _)| cell)
    }

    fn inside(&self, point: &[f64]) -> bool {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);
        self.locate(&p).is_some()
    }

    fn value_nearest(&self, point: &[f64]) -> f32 {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);
        let Some((cell, frac)) = self.locate(&p) else {
            return self.missing_value();
        };
        let pick =
            |axis: usize| -> usize { cell[axis] + usize::from(frac[axis] > 0.5) };
        let i = pick(0);
        let j = pick(1);
        let k = if cell.len() > 2 { pick(2) } else { 0 };
        self.storage.get(i, j, k)
    }

    fn value_linear(&self, point: &[f64]) -> f32 {
        let mut p = point.to_vec();
        self.clamp_coord(&mut p);
        let mv = self.missing_value();
        let Some((cell, frac)) = self.locate(&p) else {
            return mv;
        };

        let (i, j) = (cell[0], cell[1]);
        let (u, v) = (frac[0], frac[1]);
        let lambda = [
            (1.0 - u) * (1.0 - v),
            u * (1.0 - v),
            u * v,
            (1.0 - u) * v,
        ];

        let k = if cell.len() > 2 { cell[2] } else { 0 };
        let corners =
            |layer: usize| -> [f32; 4] {
                [
                    self.storage.get(i, j, layer),
                    self.storage.get(i + 1, j, layer),
                    self.storage.get(i + 1, j + 1, layer),
                    self.storage.get(i, j + 1, layer),
                ]
            };

        let v0 = interpolate_quad(corners(k), lambda, mv);
        if cell.len() == 2 {
            return v0;
        }

        let mut zwgt = [1.0 - frac[2], frac[2]];
        if v0 == mv {
            zwgt[0] = 0.0;
        }
        let v1 = interpolate_quad(corners(k + 1), lambda, mv);
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
        Box::new(RegularCoordIter::begin(
            self.storage.dims().to_vec(),
            self.extents.min.clone(),
            self.spacing.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MV: f32 = 1.0e37;

    fn grid_2d() -> RegularGrid {
        // 3x3 grid over [0,2]^2, value = i*1000 + j
        let mut data = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                data.push((i * 1000 + j) as f32);
            }
        }
        let storage = BlockStorage::contiguous(vec![3, 3], data, MV).unwrap();
        RegularGrid::new(storage, vec![0.0, 0.0], vec![2.0, 2.0]).unwrap()
    }

    #[test]
    fn test_cell_location() {
        let grid = grid_2d();
        assert_eq!(grid.cell_indices(&[0.5, 1.5]), Some(vec![0, 1]));
        assert_eq!(grid.cell_indices(&[2.0, 2.0]), Some(vec![1, 1]));
        assert_eq!(grid.cell_indices(&[2.5, 0.5]), None);
        assert!(grid.inside(&[1.0, 1.0]));
        assert!(!grid.inside(&[-0.1, 1.0]));
    }

    #[test]
    fn test_value_sampling() {
        let grid = grid_2d();
        assert_eq!(grid.value_nearest(&[0.1, 0.1]), 0.0);
        assert_eq!(grid.value_nearest(&[0.9, 0.1]), 1000.0);
        assert_eq!(grid.value_nearest(&[5.0, 5.0]), MV);

        // Exactly between nodes (0,0) and (1,0): average of 0 and 1000.
        let v = grid.value_linear(&[0.5, 0.0]);
        assert!((v - 500.0).abs() < 1e-3);
        assert_eq!(grid.value_linear(&[5.0, 5.0]), MV);
    }

    #[test]
    fn test_user_coordinates() {
        let grid = grid_2d();
        assert_eq!(grid.user_coordinates(&[1, 2]), vec![1.0, 2.0]);
        // Clamped.
        assert_eq!(grid.user_coordinates(&[9, 9]), vec![2.0, 2.0]);
    }

    #[test]
    fn test_periodic_clamp() {
        let grid = grid_2d().with_periodic(vec![true, false]);
        // X is clamped onto the boundary; Y is not.
        assert!(grid.inside(&[2.5, 1.0]));
        assert!(!grid.inside(&[1.0, 2.5]));
    }

    #[test]
    fn test_trilinear() {
        let mut data = Vec::new();
        for k in 0..2 {
            for _j in 0..2 {
                for _i in 0..2 {
                    data.push((k * 10) as f32);
                }
            }
        }
        let storage = BlockStorage::contiguous(vec![2, 2, 2], data, MV).unwrap();
        let grid = RegularGrid::new(storage, vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]).unwrap();

        let v = grid.value_linear(&[0.5, 0.5, 0.5]);
        assert!((v - 5.0).abs() < 1e-5);
        let v = grid.value_linear(&[0.5, 0.5, 0.25]);
        assert!((v - 2.5).abs() < 1e-5);
    }
}
