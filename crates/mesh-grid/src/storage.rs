//! Block-decomposed field storage.
//!
//! Sample values arrive from the loading collaborators as a set of
//! fixed-size blocks covering the grid's index space, with the grid
//! dimensions not necessarily a multiple of the block size (edge blocks are
//! padded). [`BlockStorage`] owns shared read-only handles to those blocks
//! and maps an `(i, j, k)` node index through the block decomposition.

use std::sync::Arc;

use crate::error::{GridError, Result};

/// Field values stored as fixed-size blocks, with a missing-value sentinel.
///
/// Immutable after construction; all access is by-value reads.
#[derive(Debug, Clone)]
pub struct BlockStorage {
    dims: Vec<usize>,
    block_dims: Vec<usize>,
    blocks_per_axis: [usize; 3],
    blocks: Vec<Arc<[f32]>>,
    missing_value: f32,
}

impl BlockStorage {
    /// Assemble storage from a block decomposition.
    ///
    /// `dims` and `block_dims` must have matching length (2 or 3), and
    /// `blocks` must hold exactly one block of `block_dims` elements per
    /// block-grid position, in x-fastest order.
    pub fn new(
        dims: Vec<usize>,
        block_dims: Vec<usize>,
        blocks: Vec<Arc<[f32]>>,
        missing_value: f32,
    ) -> Result<Self> {
        if dims.len() < 2 || dims.len() > 3 {
            return Err(GridError::dimension_mismatch(format!(
                "grid must be 2D or 3D, got {} axes",
                dims.len()
            )));
        }
        if block_dims.len() != dims.len() {
            return Err(GridError::dimension_mismatch(format!(
                "block size has {} axes, grid has {}",
                block_dims.len(),
                dims.len()
            )));
        }
        if dims.iter().any(|&d| d == 0) || block_dims.iter().any(|&b| b == 0) {
            return Err(GridError::block_decomposition(
                "dimensions and block sizes must be non-zero",
            ));
        }

        let mut blocks_per_axis = [1usize; 3];
        for axis in 0..dims.len() {
            blocks_per_axis[axis] = (dims[axis] + block_dims[axis] - 1) / block_dims[axis];
        }

        let expected_blocks: usize = blocks_per_axis.iter().product();
        if blocks.len() != expected_blocks {
            return Err(GridError::block_decomposition(format!(
                "expected {} blocks, got {}",
                expected_blocks,
                blocks.len()
            )));
        }

        let block_len: usize = block_dims.iter().product();
        if let Some(bad) = blocks.iter().position(|b| b.len() != block_len) {
            return Err(GridError::block_decomposition(format!(
                "block {} has {} elements, expected {}",
                bad,
                blocks[bad].len(),
                block_len
            )));
        }

        Ok(Self {
            dims,
            block_dims,
            blocks_per_axis,
            blocks,
            missing_value,
        })
    }

    /// Wrap a single contiguous array as one full-extent block.
    pub fn contiguous(dims: Vec<usize>, data: Vec<f32>, missing_value: f32) -> Result<Self> {
        let expected: usize = dims.iter().product();
        if data.len() != expected {
            return Err(GridError::block_decomposition(format!(
                "contiguous data has {} elements, dimensions require {}",
                data.len(),
                expected
            )));
        }
        let block_dims = dims.clone();
        Self::new(dims, block_dims, vec![Arc::from(data)], missing_value)
    }

    /// Per-axis grid dimensions.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// The sentinel marking absent data.
    pub fn missing_value(&self) -> f32 {
        self.missing_value
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    /// Whether the storage holds no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the sample at node `(i, j, k)`. `k` is ignored for 2D storage.
    pub fn get(&self, i: usize, j: usize, k: usize) -> f32 {
        debug_assert!(i < self.dims[0]);
        debug_assert!(j < self.dims[1]);
        debug_assert!(self.dims.len() < 3 || k < self.dims[2]);

        let (bx, by, bz) = (
            self.block_dims[0],
            self.block_dims[1],
            if self.block_dims.len() > 2 {
                self.block_dims[2]
            } else {
                1
            },
        );

        let block = (k / bz * self.blocks_per_axis[1] + j / by) * self.blocks_per_axis[0] + i / bx;
        let offset = (k % bz * by + j % by) * bx + i % bx;

        self.blocks[block][offset]
    }
}
