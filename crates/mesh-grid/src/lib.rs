//! Point location and value sampling on non-rectilinear meshes.
//!
//! This crate answers two questions about scalar fields defined over
//! curvilinear and layered unstructured simulation meshes:
//!
//! - **Which cell contains this physical point?** Cell location seeds from
//!   a k-d tree nearest-node query, then geometrically tests the small
//!   neighborhood of cells around that node with generalized barycentric
//!   (Wachspress) coordinates, and binary-searches the monotonic vertical
//!   axis for the layer pair.
//! - **What is the field value here?** Nearest-neighbor or weighted-linear
//!   sampling over the located cell, with missing-value-aware weight
//!   renormalization.
//!
//! # Architecture
//!
//! ```text
//! physical point
//!      │
//!      ▼
//! Grid::cell_indices / value_*
//!      │
//!      ├─► NodeIndex::nearest            (seed node)
//!      │
//!      ├─► wachspress_weights            (point-in-quad + weights)
//!      │
//!      ├─► binary_search_range           (vertical layer pair)
//!      │
//!      └─► interpolate_quad              (missing-aware blend)
//! ```
//!
//! Grids are immutable once constructed (spatial index included), so all
//! query operations are pure, lock-free, and safe to call from any number
//! of threads; [`sample_points`] exploits this for parallel batches.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mesh_grid::{
//!     BlockStorage, CurvilinearGrid, Grid, HorizontalCoords, ScalarField2, VerticalAxis,
//! };
//!
//! // A 3x3 unit-square mesh with two layers at Z = 0 and 10.
//! let mut xs = Vec::new();
//! let mut ys = Vec::new();
//! for j in 0..3 {
//!     for i in 0..3 {
//!         xs.push(i as f64);
//!         ys.push(j as f64);
//!     }
//! }
//! let coords = HorizontalCoords::new(
//!     ScalarField2::new([3, 3], xs).unwrap(),
//!     ScalarField2::new([3, 3], ys).unwrap(),
//! )
//! .unwrap();
//! let index = Arc::new(CurvilinearGrid::build_index(&coords).unwrap());
//!
//! let data = vec![1.0f32; 18];
//! let storage = BlockStorage::contiguous(vec![3, 3, 2], data, 1.0e37).unwrap();
//! let vertical = VerticalAxis::new(vec![0.0, 10.0]).unwrap();
//!
//! let grid = CurvilinearGrid::new(storage, coords, Some(vertical), index).unwrap();
//! assert_eq!(grid.cell_indices(&[1.5, 1.5, 5.0]), Some(vec![1, 1, 0]));
//! assert!((grid.value_linear(&[1.5, 1.5, 5.0]) - 1.0).abs() < 1e-6);
//! ```

pub mod coords;
pub mod curvilinear;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod iterator;
pub mod layered;
pub mod regular;
pub mod sample;
pub mod storage;
pub mod types;
pub mod util;

// Re-export commonly used types at crate root
pub use coords::{
    binary_search_range, Bracket, HorizontalCoords, LayeredCoords, ScalarField2, VerticalAxis,
};
pub use curvilinear::CurvilinearGrid;
pub use error::{GridError, Result};
pub use geometry::wachspress_weights;
pub use grid::Grid;
pub use iterator::{CoordIterator, CurvCoordIter, LayeredCoordIter, RegularCoordIter};
pub use layered::LayeredGrid;
pub use regular::RegularGrid;
pub use sample::{interpolate_quad, sample_points};
pub use storage::BlockStorage;
pub use types::{Extents, SamplingMethod};
