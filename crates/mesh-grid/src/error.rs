//! Error types for grid construction.
//!
//! Errors here cover malformed construction inputs only. Query-time
//! "point not resolvable" outcomes are expressed through `Option`, `bool`,
//! or the grid's missing-value sentinel, never through `Err`.

use thiserror::Error;

/// Errors that can occur while assembling a grid.
#[derive(Error, Debug)]
pub enum GridError {
    /// Declared dimensions disagree between collaborating inputs.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A vertical coordinate sequence is not strictly monotonic.
    #[error("vertical coordinates are not strictly monotonic at layer {layer}")]
    NonMonotonic { layer: usize },

    /// Block storage inputs do not form a valid decomposition.
    #[error("block decomposition error: {0}")]
    BlockDecomposition(String),

    /// Mesh connectivity references nodes that do not exist.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// Spatial index construction failed.
    #[error("spatial index error: {0}")]
    Index(#[from] spatial_index::IndexError),
}

impl GridError {
    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Create a BlockDecomposition error.
    pub fn block_decomposition(msg: impl Into<String>) -> Self {
        Self::BlockDecomposition(msg.into())
    }

    /// Create a Connectivity error.
    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::Connectivity(msg.into())
    }
}

/// Result type for grid construction.
pub type Result<T> = std::result::Result<T, GridError>;
