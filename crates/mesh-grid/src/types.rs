//! Core value types shared across grid variants.

use serde::{Deserialize, Serialize};

/// Per-axis physical extents of a grid.
///
/// For curvilinear meshes these are the tight min/max of the coordinate
/// fields, computed once at construction; queries outside the extents can be
/// rejected before any cell search runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extents {
    /// Per-axis minimum coordinate.
    pub min: Vec<f64>,
    /// Per-axis maximum coordinate.
    pub max: Vec<f64>,
}

impl Extents {
    /// Create extents from per-axis bounds.
    pub fn new(min: Vec<f64>, max: Vec<f64>) -> Self {
        debug_assert_eq!(min.len(), max.len());
        Self { min, max }
    }

    /// Number of axes.
    pub fn dimensionality(&self) -> usize {
        self.min.len()
    }

    /// Whether `point` lies inside the extents on every axis both supply.
    ///
    /// A 2-component point checks only the horizontal axes of a 3D grid.
    pub fn contains(&self, point: &[f64]) -> bool {
        point
            .iter()
            .zip(self.min.iter().zip(&self.max))
            .all(|(&v, (&lo, &hi))| v >= lo && v <= hi)
    }

    /// Clamp a single component to the valid range of its axis.
    pub fn clamp_axis(&self, axis: usize, v: f64) -> f64 {
        v.max(self.min[axis]).min(self.max[axis])
    }

    /// Center point of the extents.
    pub fn center(&self) -> Vec<f64> {
        self.min
            .iter()
            .zip(&self.max)
            .map(|(lo, hi)| (lo + hi) / 2.0)
            .collect()
    }
}

/// Sampling method for value queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SamplingMethod {
    /// Single raw sample from the nearest node (preserves exact values).
    Nearest,
    /// Wachspress-weighted horizontal blend plus linear vertical blend.
    #[default]
    Linear,
}

impl SamplingMethod {
    /// Parse from string (case-insensitive). Unknown strings fall back to
    /// linear, the default.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "nearest" => Self::Nearest,
            _ => Self::Linear,
        }
    }
}

impl std::fmt::Display for SamplingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Linear => write!(f, "linear"),
        }
    }
}
