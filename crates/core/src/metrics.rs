//! Field metric reductions
//!
//! Capture frames never store whole fields, only four summary statistics
//! per field. Reductions run sequentially in a fixed order so repeated
//! runs of the same capture produce byte-identical output files.

use serde::{Deserialize, Serialize};

/// Summary statistics of one field at one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldMetrics {
    pub sum: f64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl FieldMetrics {
    /// Reduce a sequence of scalar samples.
    ///
    /// Sums are accumulated in f64 to keep large grids from losing
    /// low-order mass; min and max are taken in the field's own f32
    /// precision before widening. An empty sequence reduces to all
    /// zeros rather than NaN so degenerate grids stay representable.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        let mut sum = 0.0_f64;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut count = 0_u64;

        for v in values {
            sum += f64::from(v);
            min = min.min(v);
            max = max.max(v);
            count += 1;
        }

        if count == 0 {
            return Self {
                sum: 0.0,
                min: 0.0,
                max: 0.0,
                avg: 0.0,
            };
        }

        Self {
            sum,
            min: f64::from(min),
            max: f64::from(max),
            avg: sum / count as f64,
        }
    }

    /// Reduce a scalar field slice.
    #[must_use]
    pub fn from_slice(values: &[f32]) -> Self {
        Self::from_values(values.iter().copied())
    }
}
