//! Stride-1 sliding windows over a series
//!
//! A window is `size` consecutive values paired with the value that directly
//! follows them. The windows of a series are produced in chronological order
//! and are a pure function of the input.

use crate::{MathError, Result};
use serde::Serialize;

/// A fixed-length slice of a series and the value immediately after it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Window<'a> {
    /// Index of the first input value in the source series
    pub start: usize,
    /// The `size` input values
    pub inputs: &'a [f64],
    /// The value at `start + size`
    pub label: f64,
}

impl Window<'_> {
    /// Number of input values
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// A window never has zero inputs, this exists for API symmetry
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Slice `series` into every `(inputs, label)` pair of width `size`
///
/// Returns exactly `series.len() - size` windows. A series that is not longer
/// than `size` cannot yield a single labelled window and is rejected.
pub fn windows(series: &[f64], size: usize) -> Result<Vec<Window<'_>>> {
    if size == 0 {
        return Err(MathError::InvalidInput(
            "Window size must be positive".to_string(),
        ));
    }

    if series.len() <= size {
        return Err(MathError::InsufficientData {
            required: size + 1,
            available: series.len(),
        });
    }

    Ok((0..series.len() - size)
        .map(|start| Window {
            start,
            inputs: &series[start..start + size],
            label: series[start + size],
        })
        .collect())
}
