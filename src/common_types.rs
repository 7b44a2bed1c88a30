//! This module contains common data structures used across the learners.

use crate::error::{MlError, Result};

/// Represents a single data point, with features and a label.
///
/// - `F`: The type of the features (e.g., `f64`, `f32`).
/// - `L`: The type of the label (e.g., `i32`, `String`, an enum).
///
/// Learners only ever borrow points; a point is never modified after construction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataPoint<F, L> {
    pub features: Vec<F>,
    pub label: L,
}

impl<F, L> DataPoint<F, L> {
    pub fn new(features: Vec<F>, label: L) -> Self {
        DataPoint { features, label }
    }

    /// Number of features carried by this point.
    pub fn dimensions(&self) -> usize {
        self.features.len()
    }
}

/// Checks that every point shares the dimensionality of the first one and
/// returns that dimensionality (0 for an empty dataset).
pub fn validate_dataset<F, L>(dataset: &[DataPoint<F, L>]) -> Result<usize> {
    let Some(first) = dataset.first() else {
        return Ok(0);
    };
    let expected = first.dimensions();
    for point in dataset.iter() {
        if point.dimensions() != expected {
            return Err(MlError::DimensionMismatch {
                expected,
                actual: point.dimensions(),
            });
        }
    }
    Ok(expected)
}
