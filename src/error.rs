//! Error types shared by every learner in the crate.

use thiserror::Error;

/// Errors produced by the learners and the dataset loader.
#[derive(Debug, Error)]
pub enum MlError {
    /// Two feature vectors (or a vector and a model) disagree on dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality established by the first vector / the model
        expected: usize,
        /// Dimensionality of the offending vector
        actual: usize,
    },

    /// An input collection that must be non-empty was empty.
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    /// k-means hit its iteration cap while cluster membership was still moving.
    #[error("k-means did not converge within {iterations} iterations")]
    DidNotConverge { iterations: usize },

    /// Label-seeded k-means needs one cluster slot per distinct label.
    #[error("{labels} distinct labels cannot seed {clusters} clusters")]
    TooManyLabels { labels: usize, clusters: usize },

    /// A hyperparameter is outside its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A perceptron was asked to learn a label it cannot emit.
    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A dataset file held no usable rows.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenient alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, MlError>;
