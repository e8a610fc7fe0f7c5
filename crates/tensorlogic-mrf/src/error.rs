//! Error types for Markov network operations.

use thiserror::Error;

/// Errors that can occur while building, querying, reducing or sampling a
/// Markov network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MrfError {
    /// Malformed sampler configuration or call arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Structural query on a name that is not a network variable
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// Initial sample does not assign a network variable
    #[error("Initial sample is missing variable: {0}")]
    MissingVariable(String),

    /// Initial sample contradicts the evidence
    #[error(
        "Inconsistent assignment for {variable}: evidence has {evidence}, initial sample has {initial}"
    )]
    InconsistentAssignment {
        variable: String,
        evidence: usize,
        initial: usize,
    },

    /// Local conditional of a variable has no mass
    #[error("Degenerate distribution: local conditional of {0} sums to zero")]
    DegenerateDistribution(String),

    /// Rank of a potential table does not match its scope
    #[error("Dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch { expected: Vec<usize>, got: Vec<usize> },

    /// Two factors disagree on the number of categories of a variable
    #[error("Cardinality mismatch for {variable}: expected {expected}, got {got}")]
    CardinalityMismatch {
        variable: String,
        expected: usize,
        got: usize,
    },

    /// Category index outside a variable's domain
    #[error("Value {value} out of range for {variable} with cardinality {cardinality}")]
    ValueOutOfRange {
        variable: String,
        value: usize,
        cardinality: usize,
    },

    /// Malformed factor (duplicate scope entries, bad shape)
    #[error("Invalid factor: {0}")]
    InvalidFactor(String),
}

impl From<scirs2_core::ndarray::ShapeError> for MrfError {
    fn from(err: scirs2_core::ndarray::ShapeError) -> Self {
        MrfError::InvalidFactor(format!("Shape error: {}", err))
    }
}

/// Result type for Markov network operations.
pub type Result<T> = std::result::Result<T, MrfError>;
