//! Error types for quadratic program solves.

use thiserror::Error;

/// Errors that can occur while solving a quadratic program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QpError {
    /// Input shapes are inconsistent with each other.
    #[error("dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Which input was malformed.
        what: &'static str,
        /// The size implied by the other inputs.
        expected: usize,
        /// The size actually supplied.
        found: usize,
    },

    /// The quadratic term is not symmetric.
    #[error("quadratic term is not symmetric at ({row}, {col})")]
    NotSymmetric {
        /// Row of the offending entry.
        row: usize,
        /// Column of the offending entry.
        col: usize,
    },

    /// The quadratic term is not positive definite.
    #[error("quadratic term is not positive definite (pivot {pivot})")]
    NotPositiveDefinite {
        /// Index of the first non-positive pivot.
        pivot: usize,
    },

    /// No point satisfies all constraints.
    #[error("constraints are infeasible (failed to enforce constraint {constraint})")]
    Infeasible {
        /// The constraint that could not be brought into the active set.
        constraint: usize,
    },

    /// The configured iteration cap was reached.
    #[error("did not converge within {iterations} iterations")]
    DidNotConverge {
        /// Number of iterations performed.
        iterations: usize,
    },
}

/// Result type for solver operations.
pub type Result<T> = std::result::Result<T, QpError>;
