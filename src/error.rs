//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
///
/// All of these are local, synchronous failures; recovery belongs to the
/// caller.
#[derive(Error, Debug)]
pub enum HeadError {
    /// A tensor does not have the shape the operation requires.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// A distribution parameter is non-finite or degenerate.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// A head was built from an invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl HeadError {
    /// Builds a [`HeadError::ShapeMismatch`] from expected/actual dimensions.
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: format!("{:?}", expected),
            got: format!("{:?}", got),
        }
    }
}
