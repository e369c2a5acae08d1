//! Error types for chispa operations

use thiserror::Error;

use crate::Backend;

/// Result type for chispa operations
pub type Result<T> = std::result::Result<T, ChispaError>;

/// Errors that can occur when dispatching activation kernels
#[derive(Debug, Error, PartialEq)]
pub enum ChispaError {
    /// Backend not supported on this platform or CPU
    #[error("Backend not supported on this platform: {0:?}")]
    UnsupportedBackend(Backend),

    /// Output buffer length differs from the input buffer length
    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Invalid input (e.g. a slope the max-based leaky ReLU cannot honour)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Vectorized result diverged from the scalar reference
    #[error("Divergence at index {index}: f({input}) expected {expected}, got {actual}")]
    Divergence {
        /// First divergent element
        index: usize,
        /// Input value at that element
        input: f32,
        /// Scalar reference output
        expected: f32,
        /// Candidate backend output
        actual: f32,
    },
}
