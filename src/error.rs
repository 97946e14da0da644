//! Error types for Margen operations

use thiserror::Error;

/// Result type for Margen operations
pub type Result<T> = std::result::Result<T, MargenError>;

/// Errors that can occur during Margen operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MargenError {
    /// Shape mismatch between triplet batches
    #[error("Shape mismatch: left {left:?}, right {right:?}")]
    ShapeMismatch {
        /// Shape (rows, cols) of the first batch in the failing pair
        left: (usize, usize),
        /// Shape (rows, cols) of the second batch in the failing pair
        right: (usize, usize),
    },

    /// Batch with zero rows or zero columns
    #[error("Degenerate batch: {rows}x{cols}")]
    DegenerateBatch {
        /// Number of rows (batch size)
        rows: usize,
        /// Number of columns (per-example vector size)
        cols: usize,
    },

    /// Output buffer allocation failed (fatal, never retried)
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_error() {
        let err = MargenError::ShapeMismatch {
            left: (4, 8),
            right: (4, 16),
        };
        assert_eq!(err.to_string(), "Shape mismatch: left (4, 8), right (4, 16)");
    }

    #[test]
    fn test_degenerate_batch_error() {
        let err = MargenError::DegenerateBatch { rows: 0, cols: 128 };
        assert_eq!(err.to_string(), "Degenerate batch: 0x128");
    }

    #[test]
    fn test_allocation_failure_error() {
        let err = MargenError::AllocationFailure("memory allocation failed".to_string());
        assert_eq!(
            err.to_string(),
            "Allocation failure: memory allocation failed"
        );
    }

    #[test]
    fn test_invalid_input_error() {
        let err = MargenError::InvalidInput("data length 3 for 2x2 batch".to_string());
        assert_eq!(err.to_string(), "Invalid input: data length 3 for 2x2 batch");
    }

    #[test]
    fn test_error_equality() {
        let err1 = MargenError::DegenerateBatch { rows: 1, cols: 0 };
        let err2 = MargenError::DegenerateBatch { rows: 1, cols: 0 };
        assert_eq!(err1, err2);
    }
}
