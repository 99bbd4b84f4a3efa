//! Error types for stacking operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::image::{ImageDimensions, ImageError};

/// Errors that can occur during stacking operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No images supplied for stacking")]
    NoImages,

    #[error("Dimension mismatch for frame {index}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        index: usize,
        expected: ImageDimensions,
        actual: ImageDimensions,
    },

    #[error(
        "No operations were performed since the iteration count {0} is less than or equal to 0"
    )]
    InvalidIterations(i32),

    #[error("No operations were performed since the tolerance {0} is not a positive number")]
    InvalidTolerance(f32),

    #[error("Failed to write stacked image '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
}

impl Error {
    /// Invalid parameters are a reported no-op, not a failure of the batch.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Error::InvalidIterations(_) | Error::InvalidTolerance(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_images_error_message() {
        assert_eq!(Error::NoImages.to_string(), "No images supplied for stacking");
    }

    #[test]
    fn test_dimension_mismatch_error_message() {
        let err = Error::DimensionMismatch {
            index: 5,
            expected: ImageDimensions::new(100, 100),
            actual: ImageDimensions::new(200, 100),
        };
        let msg = err.to_string();
        assert!(msg.contains("5"));
        assert!(msg.contains("100"));
        assert!(msg.contains("200"));
    }

    #[test]
    fn test_invalid_parameter_messages() {
        let iterations = Error::InvalidIterations(0);
        assert!(iterations.to_string().contains("No operations were performed"));
        assert!(iterations.to_string().contains("0"));

        let tolerance = Error::InvalidTolerance(-0.5);
        assert!(tolerance.to_string().contains("-0.5"));
    }

    #[test]
    fn test_invalid_parameter_classification() {
        assert!(Error::InvalidIterations(-1).is_invalid_parameter());
        assert!(Error::InvalidTolerance(0.0).is_invalid_parameter());
        assert!(!Error::NoImages.is_invalid_parameter());
        assert!(
            !Error::DimensionMismatch {
                index: 1,
                expected: ImageDimensions::new(1, 1),
                actual: ImageDimensions::new(2, 1),
            }
            .is_invalid_parameter()
        );
    }

    #[test]
    fn test_write_error_source_chain() {
        use std::error::Error as StdError;

        let err = Error::Write {
            path: PathBuf::from("/out/Mean Blending.ppm"),
            source: ImageError::EmptyImage {
                path: PathBuf::from("/out/Mean Blending.ppm"),
            },
        };

        assert!(err.to_string().contains("Mean Blending.ppm"));
        assert!(err.source().is_some());
    }
}
