use std::path::PathBuf;

use thiserror::Error;

/// Errors from constructing, reading or writing an [`RgbImage`](super::RgbImage).
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to open image '{path}': {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create image file '{path}': {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode image '{path}': {source}")]
    Decode {
        path: PathBuf,
        source: ::image::ImageError,
    },

    #[error("Failed to encode image '{path}': {source}")]
    Encode {
        path: PathBuf,
        source: ::image::ImageError,
    },

    #[error("Unsupported color type {color} in '{path}', expected 8 or 16-bit RGB")]
    UnsupportedColor { path: PathBuf, color: String },

    #[error("Can't save an empty image to '{path}'")]
    EmptyImage { path: PathBuf },

    #[error("Image {width}x{height} is too large to encode")]
    TooLarge { width: usize, height: usize },

    #[error("Pixel buffer holds {actual} pixels, expected {expected}")]
    PixelCountMismatch { expected: usize, actual: usize },
}
