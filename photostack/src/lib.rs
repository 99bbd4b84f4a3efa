//! Photostack - pixel-wise image stacking.
//!
//! This library combines a batch of same-sized RGB images into one:
//! - Mean and median stacking
//! - Median-centred sigma clipping, by iteration count or by convergence tolerance
//! - Binary PPM reading and writing
//! - Nearest-neighbor zoom by an integer factor
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use photostack::{ClipPolicy, StackConfig, StackRunner, StackingMethod, read_ppm};
//!
//! let frames = vec![read_ppm("a.ppm")?, read_ppm("b.ppm")?, read_ppm("c.ppm")?];
//!
//! let method = StackingMethod::SigmaClip(ClipPolicy::iterations(3)?);
//! let path = StackRunner::new(StackConfig::new(method, "out")).run(&frames)?;
//! ```

pub(crate) mod common;
pub mod image;
pub(crate) mod math;
pub mod stacking;
pub mod zoom;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Images
// ============================================================================

pub use image::{
    Channel, ImageDimensions, ImageError, ImageInfo, ImageReport, ImageSummary, Rgb, RgbImage,
    read_ppm, write_ppm,
};

// ============================================================================
// Stacking
// ============================================================================

pub use stacking::{
    ChannelSamples, ClipOutcome, ClipPolicy, Error as StackError, ProgressCallback, StackConfig,
    StackRunner, StackingMethod, StackingProgress, StackingStage, stack_frames,
};

// ============================================================================
// Zoom
// ============================================================================

pub use zoom::{ZoomError, ZoomFactor, ZoomedImage, nearest_neighbor_zoom};
