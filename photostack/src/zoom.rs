//! Nearest-neighbor upscaling by an integer factor.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::image::{ImageError, ImageReport, ImageSummary, RgbImage, write_ppm};

#[derive(Debug, Error)]
pub enum ZoomError {
    #[error("Zoom factor must be at least 1, got {0}")]
    InvalidFactor(u32),

    #[error("Zooming a {width}x{height} image by {factor} overflows the pixel count")]
    TooLarge {
        width: usize,
        height: usize,
        factor: u32,
    },

    #[error("Failed to write zoomed image '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
}

/// Integer scale factor, at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoomFactor(NonZeroU32);

impl ZoomFactor {
    pub const X2: ZoomFactor = ZoomFactor(NonZeroU32::MIN.saturating_add(1));
    pub const X4: ZoomFactor = ZoomFactor(NonZeroU32::MIN.saturating_add(3));

    pub fn new(factor: u32) -> Result<Self, ZoomError> {
        NonZeroU32::new(factor)
            .map(ZoomFactor)
            .ok_or(ZoomError::InvalidFactor(factor))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for ZoomFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Upscale `image` by `factor`, repeating every source pixel in a
/// `factor x factor` block. Bit depth and image info are carried over.
pub fn nearest_neighbor_zoom(image: &RgbImage, factor: ZoomFactor) -> Result<RgbImage, ZoomError> {
    let k = factor.get() as usize;
    let too_large = || ZoomError::TooLarge {
        width: image.width(),
        height: image.height(),
        factor: factor.get(),
    };

    let width = image.width().checked_mul(k).ok_or_else(too_large)?;
    let height = image.height().checked_mul(k).ok_or_else(too_large)?;
    width.checked_mul(height).ok_or_else(too_large)?;

    let src_width = image.width();
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        let src_row = (y / k) * src_width;
        for x in 0..width {
            pixels.push(image.get(src_row + x / k));
        }
    }

    let zoomed = RgbImage::from_pixels(width, height, pixels)
        .map_err(|_| too_large())?
        .with_bit_depth(image.bit_depth())
        .with_info(image.info().clone());

    Ok(zoomed)
}

/// A base image together with the factor it is shown at.
///
/// The base stays untouched; [`render`](Self::render) produces the upscaled
/// pixels on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomedImage {
    base: RgbImage,
    factor: ZoomFactor,
}

impl ZoomedImage {
    pub fn new(base: RgbImage, factor: ZoomFactor) -> Self {
        Self { base, factor }
    }

    pub fn base(&self) -> &RgbImage {
        &self.base
    }

    pub fn factor(&self) -> ZoomFactor {
        self.factor
    }

    pub fn render(&self) -> Result<RgbImage, ZoomError> {
        nearest_neighbor_zoom(&self.base, self.factor)
    }

    /// File name the rendered image is written under, e.g. `x2 Zoom.ppm`.
    pub fn output_name(&self) -> String {
        format!("{} Zoom.ppm", self.factor)
    }

    /// Render and write to `<dir>/x<k> Zoom.ppm`.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, ZoomError> {
        let rendered = self.render()?;
        let path = dir.join(self.output_name());

        write_ppm(&rendered, &path).map_err(|source| ZoomError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

impl ImageReport for ZoomedImage {
    fn report(&self) -> ImageSummary {
        let k = self.factor.get() as usize;
        let mut summary = self.base.report();
        summary.dimensions.width = summary.dimensions.width.saturating_mul(k);
        summary.dimensions.height = summary.dimensions.height.saturating_mul(k);
        summary.zoom = Some(self.factor.get());
        summary
    }
}
