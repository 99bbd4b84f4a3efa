//! Per-image reports, emitted through `tracing`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{ImageDimensions, RgbImage};

/// What gets recorded about an image after it has been processed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSummary {
    pub name: String,
    pub dimensions: ImageDimensions,
    pub bit_depth: u32,
    pub read_at: Option<SystemTime>,
    pub read_duration: Option<Duration>,
    pub zoom: Option<u32>,
}

impl ImageSummary {
    /// Emit the summary as a single structured `info` event.
    pub fn log(&self) {
        let read_at = self
            .read_at
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs());
        let read_ms = self.read_duration.map(|d| d.as_millis() as u64);

        tracing::info!(
            name = %self.name,
            width = self.dimensions.width,
            height = self.dimensions.height,
            bit_depth = self.bit_depth,
            read_at = ?read_at,
            read_ms = ?read_ms,
            zoom = ?self.zoom,
            "Image report"
        );
    }
}

/// Anything that can describe itself as an [`ImageSummary`].
pub trait ImageReport {
    fn report(&self) -> ImageSummary;

    fn log_report(&self) {
        self.report().log();
    }
}

impl ImageReport for RgbImage {
    fn report(&self) -> ImageSummary {
        let info = self.info();
        ImageSummary {
            name: info.name.clone().unwrap_or_else(|| "<unnamed>".to_string()),
            dimensions: self.dimensions(),
            bit_depth: self.bit_depth(),
            read_at: info.read_at,
            read_duration: info.read_duration,
            zoom: None,
        }
    }
}
