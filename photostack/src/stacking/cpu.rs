use std::time::Instant;

use crate::common::parallel_map_init;
use crate::image::{ImageDimensions, Rgb, RgbImage};
use crate::math::statistics::{mean, median_mut};
use crate::stacking::error::Error;
use crate::stacking::progress::{ProgressCallback, StackingStage, report_progress};
use crate::stacking::sample::ChannelSamples;
use crate::stacking::sigma_clipped::ClipStats;
use crate::stacking::StackingMethod;

/// Check that there is at least one frame and that every frame matches the
/// first one's dimensions. Returns the shared dimensions.
pub(crate) fn validate_frames(frames: &[RgbImage]) -> Result<ImageDimensions, Error> {
    let first = frames.first().ok_or(Error::NoImages)?;
    let expected = first.dimensions();

    for (index, frame) in frames.iter().enumerate().skip(1) {
        if frame.dimensions() != expected {
            return Err(Error::DimensionMismatch {
                index,
                expected,
                actual: frame.dimensions(),
            });
        }
    }

    Ok(expected)
}

/// Stack frames with the given method using parallel CPU processing.
///
/// Parameters are validated before the frames, so an invalid clipping policy
/// is reported even for an empty batch.
pub(crate) fn stack_frames_cpu(
    frames: &[RgbImage],
    method: StackingMethod,
    progress: &ProgressCallback,
) -> Result<RgbImage, Error> {
    method.validate()?;
    let dims = validate_frames(frames)?;
    let frame_count = frames.len();
    let start = Instant::now();

    tracing::debug!(
        method = %method,
        frame_count,
        width = dims.width,
        height = dims.height,
        "Combining frames"
    );

    let stats = ClipStats::default();
    let pixels = parallel_map_init(
        dims.pixel_count(),
        || ChannelSamples::with_capacity(frame_count),
        |samples, pixel_idx| {
            samples.gather(frames, pixel_idx);
            combine_pixel(samples, method, &stats)
        },
        |done, total| report_progress(progress, done, total, StackingStage::Processing),
    );

    if let StackingMethod::SigmaClip(_) = method {
        stats.log_summary(frame_count);
    }

    tracing::debug!(
        method = %method,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Frames combined"
    );

    let mut output = RgbImage::new(dims.width, dims.height).with_bit_depth(frames[0].bit_depth());
    output.pixels_mut().copy_from_slice(&pixels);
    Ok(output)
}

/// Reduce one pixel's sample sets to a single output pixel.
fn combine_pixel(samples: &mut ChannelSamples, method: StackingMethod, stats: &ClipStats) -> Rgb {
    let [red, green, blue] = samples.channels_mut();
    Rgb::new(
        combine_channel(red, method, stats),
        combine_channel(green, method, stats),
        combine_channel(blue, method, stats),
    )
}

/// Reduce one channel's sample set. The set may be reordered or shrunk.
fn combine_channel(values: &mut Vec<f32>, method: StackingMethod, stats: &ClipStats) -> f32 {
    debug_assert!(!values.is_empty());

    let combined = match method {
        StackingMethod::Mean => mean(values),
        StackingMethod::Median => median_mut(values),
        StackingMethod::SigmaClip(policy) => {
            let original_len = values.len();
            let outcome = policy.clip(values);
            stats.record(original_len, values.len(), outcome);
            mean(values)
        }
    };

    // Only reachable with zero frames, which validate_frames rules out.
    combined.unwrap_or(0.0) as f32
}
