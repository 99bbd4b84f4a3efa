mod cpu;
pub mod error;
mod progress;
mod runner;
mod sample;
mod sigma_clipped;

pub use error::Error;
pub use progress::{ProgressCallback, StackingProgress, StackingStage, report_progress};
pub use runner::{StackConfig, StackRunner};
pub use sample::ChannelSamples;
pub use sigma_clipped::{ClipOutcome, ClipPolicy};

use crate::image::RgbImage;

/// Method used for combining multiple frames during stacking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StackingMethod {
    /// Average all pixel values. Fast but sensitive to outliers.
    Mean,
    /// Take the median pixel value.
    #[default]
    Median,
    /// Mean of the values left after median-centred sigma clipping.
    SigmaClip(ClipPolicy),
}

impl std::fmt::Display for StackingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackingMethod::Mean => write!(f, "mean"),
            StackingMethod::Median => write!(f, "median"),
            StackingMethod::SigmaClip(ClipPolicy::Iterations(count)) => {
                write!(f, "sigma-iterations({})", count)
            }
            StackingMethod::SigmaClip(ClipPolicy::Tolerance(tolerance)) => {
                write!(f, "sigma-tolerance({})", tolerance)
            }
        }
    }
}

impl StackingMethod {
    /// Descriptive name of the file this method's result is written to.
    pub fn output_name(&self) -> &'static str {
        match self {
            StackingMethod::Mean => "Mean Blending",
            StackingMethod::Median => "Median Blending",
            StackingMethod::SigmaClip(ClipPolicy::Iterations(_)) => "Sigma Clipping Iterations",
            StackingMethod::SigmaClip(ClipPolicy::Tolerance(_)) => "Sigma Clipping Tolerance",
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        match self {
            StackingMethod::Mean | StackingMethod::Median => Ok(()),
            StackingMethod::SigmaClip(policy) => policy.validate(),
        }
    }
}

/// Stack frames with the given method (uses parallel CPU implementation).
///
/// All frames must share the same dimensions. The result copies the bit depth
/// of the first frame.
pub fn stack_frames(frames: &[RgbImage], method: StackingMethod) -> Result<RgbImage, Error> {
    cpu::stack_frames_cpu(frames, method, &ProgressCallback::default())
}
