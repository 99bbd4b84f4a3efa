//! Full stacking runs: combine a batch of frames and write the result.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::image::{RgbImage, write_ppm};
use crate::stacking::StackingMethod;
use crate::stacking::cpu::stack_frames_cpu;
use crate::stacking::error::Error;
use crate::stacking::progress::ProgressCallback;

/// What to stack and where to put the result.
#[derive(Debug, Clone, PartialEq)]
pub struct StackConfig {
    pub method: StackingMethod,
    /// Directory the output file is written to.
    pub output_dir: PathBuf,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            method: StackingMethod::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl StackConfig {
    pub fn new(method: StackingMethod, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            method,
            output_dir: output_dir.into(),
        }
    }
}

/// Drives one stacking operation from validated input to written output.
///
/// A runner is cheap to build; run several with different methods over the
/// same frames to produce every variant. A failing run leaves the others
/// unaffected.
#[derive(Debug, Clone, Default)]
pub struct StackRunner {
    config: StackConfig,
    progress: ProgressCallback,
}

impl StackRunner {
    pub fn new(config: StackConfig) -> Self {
        Self {
            config,
            progress: ProgressCallback::default(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// `<output_dir>/<method output name>.ppm`
    pub fn output_path(&self) -> PathBuf {
        output_path(&self.config.output_dir, self.config.method)
    }

    /// Combine `frames` into one image without writing it.
    pub fn stack(&self, frames: &[RgbImage]) -> Result<RgbImage, Error> {
        let method = self.config.method;
        tracing::info!(method = %method, frame_count = frames.len(), "Starting stack");

        let start = Instant::now();
        let image = stack_frames_cpu(frames, method, &self.progress)?;

        tracing::info!(
            method = %method,
            width = image.width(),
            height = image.height(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Stack complete"
        );

        Ok(image)
    }

    /// Combine `frames` and write the result to [`output_path`](Self::output_path).
    ///
    /// Invalid parameters are reported before anything is read or written, so
    /// no output file is produced for them.
    pub fn run(&self, frames: &[RgbImage]) -> Result<PathBuf, Error> {
        let image = self.stack(frames)?;
        let path = self.output_path();

        write_ppm(&image, &path).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

fn output_path(dir: &Path, method: StackingMethod) -> PathBuf {
    dir.join(format!("{}.ppm", method.output_name()))
}
