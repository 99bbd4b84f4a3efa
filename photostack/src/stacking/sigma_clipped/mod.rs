//! Median-centred sigma clipping with two termination policies.
//!
//! Every pass keeps the values inside `[median - sd, median + sd]` of the
//! current sample (bounds inclusive). [`ClipPolicy::Iterations`] runs a fixed
//! number of passes; [`ClipPolicy::Tolerance`] keeps clipping until the
//! relative drop in standard deviation reaches the tolerance or clipping stops
//! making progress.
//!
//! A pass that would remove every remaining value is rejected: the sample is
//! left as it was and clipping stops for that channel. A clipped sample is
//! therefore never empty.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::math::statistics::{median_mut, standard_deviation};
use crate::stacking::error::Error;

/// Termination policy for sigma clipping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipPolicy {
    /// Run exactly this many clipping passes.
    Iterations(NonZeroU32),
    /// Clip until `(original_sd - sd) / sd` reaches this value.
    Tolerance(f32),
}

impl ClipPolicy {
    /// Fixed-count policy. Counts of zero or less are rejected.
    pub fn iterations(count: i32) -> Result<Self, Error> {
        u32::try_from(count)
            .ok()
            .and_then(NonZeroU32::new)
            .map(ClipPolicy::Iterations)
            .ok_or(Error::InvalidIterations(count))
    }

    /// Convergence policy. The tolerance must be positive and finite.
    pub fn tolerance(tolerance: f32) -> Result<Self, Error> {
        let policy = ClipPolicy::Tolerance(tolerance);
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), Error> {
        match *self {
            ClipPolicy::Iterations(_) => Ok(()),
            ClipPolicy::Tolerance(t) if t.is_finite() && t > 0.0 => Ok(()),
            ClipPolicy::Tolerance(t) => Err(Error::InvalidTolerance(t)),
        }
    }

    /// Clip `values` in place according to the policy.
    pub fn clip(&self, values: &mut Vec<f32>) -> ClipOutcome {
        match *self {
            ClipPolicy::Iterations(count) => clip_iterations(values, count),
            ClipPolicy::Tolerance(tolerance) => clip_tolerance(values, tolerance as f64),
        }
    }
}

/// What a single [`ClipPolicy::clip`] call did to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipOutcome {
    /// Passes that were applied (including passes that removed nothing).
    pub passes: u32,
    /// A pass was rejected because it would have emptied the sample.
    pub guarded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Applied { removed: usize },
    Rejected,
}

/// Remove every value outside `[center - deviation, center + deviation]`.
fn clip_pass(values: &mut Vec<f32>, center: f64, deviation: f64) -> Pass {
    let lower = center - deviation;
    let upper = center + deviation;
    let in_bounds = |v: f32| {
        let v = v as f64;
        v >= lower && v <= upper
    };

    if !values.iter().any(|&v| in_bounds(v)) {
        return Pass::Rejected;
    }

    let before = values.len();
    values.retain(|&v| in_bounds(v));
    Pass::Applied {
        removed: before - values.len(),
    }
}

fn clip_iterations(values: &mut Vec<f32>, count: NonZeroU32) -> ClipOutcome {
    let mut outcome = ClipOutcome::default();

    for _ in 0..count.get() {
        let (Some(center), Some(deviation)) = (median_mut(values), standard_deviation(values))
        else {
            break;
        };

        match clip_pass(values, center, deviation) {
            Pass::Applied { .. } => outcome.passes += 1,
            Pass::Rejected => {
                outcome.guarded = true;
                break;
            }
        }
    }

    outcome
}

/// Relative improvement of `current` over `original`. `None` once `current`
/// has collapsed to zero, which counts as converged.
#[inline]
fn relative_improvement(original: f64, current: f64) -> Option<f64> {
    (current > 0.0).then(|| (original - current) / current)
}

fn clip_tolerance(values: &mut Vec<f32>, tolerance: f64) -> ClipOutcome {
    let mut outcome = ClipOutcome::default();

    let (Some(center), Some(original_deviation)) = (median_mut(values), standard_deviation(values))
    else {
        return outcome;
    };

    if clip_pass(values, center, original_deviation) == Pass::Rejected {
        outcome.guarded = true;
        return outcome;
    }
    outcome.passes = 1;

    let mut deviation = standard_deviation(values).unwrap_or(0.0);
    let Some(mut level) = relative_improvement(original_deviation, deviation) else {
        return outcome;
    };

    while level < tolerance {
        let Some(center) = median_mut(values) else {
            break;
        };

        // Bounds use the deviation of the sample before this pass.
        let removed = match clip_pass(values, center, deviation) {
            Pass::Applied { removed } => removed,
            Pass::Rejected => {
                outcome.guarded = true;
                break;
            }
        };
        outcome.passes += 1;

        deviation = standard_deviation(values).unwrap_or(0.0);

        match relative_improvement(original_deviation, deviation) {
            Some(next) if removed > 0 => level = next,
            _ => break,
        }
    }

    outcome
}

/// Clipping statistics accumulated across all pixels of one stack.
#[derive(Debug, Default)]
pub(crate) struct ClipStats {
    /// Total number of input values processed.
    total_values: AtomicU64,
    /// Total number of values clipped (removed as outliers).
    clipped_values: AtomicU64,
    /// Number of channel samples where clipping occurred.
    channels_with_clipping: AtomicU64,
    /// Number of channel samples where more than half the values were clipped.
    channels_excessive_clipping: AtomicU64,
    /// Number of channel samples where a pass was rejected to avoid emptying it.
    channels_guarded: AtomicU64,
}

impl ClipStats {
    pub(crate) fn record(&self, original_len: usize, final_len: usize, outcome: ClipOutcome) {
        let clipped = original_len - final_len;
        self.total_values
            .fetch_add(original_len as u64, Ordering::Relaxed);
        self.clipped_values
            .fetch_add(clipped as u64, Ordering::Relaxed);
        if clipped > 0 {
            self.channels_with_clipping.fetch_add(1, Ordering::Relaxed);
        }
        if clipped > original_len / 2 {
            self.channels_excessive_clipping
                .fetch_add(1, Ordering::Relaxed);
        }
        if outcome.guarded {
            self.channels_guarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn clipped_values(&self) -> u64 {
        self.clipped_values.load(Ordering::Relaxed)
    }

    pub(crate) fn guarded_channels(&self) -> u64 {
        self.channels_guarded.load(Ordering::Relaxed)
    }

    pub(crate) fn log_summary(&self, frame_count: usize) {
        let total = self.total_values.load(Ordering::Relaxed);
        let clipped = self.clipped_values();
        let channels_clipped = self.channels_with_clipping.load(Ordering::Relaxed);
        let excessive = self.channels_excessive_clipping.load(Ordering::Relaxed);
        let guarded = self.guarded_channels();

        if total == 0 {
            return;
        }

        let channel_count = total / frame_count as u64;
        let clip_percent = 100.0 * clipped as f64 / total as f64;
        let channels_clipped_percent = 100.0 * channels_clipped as f64 / channel_count as f64;

        tracing::info!(
            "Sigma clipping stats: {:.2}% of values clipped ({} of {})",
            clip_percent,
            clipped,
            total
        );
        tracing::info!(
            "  Channel samples with any clipping: {:.2}% ({} of {})",
            channels_clipped_percent,
            channels_clipped,
            channel_count
        );

        if excessive > 0 {
            tracing::warn!(
                "  Channel samples with excessive clipping (>50%): {} of {}",
                excessive,
                channel_count
            );
        }

        if guarded > 0 {
            tracing::debug!(
                "  Channel samples where clipping stopped to keep at least one value: {}",
                guarded
            );
        }
    }
}

#[cfg(test)]
mod tests;
