//! Tests for sigma clipping policies.

use super::*;
use crate::math::statistics::mean;

fn iterations(count: u32) -> ClipPolicy {
    ClipPolicy::Iterations(NonZeroU32::new(count).unwrap())
}

/// 0, 1, ..., 10. Exact in f32 and f64, so every bound below is exact too.
fn integer_ramp() -> Vec<f32> {
    (0..=10).map(|v| v as f32).collect()
}

// ========== Policy construction ==========

#[test]
fn test_iterations_rejects_non_positive() {
    assert!(matches!(
        ClipPolicy::iterations(0),
        Err(Error::InvalidIterations(0))
    ));
    assert!(matches!(
        ClipPolicy::iterations(-3),
        Err(Error::InvalidIterations(-3))
    ));
    assert_eq!(ClipPolicy::iterations(4).unwrap(), iterations(4));
}

#[test]
fn test_tolerance_rejects_non_positive() {
    assert!(matches!(
        ClipPolicy::tolerance(0.0),
        Err(Error::InvalidTolerance(_))
    ));
    assert!(matches!(
        ClipPolicy::tolerance(-0.1),
        Err(Error::InvalidTolerance(_))
    ));
    assert!(ClipPolicy::tolerance(f32::NAN).is_err());
    assert!(ClipPolicy::tolerance(f32::INFINITY).is_err());
    assert_eq!(
        ClipPolicy::tolerance(0.25).unwrap(),
        ClipPolicy::Tolerance(0.25)
    );
}

#[test]
fn test_validate_catches_hand_built_tolerance() {
    assert!(ClipPolicy::Tolerance(-1.0).validate().is_err());
    assert!(ClipPolicy::Tolerance(1.0).validate().is_ok());
    assert!(iterations(1).validate().is_ok());
}

// ========== Single pass ==========

#[test]
fn test_clip_pass_keeps_values_on_bounds() {
    let mut values = vec![1.0, 2.0, 3.0, 4.0];
    let pass = clip_pass(&mut values, 2.5, 0.5);
    assert_eq!(pass, Pass::Applied { removed: 2 });
    assert_eq!(values, vec![2.0, 3.0]);
}

#[test]
fn test_clip_pass_rejects_emptying_pass() {
    let mut values = vec![1.0, 2.0];
    let pass = clip_pass(&mut values, 10.0, 0.5);
    assert_eq!(pass, Pass::Rejected);
    assert_eq!(values, vec![1.0, 2.0]);
}

#[test]
fn test_clip_pass_zero_deviation_keeps_center_values() {
    let mut values = vec![0.5, 0.5, 0.7];
    let pass = clip_pass(&mut values, 0.5, 0.0);
    assert_eq!(pass, Pass::Applied { removed: 1 });
    assert_eq!(values, vec![0.5, 0.5]);
}

// ========== Iteration policy ==========

#[test]
fn test_iterations_removes_strong_outlier() {
    let mut values = vec![0.50, 0.51, 0.49, 0.50, 0.52, 0.48, 1.0];
    let unclipped = mean(&values).unwrap();

    let outcome = iterations(1).clip(&mut values);
    let clipped = mean(&values).unwrap();

    assert_eq!(outcome.passes, 1);
    assert_eq!(values.len(), 6);
    assert!(!values.contains(&1.0));
    assert!((clipped - 0.5).abs() < 1e-6, "Expected ~0.5, got {}", clipped);
    assert!((clipped - 0.5).abs() < (unclipped - 0.5).abs());
}

#[test]
fn test_iterations_run_exact_count() {
    let mut values = integer_ramp();
    iterations(1).clip(&mut values);
    assert_eq!(values, vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);

    let mut values = integer_ramp();
    iterations(2).clip(&mut values);
    assert_eq!(values, vec![3.0, 4.0, 5.0, 6.0, 7.0]);

    let mut values = integer_ramp();
    let outcome = iterations(3).clip(&mut values);
    assert_eq!(values, vec![4.0, 5.0, 6.0]);
    assert_eq!(outcome.passes, 3);
}

#[test]
fn test_iterations_continue_without_progress() {
    let mut values = vec![0.3f32; 5];
    let outcome = iterations(7).clip(&mut values);

    // Zero deviation keeps every value, yet all passes still run.
    assert_eq!(outcome.passes, 7);
    assert!(!outcome.guarded);
    assert_eq!(values.len(), 5);
}

#[test]
fn test_iterations_single_value() {
    let mut values = vec![0.42f32];
    let outcome = iterations(3).clip(&mut values);
    assert_eq!(values, vec![0.42]);
    assert_eq!(outcome.passes, 3);
}

#[test]
fn test_iterations_nan_sample_is_guarded() {
    let mut values = vec![0.1, f32::NAN, 0.3];
    let outcome = iterations(2).clip(&mut values);
    assert!(outcome.guarded);
    assert_eq!(values.len(), 3);
}

// ========== Tolerance policy ==========

#[test]
fn test_tolerance_reached_after_first_pass() {
    let mut values = integer_ramp();
    // First pass: sd sqrt(10) -> 2, level 0.58.
    let outcome = ClipPolicy::Tolerance(0.5).clip(&mut values);
    assert_eq!(outcome.passes, 1);
    assert_eq!(values.len(), 7);
}

#[test]
fn test_tolerance_loops_until_reached() {
    let mut values = integer_ramp();
    // Second pass uses the previous sd of 2: bounds [3, 7], level 1.24.
    let outcome = ClipPolicy::Tolerance(0.9).clip(&mut values);
    assert_eq!(outcome.passes, 2);
    assert_eq!(values, vec![3.0, 4.0, 5.0, 6.0, 7.0]);
    assert_eq!(mean(&values), Some(5.0));
}

#[test]
fn test_tolerance_stops_when_deviation_collapses() {
    let mut values = vec![0.5, 0.5, 0.5, 0.5, 0.9];
    let outcome = ClipPolicy::Tolerance(1.0).clip(&mut values);

    assert_eq!(outcome.passes, 1);
    assert_eq!(values, vec![0.5, 0.5, 0.5, 0.5]);
}

#[test]
fn test_tolerance_identical_values_terminate() {
    let mut values = vec![0.7f32; 9];
    let outcome = ClipPolicy::Tolerance(1.0).clip(&mut values);
    assert_eq!(outcome.passes, 1);
    assert_eq!(values.len(), 9);
}

#[test]
fn test_tolerance_stops_when_size_stops_changing() {
    // First pass removes 0.0 and 1.0 and leaves a sample whose values all sit
    // exactly on median +- sd, so the next pass removes nothing.
    let mut values = vec![0.0, 0.25, 0.25, 0.75, 0.75, 1.0];
    let outcome = ClipPolicy::Tolerance(0.9).clip(&mut values);

    assert_eq!(outcome.passes, 2);
    assert!(!outcome.guarded);
    assert_eq!(values, vec![0.25, 0.25, 0.75, 0.75]);
}

#[test]
fn test_tolerance_single_value() {
    let mut values = vec![0.1f32];
    let outcome = ClipPolicy::Tolerance(0.5).clip(&mut values);
    assert_eq!(values, vec![0.1]);
    assert_eq!(outcome.passes, 1);
}

#[test]
fn test_tolerance_empty_sample_is_noop() {
    let mut values: Vec<f32> = vec![];
    let outcome = ClipPolicy::Tolerance(0.5).clip(&mut values);
    assert_eq!(outcome, ClipOutcome::default());
}

// ========== Shared guarantees ==========

#[test]
fn test_clipping_never_empties_sample() {
    let samples: Vec<Vec<f32>> = vec![
        vec![0.0, 1.0],
        vec![0.1, 0.9, 0.5, 0.5],
        vec![0.0, 0.0, 0.0, 1.0],
        vec![1.0, 0.0, 0.33, 0.66, 0.99, 0.01],
        (0..64).map(|i| ((i * 37) % 64) as f32 / 63.0).collect(),
        (0..50).map(|i| if i % 10 == 0 { 1.0 } else { 0.2 }).collect(),
    ];

    for policy in [iterations(1), iterations(25), ClipPolicy::Tolerance(0.01), ClipPolicy::Tolerance(1.0)] {
        for sample in &samples {
            let mut values = sample.clone();
            policy.clip(&mut values);
            assert!(
                !values.is_empty(),
                "{:?} emptied sample {:?}",
                policy,
                sample
            );
        }
    }
}

// ========== Stats ==========

#[test]
fn test_clip_stats_record() {
    let stats = ClipStats::default();
    stats.record(10, 10, ClipOutcome::default());
    stats.record(10, 7, ClipOutcome::default());
    stats.record(10, 2, ClipOutcome { passes: 1, guarded: true });

    assert_eq!(stats.clipped_values(), 11);
    assert_eq!(stats.guarded_channels(), 1);
    assert_eq!(stats.channels_with_clipping.load(Ordering::Relaxed), 2);
    assert_eq!(stats.channels_excessive_clipping.load(Ordering::Relaxed), 1);

    // Smoke test: summary only logs.
    stats.log_summary(10);
}

#[test]
fn test_clip_stats_empty_summary() {
    ClipStats::default().log_summary(3);
}
