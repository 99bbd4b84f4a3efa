//! Sample statistics: mean, median, population standard deviation.
//!
//! Inputs are `f32` channel values. Sums are accumulated in `f64` to limit
//! rounding error and results are returned as `f64`. Every function returns
//! `None` for an empty sample; callers decide what an empty sample means.

/// Arithmetic mean of `values`.
#[inline]
pub fn mean(values: &[f32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    Some(sum / values.len() as f64)
}

/// Median of `values`, sorting the slice ascending in place.
///
/// Odd counts return the middle element, even counts the average of the two
/// middle elements.
pub fn median_mut(values: &mut [f32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_unstable_by(f32::total_cmp);

    let len = values.len();
    let mid = len / 2;

    if len.is_multiple_of(2) {
        Some((values[mid - 1] as f64 + values[mid] as f64) / 2.0)
    } else {
        Some(values[mid] as f64)
    }
}

/// Median of `values` without reordering them.
pub fn median(values: &[f32]) -> Option<f64> {
    let mut scratch = values.to_vec();
    median_mut(&mut scratch)
}

/// Population standard deviation (squared deviations divided by `N`).
pub fn standard_deviation(values: &[f32]) -> Option<f64> {
    let mean = mean(values)?;

    let sum_squared: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum();

    Some((sum_squared / values.len() as f64).sqrt())
}
