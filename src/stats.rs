//! Descriptive statistics shared by every analysis view.
//!
//! All functions are pure and total: degenerate input (empty series, zero
//! variance) yields `0.0` instead of an error.

use std::collections::HashMap;

/// Grade at or above which a score counts as passing (20-point scale).
pub const PASS_THRESHOLD: f64 = 10.0;

/// Arithmetic mean. Returns 0.0 for empty input.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentage of values `>= threshold`. Returns 0.0 for empty input.
pub fn pass_percentage(values: &[f64], threshold: f64) -> f64 {
    pct(count_at_least(values, threshold), values.len())
}

/// Population standard deviation (divides by N). Returns 0.0 for empty input.
pub fn standard_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = average(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Most frequent value.
///
/// Ties go to the value that first reached the winning frequency while
/// scanning left to right, not to the smaller value. Returns 0.0 for empty
/// input.
pub fn mode(values: &[f64]) -> f64 {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    let mut best = 0.0;
    let mut best_count = 0;

    for &v in values {
        // fold -0.0 into 0.0 so both count as one value
        let v = if v == 0.0 { 0.0 } else { v };
        let count = counts.entry(v.to_bits()).or_insert(0);
        *count += 1;
        if *count > best_count {
            best_count = *count;
            best = v;
        }
    }

    best
}

/// Standard deviation as a percentage of the mean.
///
/// Defined as 0.0 when the mean is zero, which also masks a nonzero
/// deviation around a zero mean.
pub fn coefficient_of_variation(avg: f64, std_dev: f64) -> f64 {
    if avg == 0.0 {
        return 0.0;
    }
    std_dev / avg * 100.0
}

/// Pearson correlation over index-aligned pairs.
///
/// Callers pass only pairs where both values are present. Returns 0.0 when
/// the lengths differ, the input is empty, or either series has zero
/// variance.
pub fn correlation(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() || xs.len() != ys.len() {
        return 0.0;
    }

    let mean_x = average(xs);
    let mean_y = average(ys);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }

    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

pub fn count_at_least(values: &[f64], threshold: f64) -> usize {
    values.iter().filter(|v| **v >= threshold).count()
}

pub fn count_below(values: &[f64], threshold: f64) -> usize {
    values.iter().filter(|v| **v < threshold).count()
}

/// Smallest value, 0.0 for empty input.
pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

/// Largest value, 0.0 for empty input.
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Rounds to two decimals, the precision reports display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
