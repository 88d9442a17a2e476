//! Float-boundary statistics. Per-period equity returns enter as `Decimal` and are
//! converted to `f64` only inside these functions; every result is converted back to
//! `Decimal` before it leaves. Nothing here ever returns a float to a caller.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

fn to_f64(values: &[Decimal]) -> Vec<f64> {
    values.iter().map(|d| d.to_f64().unwrap_or(0.0)).collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (denominator `n-1`); 0.0 for fewer than 2 points.
pub fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Standard deviation over the subset of `values` that are negative, same `n-1` convention.
pub fn downside_stdev(values: &[f64]) -> f64 {
    let downside: Vec<f64> = values.iter().copied().filter(|v| *v < 0.0).collect();
    sample_stdev(&downside)
}

/// Linear-interpolated percentile of `values` at `p` in `[0, 1]`. `values` need not be
/// pre-sorted; this function sorts its own copy.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Mean of the values at or below the `p`-th percentile (the tail average behind CVaR).
pub fn tail_mean(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let cutoff = percentile(&sorted, p);
    let tail: Vec<f64> = sorted.iter().copied().filter(|v| *v <= cutoff).collect();
    if tail.is_empty() {
        sorted[0]
    } else {
        mean(&tail)
    }
}

/// Per-period simple returns from a level series, e.g. an equity curve.
pub fn period_returns(levels: &[Decimal]) -> Vec<Decimal> {
    levels
        .windows(2)
        .filter_map(|w| {
            if w[0].is_zero() {
                None
            } else {
                Some((w[1] - w[0]) / w[0])
            }
        })
        .collect()
}

pub fn period_returns_f64(levels: &[Decimal]) -> Vec<f64> {
    to_f64(&period_returns(levels))
}

fn from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

pub fn decimal(value: f64) -> Decimal {
    from_f64(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&values, 0.5) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn downside_stdev_ignores_positive_returns() {
        let values = vec![0.1, -0.2, 0.05, -0.1];
        let all = sample_stdev(&values);
        let down = downside_stdev(&values);
        assert!(down < all);
    }

    #[test]
    fn tail_mean_is_negative_for_loss_heavy_series() {
        let values = vec![-0.1, -0.08, -0.01, 0.02, 0.03, 0.04, 0.05, 0.06, 0.07, 0.08];
        let tail = tail_mean(&values, 0.1);
        assert!(tail < 0.0);
    }
}
