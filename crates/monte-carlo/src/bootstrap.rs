use crate::error::MonteCarloError;
use crate::result::BootstrapResult;
use crate::stats::percentile;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Resamples `samples` with replacement `iterations` times, computing the mean of each
/// resample, and derives a `confidence_level` interval around the resampled mean
/// distribution. Distinct from `simulate_paths`: this bootstraps a point estimate's
/// sampling distribution rather than replaying an ordered sequence of trades.
pub fn bootstrap_confidence_interval(
    samples: &[Decimal],
    iterations: u32,
    confidence_level: Decimal,
    seed: u64,
) -> Result<BootstrapResult, MonteCarloError> {
    if samples.is_empty() {
        return Err(MonteCarloError::NoTrades);
    }
    if iterations == 0 {
        return Err(MonteCarloError::InvalidIterations);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut resample_means = Vec::with_capacity(iterations as usize);

    for _ in 0..iterations {
        let mut sum = Decimal::ZERO;
        for _ in 0..samples.len() {
            let idx = rng.gen_range(0..samples.len());
            sum += samples[idx];
        }
        resample_means.push(sum / Decimal::from(samples.len()));
    }
    resample_means.sort();

    let confidence_level = confidence_level.max(Decimal::ZERO).min(Decimal::ONE);
    let alpha = (Decimal::ONE - confidence_level) / Decimal::from(2);
    let lower_bound = percentile(&resample_means, alpha);
    let upper_bound = percentile(&resample_means, Decimal::ONE - alpha);
    let mean = resample_means.iter().sum::<Decimal>() / Decimal::from(resample_means.len());

    Ok(BootstrapResult {
        iterations,
        mean,
        lower_bound,
        upper_bound,
        confidence_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn confident_interval_brackets_the_mean() {
        let samples = vec![dec!(10), dec!(12), dec!(9), dec!(11), dec!(50), dec!(8)];
        let result = bootstrap_confidence_interval(&samples, 2000, dec!(0.95), 7).unwrap();
        assert!(result.lower_bound <= result.mean);
        assert!(result.mean <= result.upper_bound);
    }

    #[test]
    fn same_seed_is_reproducible() {
        let samples = vec![dec!(1), dec!(2), dec!(3)];
        let a = bootstrap_confidence_interval(&samples, 500, dec!(0.9), 99).unwrap();
        let b = bootstrap_confidence_interval(&samples, 500, dec!(0.9), 99).unwrap();
        assert_eq!(a.mean, b.mean);
        assert_eq!(a.lower_bound, b.lower_bound);
        assert_eq!(a.upper_bound, b.upper_bound);
    }

    #[test]
    fn constant_sample_collapses_interval_to_the_constant() {
        let samples = vec![dec!(5), dec!(5), dec!(5), dec!(5)];
        let result = bootstrap_confidence_interval(&samples, 300, dec!(0.95), 3).unwrap();
        assert_eq!(result.mean, dec!(5));
        assert_eq!(result.lower_bound, dec!(5));
        assert_eq!(result.upper_bound, dec!(5));
    }
}
