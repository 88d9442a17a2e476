use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Output of `simulate_paths`: the empirical distribution of final equity across
/// shuffled replays of a trade sequence, starting from a normalised equity of 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub iterations: u32,
    pub median_return: Decimal,
    pub p5_return: Decimal,
    pub p95_return: Decimal,
    pub p95_max_drawdown: Decimal,
    pub probability_of_ruin: Decimal,
}

/// Output of `bootstrap_confidence_interval`: a resampled-mean confidence band around a
/// metric computed from a sample of observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapResult {
    pub iterations: u32,
    pub mean: Decimal,
    pub lower_bound: Decimal,
    pub upper_bound: Decimal,
    pub confidence_level: Decimal,
}
