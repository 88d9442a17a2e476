use crate::error::MonteCarloError;
use crate::result::MonteCarloResult;
use crate::stats::percentile;
use core_types::MonteCarloConfig;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::{SystemTime, UNIX_EPOCH};

struct PathOutcome {
    final_return: Decimal,
    max_drawdown: Decimal,
    ruined: bool,
}

/// Replays `trade_returns` (fractional per-trade returns, e.g. `0.02` for +2%)
/// `config.iterations` times, shuffling without replacement each pass and walking the
/// shuffled sequence against a normalised starting equity of 1.0. A path is marked
/// "ruin" the moment its equity touches `ruin_threshold` (e.g. `0.5` for a 50% drawdown
/// from the starting equity).
///
/// `parallel` dispatches the independent paths across a `rayon` thread pool; each path
/// still draws from its own `StdRng::seed_from_u64(base_seed + path_index)`, so the
/// result is identical whether or not `parallel` is set.
pub fn simulate_paths(
    trade_returns: &[Decimal],
    config: &MonteCarloConfig,
    ruin_threshold: Decimal,
    parallel: bool,
) -> Result<MonteCarloResult, MonteCarloError> {
    if trade_returns.is_empty() {
        return Err(MonteCarloError::NoTrades);
    }
    if config.iterations == 0 {
        return Err(MonteCarloError::InvalidIterations);
    }
    if ruin_threshold <= Decimal::ZERO || ruin_threshold > Decimal::ONE {
        return Err(MonteCarloError::InvalidRuinThreshold(ruin_threshold));
    }

    let seed = config.seed.unwrap_or_else(default_seed);
    let iterations = config.iterations;

    let outcomes: Vec<PathOutcome> = if parallel {
        (0..iterations)
            .into_par_iter()
            .map(|i| run_path(trade_returns, seed.wrapping_add(i as u64), ruin_threshold))
            .collect()
    } else {
        (0..iterations)
            .map(|i| run_path(trade_returns, seed.wrapping_add(i as u64), ruin_threshold))
            .collect()
    };

    let mut final_returns: Vec<Decimal> = outcomes.iter().map(|o| o.final_return).collect();
    let mut max_drawdowns: Vec<Decimal> = outcomes.iter().map(|o| o.max_drawdown).collect();
    final_returns.sort();
    max_drawdowns.sort();

    let ruin_count = outcomes.iter().filter(|o| o.ruined).count();
    let probability_of_ruin = Decimal::from(ruin_count as u64) / Decimal::from(iterations);

    Ok(MonteCarloResult {
        iterations,
        median_return: percentile(&final_returns, dec!(0.50)),
        p5_return: percentile(&final_returns, dec!(0.05)),
        p95_return: percentile(&final_returns, dec!(0.95)),
        p95_max_drawdown: percentile(&max_drawdowns, dec!(0.95)),
        probability_of_ruin,
    })
}

fn run_path(trade_returns: &[Decimal], seed: u64, ruin_threshold: Decimal) -> PathOutcome {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut shuffled = trade_returns.to_vec();
    shuffled.shuffle(&mut rng);

    let mut equity = Decimal::ONE;
    let mut peak = Decimal::ONE;
    let mut max_drawdown = Decimal::ZERO;
    let mut ruined = false;

    for r in &shuffled {
        equity *= Decimal::ONE + r;
        if equity > peak {
            peak = equity;
        }
        if !peak.is_zero() {
            let drawdown = (peak - equity) / peak;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }
        if equity <= ruin_threshold {
            ruined = true;
        }
    }

    PathOutcome {
        final_return: equity - Decimal::ONE,
        max_drawdown,
        ruined,
    }
}

fn default_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
