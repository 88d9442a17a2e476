//! Scenario 5: Monte-Carlo path simulation over a fixed, small trade-return set is
//! fully deterministic under a fixed seed, and its percentile spread is strictly
//! ordered.

use core_types::MonteCarloConfig;
use monte_carlo::simulate_paths;
use rust_decimal_macros::dec;

fn config() -> MonteCarloConfig {
    MonteCarloConfig {
        enabled: true,
        iterations: 1000,
        confidence_level: dec!(0.95),
        seed: Some(42),
    }
}

#[test]
fn scenario_5_repeated_runs_with_fixed_seed_are_identical_and_strictly_ordered() {
    let returns = vec![dec!(0.10), dec!(0.10), dec!(-0.05), dec!(0.20), dec!(-0.15), dec!(0.05)];

    let first = simulate_paths(&returns, &config(), dec!(0.5), false).unwrap();
    let second = simulate_paths(&returns, &config(), dec!(0.5), false).unwrap();

    assert_eq!(first.median_return, second.median_return);
    assert_eq!(first.p5_return, second.p5_return);
    assert_eq!(first.p95_return, second.p95_return);
    assert_eq!(first.probability_of_ruin, second.probability_of_ruin);

    assert!(first.p5_return < first.median_return);
    assert!(first.median_return < first.p95_return);
}
