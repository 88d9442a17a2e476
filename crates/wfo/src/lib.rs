//! # Walk-Forward Analyser
//!
//! Partitions a date range into `N` in-sample/out-of-sample windows (anchored or
//! rolling, per `core_types::WalkForwardConfig`), runs the full `backtester::Engine`
//! over each half, and aggregates out-of-sample degradation relative to in-sample
//! performance.
//!
//! Grid/random search over strategy parameters is out of scope (a non-goal shared with
//! the rest of the simulation core); the parameter-selection step between the in-sample
//! and out-of-sample runs is an injected `ParameterSearch` capability instead, with a
//! trivial identity implementation as the default.

pub mod error;

use backtester::Engine;
use chrono::{DateTime, Duration, Utc};
use core_types::{BacktestConfig, WalkForwardConfig};
use data_loader::DataLoader;
use error::WfoError;
use execution::slippage::SlippageModel;
use risk::RiskManager;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use strategies::StrategySignalSource;

/// The tunable strategy parameters a `ParameterSearch` selects between windows. Kept
/// local to this crate (rather than reusing `configuration::MaCrossoverParams`) so a
/// layer-3 crate doesn't reach back down to a layer-1 one just for a parameter struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub trend_filter_period: usize,
}

/// Chooses the strategy parameters to carry into a window's out-of-sample run, given
/// that window's in-sample result. A grid/random search over parameter space would
/// implement this; the non-goal around ML/grid optimisation means only the identity
/// default ships here.
pub trait ParameterSearch: Send + Sync {
    fn select(&self, in_sample_result: &backtester::BacktestResult) -> StrategyParams;
}

/// Keeps the configured strategy unchanged between the in-sample and out-of-sample
/// runs of a window. The default, and what this crate's own tests exercise.
pub struct IdentitySearch {
    pub params: StrategyParams,
}

impl ParameterSearch for IdentitySearch {
    fn select(&self, _in_sample_result: &backtester::BacktestResult) -> StrategyParams {
        self.params
    }
}

/// One window's in-sample/out-of-sample date split.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub is_start: DateTime<Utc>,
    pub is_end: DateTime<Utc>,
    pub oos_start: DateTime<Utc>,
    pub oos_end: DateTime<Utc>,
}

/// The in-sample/out-of-sample outcome of a single window.
#[derive(Debug, Clone)]
pub struct WindowResult {
    pub window: Window,
    pub in_sample_return_pct: Decimal,
    pub in_sample_sharpe: Option<Decimal>,
    pub out_sample_return_pct: Decimal,
    pub out_sample_sharpe: Option<Decimal>,
}

/// The aggregate outcome of a complete walk-forward run across every window.
#[derive(Debug, Clone)]
pub struct WalkForwardResult {
    pub windows: Vec<WindowResult>,
    pub fraction_positive_out_sample: Decimal,
    pub average_out_sample_sharpe: Decimal,
    pub degradation_ratio: Decimal,
}

/// Everything the analyser needs to construct a fresh `Engine` for one half of one
/// window. Each call must hand back brand-new component instances: `Engine` consumes
/// them by value and none of the trait objects involved are `Clone`.
pub trait EngineComponents {
    fn strategy(&self, params: StrategyParams) -> Box<dyn StrategySignalSource>;
    fn risk_manager(&self) -> Box<dyn RiskManager>;
    fn slippage_model(&self) -> Box<dyn SlippageModel>;
}

/// Orchestrates windowing and the IS/OOS backtest pair per window.
pub struct WalkForwardAnalyser {
    config: WalkForwardConfig,
}

impl WalkForwardAnalyser {
    pub fn new(config: WalkForwardConfig) -> Self {
        Self { config }
    }

    /// Splits `[start, end]` into `config.windows` equal-length segments, each further
    /// split into an in-sample prefix (`config.in_sample_fraction` of the segment) and
    /// an out-of-sample suffix. `anchored` keeps every window's in-sample start pinned
    /// to the overall `start`; `rolling` slides it forward with the segment.
    pub fn generate_windows(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Window>, WfoError> {
        if self.config.windows == 0 {
            return Err(WfoError::InvalidWindows("windows must be greater than zero".to_string()));
        }
        if start >= end {
            return Err(WfoError::InvalidWindows(format!("start {} is not before end {}", start, end)));
        }

        let total = end - start;
        let segment = total / self.config.windows as i32;
        if segment <= Duration::zero() {
            return Err(WfoError::InvalidWindows(
                "date range is too short for the requested number of windows".to_string(),
            ));
        }

        let mut windows = Vec::with_capacity(self.config.windows as usize);
        for i in 0..self.config.windows {
            let segment_start = start + segment * i as i32;
            let segment_end = if i == self.config.windows - 1 {
                end
            } else {
                start + segment * (i as i32 + 1)
            };

            let is_len = scale_duration(segment_end - segment_start, self.config.in_sample_fraction);
            let is_start = if self.config.anchored { start } else { segment_start };
            let is_end = segment_start + is_len;

            windows.push(Window {
                is_start,
                is_end,
                oos_start: is_end,
                oos_end: segment_end,
            });
        }

        Ok(windows)
    }

    /// Runs the full walk-forward analysis: for each window, an in-sample backtest
    /// selects parameters via `search`, then an out-of-sample backtest with those
    /// parameters produces the window's out-of-sample metrics.
    pub fn run(
        &self,
        base_config: &BacktestConfig,
        data_loader: &dyn DataLoader,
        components: &dyn EngineComponents,
        search: &dyn ParameterSearch,
        default_params: StrategyParams,
    ) -> Result<WalkForwardResult, WfoError> {
        let windows = self.generate_windows(base_config.start_date, base_config.end_date)?;
        let mut window_results = Vec::with_capacity(windows.len());

        for window in windows {
            let is_config = BacktestConfig {
                start_date: window.is_start,
                end_date: window.is_end,
                ..base_config.clone()
            };
            let mut is_engine = Engine::new(
                is_config,
                data_loader,
                components.strategy(default_params),
                components.risk_manager(),
                components.slippage_model(),
            )?;
            let is_result = is_engine.run()?;

            let selected_params = search.select(&is_result);

            let oos_config = BacktestConfig {
                start_date: window.oos_start,
                end_date: window.oos_end,
                ..base_config.clone()
            };
            let mut oos_engine = Engine::new(
                oos_config,
                data_loader,
                components.strategy(selected_params),
                components.risk_manager(),
                components.slippage_model(),
            )?;
            let oos_result = oos_engine.run()?;

            window_results.push(WindowResult {
                window,
                in_sample_return_pct: is_result.report.total_return_pct,
                in_sample_sharpe: is_result.report.sharpe_ratio,
                out_sample_return_pct: oos_result.report.total_return_pct,
                out_sample_sharpe: oos_result.report.sharpe_ratio,
            });
        }

        Ok(aggregate(window_results))
    }
}

fn scale_duration(duration: Duration, fraction: Decimal) -> Duration {
    let seconds = Decimal::from(duration.num_seconds());
    let scaled = (seconds * fraction).round().to_i64().unwrap_or(0);
    Duration::seconds(scaled)
}

fn aggregate(windows: Vec<WindowResult>) -> WalkForwardResult {
    if windows.is_empty() {
        return WalkForwardResult {
            windows,
            fraction_positive_out_sample: Decimal::ZERO,
            average_out_sample_sharpe: Decimal::ZERO,
            degradation_ratio: Decimal::ZERO,
        };
    }

    let n = Decimal::from(windows.len() as u64);
    let positive_count = windows
        .iter()
        .filter(|w| w.out_sample_return_pct > Decimal::ZERO)
        .count();
    let fraction_positive_out_sample = Decimal::from(positive_count as u64) / n;

    let sharpe_values: Vec<Decimal> = windows.iter().filter_map(|w| w.out_sample_sharpe).collect();
    let average_out_sample_sharpe = if sharpe_values.is_empty() {
        Decimal::ZERO
    } else {
        sharpe_values.iter().sum::<Decimal>() / Decimal::from(sharpe_values.len() as u64)
    };

    let in_sample_avg = windows.iter().map(|w| w.in_sample_return_pct).sum::<Decimal>() / n;
    let out_sample_avg = windows.iter().map(|w| w.out_sample_return_pct).sum::<Decimal>() / n;
    let degradation_ratio = if in_sample_avg.is_zero() {
        Decimal::ZERO
    } else {
        (in_sample_avg - out_sample_avg) / in_sample_avg
    };

    WalkForwardResult {
        windows,
        fraction_positive_out_sample,
        average_out_sample_sharpe,
        degradation_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config(windows: u32, fraction: Decimal, anchored: bool) -> WalkForwardConfig {
        WalkForwardConfig {
            enabled: true,
            windows,
            in_sample_fraction: fraction,
            anchored,
        }
    }

    fn days(n: i64) -> Duration {
        Duration::days(n)
    }

    #[test]
    fn rolling_windows_advance_is_start_each_segment() {
        let analyser = WalkForwardAnalyser::new(config(4, dec!(0.7), false));
        let start = Utc::now();
        let end = start + days(40);
        let windows = analyser.generate_windows(start, end).unwrap();

        assert_eq!(windows.len(), 4);
        assert_eq!(windows[0].is_start, start);
        assert!(windows[1].is_start > windows[0].is_start);
        assert_eq!(windows.last().unwrap().oos_end, end);
    }

    #[test]
    fn anchored_windows_keep_is_start_fixed() {
        let analyser = WalkForwardAnalyser::new(config(3, dec!(0.6), true));
        let start = Utc::now();
        let end = start + days(30);
        let windows = analyser.generate_windows(start, end).unwrap();

        assert!(windows.iter().all(|w| w.is_start == start));
        assert!(windows[1].is_end > windows[0].is_end);
    }

    #[test]
    fn each_window_splits_in_sample_before_out_of_sample() {
        let analyser = WalkForwardAnalyser::new(config(2, dec!(0.5), false));
        let start = Utc::now();
        let end = start + days(20);
        let windows = analyser.generate_windows(start, end).unwrap();

        for w in &windows {
            assert!(w.is_start <= w.is_end);
            assert_eq!(w.oos_start, w.is_end);
            assert!(w.oos_start <= w.oos_end);
        }
    }

    #[test]
    fn zero_windows_is_rejected() {
        let analyser = WalkForwardAnalyser::new(config(0, dec!(0.7), true));
        let start = Utc::now();
        let result = analyser.generate_windows(start, start + days(10));
        assert!(matches!(result, Err(WfoError::InvalidWindows(_))));
    }

    #[test]
    fn aggregate_of_no_windows_is_zeroed() {
        let result = aggregate(Vec::new());
        assert_eq!(result.fraction_positive_out_sample, Decimal::ZERO);
        assert_eq!(result.degradation_ratio, Decimal::ZERO);
    }

    #[test]
    fn aggregate_computes_fraction_positive_and_degradation() {
        let window = Window {
            is_start: Utc::now(),
            is_end: Utc::now(),
            oos_start: Utc::now(),
            oos_end: Utc::now(),
        };
        let windows = vec![
            WindowResult {
                window,
                in_sample_return_pct: dec!(10),
                in_sample_sharpe: Some(dec!(1.5)),
                out_sample_return_pct: dec!(5),
                out_sample_sharpe: Some(dec!(0.8)),
            },
            WindowResult {
                window,
                in_sample_return_pct: dec!(10),
                in_sample_sharpe: Some(dec!(1.2)),
                out_sample_return_pct: dec!(-2),
                out_sample_sharpe: Some(dec!(-0.3)),
            },
        ];

        let result = aggregate(windows);
        assert_eq!(result.fraction_positive_out_sample, dec!(0.5));
        assert_eq!(result.average_out_sample_sharpe, dec!(0.25));
        assert!(result.degradation_ratio > Decimal::ZERO);
    }
}
