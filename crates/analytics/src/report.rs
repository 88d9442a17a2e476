use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration as StdDuration;

// Helper module for serializing/deserializing Duration
mod duration_serde {
    use super::*;
    use serde::de::Error;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let secs = duration.num_seconds();
        let nanos = duration.subsec_nanos();
        let std_duration = StdDuration::new(secs.max(0) as u64, nanos as u32);
        humantime_serde::serialize(&std_duration, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let std_duration = humantime_serde::deserialize(deserializer)?;
        Duration::from_std(std_duration).map_err(D::Error::custom)
    }
}

/// A comprehensive, standardized report of a strategy's performance.
///
/// This struct is the final output of the `AnalyticsEngine` and serves as the
/// data transfer object for performance results throughout the entire system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Core Profitability Metrics
    pub total_net_profit: Decimal,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    /// `None` when gross loss is zero (profit factor is unbounded).
    pub profit_factor: Option<Decimal>,
    pub expectancy: Decimal,
    pub total_return_pct: Decimal,
    pub annualized_return_pct: Decimal,

    // II. Risk and Drawdown
    pub max_drawdown: Decimal,
    pub max_drawdown_pct: Decimal,
    pub max_drawdown_at: Option<DateTime<Utc>>,
    pub sharpe_ratio: Option<Decimal>,
    pub sortino_ratio: Option<Decimal>,
    pub calmar_ratio: Option<Decimal>,
    pub var_95_pct: Option<Decimal>,
    pub var_99_pct: Option<Decimal>,
    pub cvar_95_pct: Option<Decimal>,

    // III. Trade-Level Statistics
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_pct: Option<Decimal>,
    pub average_win: Decimal,
    pub average_loss: Decimal,
    pub largest_win: Decimal,
    pub largest_loss: Decimal,
    pub payoff_ratio: Option<Decimal>,

    // IV. Time-Based Metrics
    #[serde(with = "duration_serde")]
    pub average_holding_period: Duration,
}

impl PerformanceReport {
    /// Creates a new, zeroed-out PerformanceReport.
    pub fn new() -> Self {
        Self {
            total_net_profit: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            profit_factor: None,
            expectancy: Decimal::ZERO,
            total_return_pct: Decimal::ZERO,
            annualized_return_pct: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            max_drawdown_at: None,
            sharpe_ratio: None,
            sortino_ratio: None,
            calmar_ratio: None,
            var_95_pct: None,
            var_99_pct: None,
            cvar_95_pct: None,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate_pct: None,
            average_win: Decimal::ZERO,
            average_loss: Decimal::ZERO,
            largest_win: Decimal::ZERO,
            largest_loss: Decimal::ZERO,
            payoff_ratio: None,
            average_holding_period: Duration::zero(),
        }
    }
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self::new()
    }
}
