use core_types::BacktestConfig;
use rust_decimal::Decimal;
use serde::Deserialize;

/// The root configuration structure for a backtest run, loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub backtest: BacktestConfig,
    pub risk_management: RiskManagement,
    pub strategy: MaCrossoverParams,
}

/// Contains parameters for trade-level risk management consumed by `risk::SimpleRiskManager`.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskManagement {
    /// The fraction of total portfolio equity to risk on a single trade (e.g., 0.01 for 1%).
    pub risk_per_trade_pct: Decimal,
    /// The percentage distance from the entry price to set the stop-loss for position sizing.
    pub stop_loss_pct: Decimal,
}

/// Parameters for the moving-average crossover signal source.
#[derive(Debug, Deserialize, Clone)]
pub struct MaCrossoverParams {
    pub fast_period: usize,
    pub slow_period: usize,
    /// A long-term MA to act as a trend filter; `None` disables the filter.
    pub trend_filter_period: Option<usize>,
}
