use analytics::PerformanceReport;
use chrono::{DateTime, Utc};
use core_types::{BacktestConfig, EquityCurvePoint, Trade};
use serde::{Deserialize, Serialize};

/// The complete output of one `Engine::run`. Monte-Carlo and walk-forward sub-results are
/// deliberately not embedded here: those crates consume a `BacktestResult` by reference
/// rather than the other way round, keeping this crate's dependency graph acyclic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub config: BacktestConfig,
    pub report: PerformanceReport,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityCurvePoint>,
    pub events_processed: u64,
    pub kill_switch_triggered: bool,
    pub kill_switch_reason: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// A best-effort progress snapshot emitted every `PROGRESS_INTERVAL` processed events.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub events_processed: u64,
    pub total_events: u64,
    pub current_clock: DateTime<Utc>,
    pub trades_executed: usize,
    pub current_equity: rust_decimal::Decimal,
}
