//! # Analytics
//!
//! Quantitative analysis of a completed backtest: profitability, drawdown, risk-adjusted
//! ratios, and tail-risk measures computed from the trade log and equity curve.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 logic:** a pure logic crate depending only on `core-types` (Layer 0).
//! - **Stateless calculation:** `AnalyticsEngine` takes raw trading data as input and
//!   produces a `PerformanceReport` as output, making it trivially testable.
//! - **Float boundary:** Sharpe/Sortino/VaR/CVaR cross into `f64` only inside `stats`,
//!   and convert back to `Decimal` before the result leaves that module.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the main struct that contains the calculation logic.
//! - `PerformanceReport`: the standardized struct that holds the performance metrics.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::PerformanceReport;
