//! # Risk
//!
//! Pure position-sizing and risk-gating logic: no I/O, no dependency on `configuration`
//! or the event types, so it can be unit tested in complete isolation from the engine
//! that drives it.
//!
//! ## Public API
//!
//! - `sizing`: fixed-fractional, Kelly, and volatility-targeted sizing functions.
//! - `manager`: the `RiskManager` trait, `SimpleRiskManager`, and the kill-switch state
//!   machine it implements.
//! - `RiskError`: the specific error types returned from this crate.

pub mod error;
pub mod manager;
pub mod sizing;

pub use error::RiskError;
pub use manager::{KillSwitchReason, PortfolioSnapshot, RiskManager, SimpleRiskManager};
