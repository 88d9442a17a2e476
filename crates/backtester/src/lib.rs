//! # Backtester
//!
//! The event-driven simulation core: owns the `EventQueue`, materialises historical
//! bars through a `DataLoader`, and dispatches `MarketData`/`Signal`/`Order`/`Fill`/
//! `Risk`/`KillSwitch` events against the `execution` and `risk` components to produce
//! a `BacktestResult`.
//!
//! Deliberately does not depend on `configuration`: the `Engine` takes a plain
//! `core_types::BacktestConfig`, leaving config-file parsing to callers.

pub mod engine;
pub mod error;
pub mod result;

pub use engine::{CancelHandle, Engine, EngineState, StateHandle};
pub use error::BacktestError;
pub use result::{BacktestResult, Progress};
