//! # Strategy Signal Sources
//!
//! Defines the `StrategySignalSource` trait consumed by the backtesting engine and a
//! couple of concrete implementations used by its own test suite.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 logic:** a pure logic crate with no knowledge of execution, risk, or the
//!   event loop. It depends only on `core-types`.
//! - **Engine agnostic:** the engine operates on any `StrategySignalSource` without
//!   knowing its internals.
//! - **Strategy authorship is out of scope here.** This crate carries just enough to
//!   drive the engine's own tests: a no-op default and one reference crossover strategy.

pub mod error;
pub mod ma_crossover;

pub use error::StrategyError;
pub use ma_crossover::MaCrossover;

use core_types::{Bar, Signal};

/// The capability the engine dispatches `MarketData` events through. Strategies keep
/// their own state across calls; the engine treats the source as opaque.
pub trait StrategySignalSource: Send + Sync {
    /// Evaluates the strategy against a new bar.
    ///
    /// Returns `Ok(Some(signal))` when the strategy's conditions are met, `Ok(None)`
    /// when no action should be taken, `Err` on an internal evaluation failure.
    fn on_bar(&mut self, bar: &Bar) -> Result<Option<Signal>, StrategyError>;
}

/// The default "no strategy" source: never emits a signal. Used as the engine's test
/// default and as a building block for scenarios that drive signals in directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSignalSource;

impl StrategySignalSource for NoSignalSource {
    fn on_bar(&mut self, _bar: &Bar) -> Result<Option<Signal>, StrategyError> {
        Ok(None)
    }
}
