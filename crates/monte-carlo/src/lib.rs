//! # Monte-Carlo Simulator
//!
//! Two distinct resampling modes over trade-level returns: path simulation (shuffle
//! without replacement, walk the shuffled sequence to estimate the distribution of final
//! equity and probability of ruin) and confidence-interval estimation (sample with
//! replacement to bound a metric's mean). Both are layer-2 consumers of nothing but
//! `core_types::MonteCarloConfig` — no dependency on `backtester` or `analytics`, so
//! callers pass in a plain `Vec<Decimal>` of per-trade returns extracted from whichever
//! `BacktestResult` they're evaluating.
//!
//! Every RNG draw goes through a seeded `StdRng`; nothing here touches the thread-local
//! RNG, so a given seed reproduces bit-identical output across runs and across worker
//! threads when `parallel` is set.

pub mod bootstrap;
pub mod error;
pub mod result;
pub mod simulate;
mod stats;

pub use bootstrap::bootstrap_confidence_interval;
pub use error::MonteCarloError;
pub use result::{BootstrapResult, MonteCarloResult};
pub use simulate::simulate_paths;
