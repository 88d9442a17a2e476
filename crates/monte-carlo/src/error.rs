use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonteCarloError {
    #[error("need at least one trade return to simulate")]
    NoTrades,

    #[error("iterations must be greater than zero")]
    InvalidIterations,

    #[error("ruin threshold must be in (0, 1], got {0}")]
    InvalidRuinThreshold(Decimal),
}
