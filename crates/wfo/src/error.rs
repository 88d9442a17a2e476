use thiserror::Error;

#[derive(Error, Debug)]
pub enum WfoError {
    #[error("backtest failed: {0}")]
    Backtest(#[from] backtester::BacktestError),

    #[error("analytics calculation failed: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("invalid window configuration: {0}")]
    InvalidWindows(String),
}
