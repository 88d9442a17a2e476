use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("configuration error: {0}")]
    Config(#[from] core_types::CoreError),

    #[error("data loading error: {0}")]
    DataLoader(#[from] data_loader::DataLoaderError),

    #[error("strategy execution error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("risk management error: {0}")]
    Risk(#[from] risk::RiskError),

    #[error("execution simulation error: {0}")]
    Execution(#[from] execution::ExecutionError),

    #[error("analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("historical data for the requested range is incomplete or missing for {0}")]
    DataUnavailable(String),

    #[error("run was cancelled after {0} events")]
    Cancelled(u64),
}
