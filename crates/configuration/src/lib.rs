use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, MaCrossoverParams, RiskManagement};

/// Loads the backtest configuration from a TOML file at `path`, validates the embedded
/// `BacktestConfig`, and returns the strongly-typed result.
///
/// This is the primary entry point for this crate. It reads the configuration file,
/// deserializes it into our strongly-typed `Config` struct, validates it, and returns it.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.backtest.validate()?;

    if config.risk_management.risk_per_trade_pct <= rust_decimal::Decimal::ZERO {
        return Err(ConfigError::validation(
            "risk_management.risk_per_trade_pct must be greater than zero",
        ));
    }
    if config.strategy.fast_period >= config.strategy.slow_period {
        return Err(ConfigError::validation(
            "strategy.fast_period must be less than strategy.slow_period",
        ));
    }

    Ok(config)
}
