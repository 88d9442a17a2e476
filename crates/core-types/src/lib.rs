pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Grade, IssueSeverity, OrderSide, OrderStatus, OrderType, PositionSide, Timeframe};
pub use error::CoreError;
pub use structs::{
    Bar, BacktestConfig, EquityCurvePoint, MarketSnapshot, MonteCarloConfig, Order, OrderId,
    Position, RiskLimits, Signal, SlippageConfig, SlippageModelKind, Tick, Trade,
    ValidationConfig, ViabilityIssue, WalkForwardConfig,
};
