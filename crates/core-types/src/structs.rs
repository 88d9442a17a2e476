use crate::enums::{IssueSeverity, OrderSide, OrderStatus, OrderType, Timeframe};
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single OHLCV candle for one symbol/timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Bar {
    /// Checks the OHLC ordering and non-negative volume invariant. Called once by the
    /// data loader boundary, not on every downstream access.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.low > self.open
            || self.low > self.close
            || self.low > self.high
            || self.high < self.open
            || self.high < self.close
        {
            return Err(CoreError::InvalidInput(
                "bar".to_string(),
                format!(
                    "low/high do not bound open/close: o={} h={} l={} c={}",
                    self.open, self.high, self.low, self.close
                ),
            ));
        }
        if self.volume < Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "bar.volume".to_string(),
                format!("negative volume: {}", self.volume),
            ));
        }
        Ok(())
    }
}

/// A single trade print. Ticks and bars both collapse into a `MarketSnapshot` before
/// reaching the order manager or slippage model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub size: Decimal,
}

/// The common view of "what does the market look like right now" consumed by the order
/// manager and slippage model, regardless of whether the underlying feed is bars or ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub volume: Decimal,
}

impl From<Bar> for MarketSnapshot {
    fn from(bar: Bar) -> Self {
        Self {
            timestamp: bar.timestamp,
            price: bar.close,
            volume: bar.volume,
        }
    }
}

impl From<Tick> for MarketSnapshot {
    fn from(tick: Tick) -> Self {
        Self {
            timestamp: tick.timestamp,
            price: tick.price,
            volume: tick.size,
        }
    }
}

/// Opaque identifier for an order, distinct from a trade id or a position key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An order tracked by the order manager, pending or terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    /// Limit price for `Limit`/`TakeProfit`, ignored for `Market`/`Stop`.
    pub price: Option<Decimal>,
    /// Trigger price for `Stop`, ignored otherwise.
    pub stop_price: Option<Decimal>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub filled_at: Option<DateTime<Utc>>,
    pub filled_quantity: Decimal,
    pub avg_fill_price: Option<Decimal>,
    pub commission: Decimal,
    pub slippage: Decimal,
}

impl Order {
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        price: Option<Decimal>,
        stop_price: Option<Decimal>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            symbol: symbol.into(),
            side,
            order_type,
            quantity,
            price,
            stop_price,
            status: OrderStatus::Pending,
            created_at,
            updated_at: created_at,
            filled_at: None,
            filled_quantity: Decimal::ZERO,
            avg_fill_price: None,
            commission: Decimal::ZERO,
            slippage: Decimal::ZERO,
        }
    }
}

/// A strategy-produced signal, consumed by the risk manager to size and route an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: OrderSide,
    pub confidence: Decimal,
    /// `None` means "market", `Some(price)` means a limit entry at that price.
    pub price: Option<Decimal>,
}

/// An open position in the portfolio. Removed from the book once `quantity` returns to
/// zero rather than being kept around at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: Decimal,
    pub avg_entry_price: Decimal,
    pub current_price: Decimal,
    pub opened_at: DateTime<Utc>,
    pub trade_count: u32,
}

impl Position {
    pub fn market_value(&self) -> Decimal {
        self.quantity * self.current_price
    }

    pub fn unrealized_pnl(&self) -> Decimal {
        self.quantity * (self.current_price - self.avg_entry_price)
    }
}

/// A closed-leg realisation appended to the trade log. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub realized_pnl: Decimal,
    pub commission: Decimal,
    pub slippage: Decimal,
    pub entered_at: DateTime<Utc>,
    pub executed_at: DateTime<Utc>,
}

/// One sample of the equity curve, appended once per market-data event processed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EquityCurvePoint {
    pub timestamp: DateTime<Utc>,
    pub equity: Decimal,
    pub cash: Decimal,
    pub drawdown: Decimal,
}

/// Risk thresholds that gate signals and orders, and that the risk manager watches for
/// post-bar breaches.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RiskLimits {
    pub max_position_size: Decimal,
    pub max_drawdown: Decimal,
    pub max_daily_loss: Decimal,
    pub max_open_positions: u32,
    pub max_consecutive_losses: Option<u32>,
    pub kill_switch_threshold: Option<Decimal>,
}

/// Slippage model selection and its tunables. See `execution::slippage` for the models
/// this drives.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlippageModelKind {
    Fixed,
    VolumeWeighted,
    OrderBook,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlippageConfig {
    pub model: SlippageModelKind,
    pub base_bps: Decimal,
    pub impact_factor: Decimal,
    pub volume_fraction: Decimal,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonteCarloConfig {
    pub enabled: bool,
    pub iterations: u32,
    pub confidence_level: Decimal,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WalkForwardConfig {
    pub enabled: bool,
    pub windows: u32,
    pub in_sample_fraction: Decimal,
    pub anchored: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    pub monte_carlo: MonteCarloConfig,
    pub walk_forward: WalkForwardConfig,
}

/// Top-level description of one backtest run. Immutable once passed to the engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BacktestConfig {
    pub id: String,
    pub symbols: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub timeframe: Timeframe,
    pub initial_capital: Decimal,
    pub commission: Decimal,
    pub allow_short: bool,
    pub slippage: SlippageConfig,
    pub risk_limits: RiskLimits,
    pub validation: ValidationConfig,
}

impl BacktestConfig {
    /// Cheap structural checks the engine needs before it will materialise data.
    /// Anything deeper (does the symbol actually have data) is the data loader's job.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.symbols.is_empty() {
            return Err(CoreError::InvalidInput(
                "symbols".to_string(),
                "symbol list must not be empty".to_string(),
            ));
        }
        if self.start_date > self.end_date {
            return Err(CoreError::InvalidInput(
                "date_range".to_string(),
                format!("start {} is after end {}", self.start_date, self.end_date),
            ));
        }
        if self.initial_capital <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "initial_capital".to_string(),
                format!("must be positive, got {}", self.initial_capital),
            ));
        }
        if self.commission < Decimal::ZERO || self.commission > Decimal::ONE {
            return Err(CoreError::InvalidInput(
                "commission".to_string(),
                format!("must be within [0, 1], got {}", self.commission),
            ));
        }
        Ok(())
    }
}

/// A single dimension's issue raised by the viability checker against a `BacktestResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViabilityIssue {
    pub severity: IssueSeverity,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn bar_rejects_inverted_range() {
        let bar = Bar {
            timestamp: Utc::now(),
            open: dec!(10),
            high: dec!(9),
            low: dec!(8),
            close: dec!(9.5),
            volume: dec!(1),
        };
        assert!(bar.validate().is_err());
    }

    #[test]
    fn bar_accepts_valid_range() {
        let bar = Bar {
            timestamp: Utc::now(),
            open: dec!(10),
            high: dec!(11),
            low: dec!(9),
            close: dec!(10.5),
            volume: dec!(100),
        };
        assert!(bar.validate().is_ok());
    }

    #[test]
    fn order_id_display_matches_uuid() {
        let id = OrderId::new();
        assert_eq!(id.to_string(), id.0.to_string());
    }
}
