use chrono::{DateTime, Utc};
use core_types::{Order, OrderId, OrderSide, Signal};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dispatch priority within a timestamp. Lower fires first. `KillSwitch` always wins so
/// that a liquidation is applied before any other handler observes the same bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    KillSwitch = 0,
    MarketData = 1,
    Signal = 2,
    Order = 3,
    Fill = 4,
    Risk = 5,
}

/// A fill produced by the order manager against a bar/tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillPayload {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
    pub commission: Decimal,
    pub slippage: Decimal,
}

/// A risk breach the engine should record but that does not by itself halt the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBreach {
    pub reason: String,
    pub drawdown: Decimal,
}

/// A kill-switch latch. Carries the reason so the result can explain why the run's
/// remaining signals/orders were rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillSwitchPayload {
    pub reason: String,
    pub equity_at_trigger: Decimal,
}

/// The payload carried by a dispatched event. One variant per handler the engine runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EventKind {
    MarketData { symbol: String },
    Signal(Signal),
    Order(Order),
    Fill(FillPayload),
    Risk(RiskBreach),
    KillSwitch(KillSwitchPayload),
}

impl EventKind {
    pub fn priority(&self) -> Priority {
        match self {
            EventKind::KillSwitch(_) => Priority::KillSwitch,
            EventKind::MarketData { .. } => Priority::MarketData,
            EventKind::Signal(_) => Priority::Signal,
            EventKind::Order(_) => Priority::Order,
            EventKind::Fill(_) => Priority::Fill,
            EventKind::Risk(_) => Priority::Risk,
        }
    }
}

/// One dispatchable unit of work, totally ordered by `(timestamp, priority, sequence)`.
///
/// `sequence` is stamped by the queue at push time and is the tie-breaker of last resort:
/// it guarantees a deterministic order even when two events share a timestamp and
/// priority, which is what makes two runs over identical inputs reproduce bit-identical
/// results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub sequence: u64,
    pub kind: EventKind,
}

impl Event {
    pub fn priority(&self) -> Priority {
        self.kind.priority()
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.priority() == other.priority()
            && self.sequence == other.sequence
    }
}
impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.timestamp, self.priority(), self.sequence).cmp(&(
            other.timestamp,
            other.priority(),
            other.sequence,
        ))
    }
}
