use core_types::{MarketSnapshot, OrderSide};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// Parameters for the Almgren-Chriss-style market impact term: `gamma*sigma*sqrt(u) +
/// eta*u + linear*u`, where `u` is the order's participation rate (quantity / bar
/// volume).
#[derive(Debug, Clone, Copy)]
pub struct ImpactParams {
    pub permanent_gamma: Decimal,
    pub temporary_eta: Decimal,
    pub volatility: Decimal,
    pub linear: Decimal,
}

/// Commission schedule with a proportional rate clamped into `[min, max]` absolute cost.
#[derive(Debug, Clone, Copy)]
pub struct CommissionSchedule {
    pub rate: Decimal,
    pub min: Decimal,
    pub max: Decimal,
}

impl CommissionSchedule {
    pub fn commission_for(&self, notional: Decimal) -> Decimal {
        (notional * self.rate).max(self.min).min(self.max)
    }
}

/// The itemised cost of filling one order, before it is folded into a single adjusted
/// fill price.
#[derive(Debug, Clone, Copy)]
pub struct CostBreakdown {
    pub spread_cost_ratio: Decimal,
    pub impact_cost_ratio: Decimal,
    pub mev_cost_ratio: Decimal,
    pub commission: Decimal,
}

impl CostBreakdown {
    pub fn total_cost_ratio(&self) -> Decimal {
        self.spread_cost_ratio + self.impact_cost_ratio + self.mev_cost_ratio
    }
}

/// Combines spread, market impact, and an optional MEV expected-value cost into the
/// total adverse-price ratio applied to a fill, on top of whatever a `SlippageModel`
/// already contributes. Used when a backtest config opts into the richer cost model
/// rather than a single slippage fraction.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionCostModel {
    pub impact: ImpactParams,
    pub commission: CommissionSchedule,
    pub half_spread_ratio: Decimal,
    pub mev_expected_value_bps: Decimal,
}

impl ExecutionCostModel {
    pub fn evaluate(
        &self,
        _side: OrderSide,
        quantity: Decimal,
        snapshot: &MarketSnapshot,
    ) -> CostBreakdown {
        let participation = if snapshot.volume.is_zero() {
            Decimal::ZERO
        } else {
            (quantity / snapshot.volume).max(Decimal::ZERO)
        };
        let sqrt_participation = participation.sqrt().unwrap_or(Decimal::ZERO);
        let impact_cost_ratio = self.impact.permanent_gamma * self.impact.volatility * sqrt_participation
            + self.impact.temporary_eta * participation
            + self.impact.linear * participation;

        let notional = quantity * snapshot.price;
        CostBreakdown {
            spread_cost_ratio: self.half_spread_ratio,
            impact_cost_ratio,
            mev_cost_ratio: self.mev_expected_value_bps / dec!(10_000),
            commission: self.commission.commission_for(notional),
        }
    }

    /// Applies the breakdown's total cost ratio to `base_price`, adverse to the order's
    /// side (higher for a buy, lower for a sell).
    pub fn adjusted_fill_price(
        &self,
        side: OrderSide,
        base_price: Decimal,
        breakdown: &CostBreakdown,
    ) -> Decimal {
        let ratio = breakdown.total_cost_ratio();
        match side {
            OrderSide::Buy => base_price * (Decimal::ONE + ratio),
            OrderSide::Sell => base_price * (Decimal::ONE - ratio),
        }
    }
}
