use core_types::{MarketSnapshot, OrderSide};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// The slippage fraction a model returns is clamped into this range before it is
/// applied to a fill price; no model is allowed to claim more than 5% adverse move.
const MAX_SLIPPAGE_FRACTION: Decimal = dec!(0.05);

/// Calculates the adverse-price fraction an order incurs against a market snapshot.
///
/// `SimulatedExecutor` used to hard-code a single bar-range-based formula; the slippage
/// model is now a pluggable capability so the order manager can be driven by whichever
/// model the backtest config selects.
pub trait SlippageModel: Send + Sync {
    fn calculate(&self, side: OrderSide, quantity: Decimal, snapshot: &MarketSnapshot) -> Decimal;
}

fn clamp_fraction(fraction: Decimal) -> Decimal {
    fraction.max(Decimal::ZERO).min(MAX_SLIPPAGE_FRACTION)
}

/// A flat slippage in basis points, independent of order size or volume.
#[derive(Debug, Clone, Copy)]
pub struct FixedSlippage {
    pub bps: Decimal,
}

impl SlippageModel for FixedSlippage {
    fn calculate(&self, _side: OrderSide, _quantity: Decimal, _snapshot: &MarketSnapshot) -> Decimal {
        clamp_fraction(self.bps / dec!(10_000))
    }
}

/// Base cost plus an impact term that grows with the square root of participation rate
/// (order quantity over bar volume), the textbook square-root market impact shape.
#[derive(Debug, Clone, Copy)]
pub struct VolumeWeightedSlippage {
    pub base_bps: Decimal,
    pub impact_factor: Decimal,
}

impl SlippageModel for VolumeWeightedSlippage {
    fn calculate(&self, _side: OrderSide, quantity: Decimal, snapshot: &MarketSnapshot) -> Decimal {
        let base = self.base_bps / dec!(10_000);
        if snapshot.volume.is_zero() {
            return clamp_fraction(base);
        }
        let participation = (quantity / snapshot.volume).max(Decimal::ZERO);
        let impact = self.impact_factor * participation.sqrt().unwrap_or(Decimal::ZERO);
        clamp_fraction(base + impact)
    }
}

/// One level of resting liquidity at a price, used by `OrderBookTraversalSlippage`.
#[derive(Debug, Clone, Copy)]
pub struct BookLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

/// Walks a supplied order-book side consuming quantity level by level and derives
/// slippage from the volume-weighted average fill price versus the mid. When the book
/// cannot absorb the whole order, the remainder is extrapolated at the worst level's
/// price plus a 1% penalty per unit of unmet quantity.
#[derive(Debug, Clone)]
pub struct OrderBookTraversalSlippage {
    pub mid_price: Decimal,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

impl SlippageModel for OrderBookTraversalSlippage {
    fn calculate(&self, side: OrderSide, quantity: Decimal, _snapshot: &MarketSnapshot) -> Decimal {
        if self.mid_price.is_zero() || quantity.is_zero() {
            return Decimal::ZERO;
        }
        let levels = match side {
            OrderSide::Buy => &self.asks,
            OrderSide::Sell => &self.bids,
        };

        let mut remaining = quantity;
        let mut notional = Decimal::ZERO;
        let mut filled = Decimal::ZERO;
        let mut worst_price = self.mid_price;

        for level in levels {
            if remaining.is_zero() {
                break;
            }
            let take = remaining.min(level.quantity);
            notional += take * level.price;
            filled += take;
            remaining -= take;
            worst_price = level.price;
        }

        if !remaining.is_zero() {
            let penalty = dec!(1.01);
            notional += remaining * worst_price * penalty;
            filled += remaining;
        }

        if filled.is_zero() {
            return Decimal::ZERO;
        }
        let avg_fill = notional / filled;
        clamp_fraction(((avg_fill - self.mid_price) / self.mid_price).abs())
    }
}

/// Wraps a base model and multiplies its output when an order's participation rate
/// exceeds 1% of bar volume, plus a fixed sandwich-attack buffer — a conservative stand-in
/// for MEV extraction risk on a public mempool.
pub struct MevAwareSlippage {
    pub base: Box<dyn SlippageModel>,
    pub multiplier: Decimal,
    pub sandwich_buffer_bps: Decimal,
}

impl SlippageModel for MevAwareSlippage {
    fn calculate(&self, side: OrderSide, quantity: Decimal, snapshot: &MarketSnapshot) -> Decimal {
        let base_fraction = self.base.calculate(side, quantity, snapshot);
        let participation = if snapshot.volume.is_zero() {
            Decimal::ZERO
        } else {
            quantity / snapshot.volume
        };
        let buffer = self.sandwich_buffer_bps / dec!(10_000);
        if participation > dec!(0.01) {
            clamp_fraction(base_fraction * self.multiplier + buffer)
        } else {
            clamp_fraction(base_fraction + buffer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(volume: Decimal) -> MarketSnapshot {
        MarketSnapshot {
            timestamp: chrono::Utc::now(),
            price: dec!(100),
            volume,
        }
    }

    #[test]
    fn fixed_slippage_ignores_size_and_volume() {
        let model = FixedSlippage { bps: dec!(10) };
        let fraction = model.calculate(OrderSide::Buy, dec!(1000), &snapshot(dec!(1)));
        assert_eq!(fraction, dec!(0.001));
    }

    #[test]
    fn volume_weighted_grows_with_participation() {
        let model = VolumeWeightedSlippage {
            base_bps: dec!(5),
            impact_factor: dec!(0.1),
        };
        let small = model.calculate(OrderSide::Buy, dec!(1), &snapshot(dec!(10_000)));
        let large = model.calculate(OrderSide::Buy, dec!(5_000), &snapshot(dec!(10_000)));
        assert!(large > small);
    }

    #[test]
    fn slippage_is_clamped_at_five_percent() {
        let model = FixedSlippage { bps: dec!(100_000) };
        let fraction = model.calculate(OrderSide::Buy, dec!(1), &snapshot(dec!(1)));
        assert_eq!(fraction, MAX_SLIPPAGE_FRACTION);
    }

    #[test]
    fn orderbook_traversal_extrapolates_past_depth() {
        let model = OrderBookTraversalSlippage {
            mid_price: dec!(100),
            bids: vec![],
            asks: vec![BookLevel { price: dec!(100.5), quantity: dec!(1) }],
        };
        let fraction = model.calculate(OrderSide::Buy, dec!(5), &snapshot(dec!(100)));
        assert!(fraction > Decimal::ZERO);
    }

    #[test]
    fn mev_wrapper_scales_up_on_high_participation() {
        let base = FixedSlippage { bps: dec!(5) };
        let model = MevAwareSlippage {
            base: Box::new(base),
            multiplier: dec!(3),
            sandwich_buffer_bps: dec!(2),
        };
        let low = model.calculate(OrderSide::Buy, dec!(1), &snapshot(dec!(10_000)));
        let high = model.calculate(OrderSide::Buy, dec!(500), &snapshot(dec!(10_000)));
        assert!(high > low);
    }
}
