use crate::error::ExecutionError;
use crate::slippage::SlippageModel;
use core_types::{MarketSnapshot, Order, OrderId, OrderSide, OrderStatus, OrderType};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Tracks pending and filled orders and evaluates fill eligibility against each new
/// market snapshot. Iteration over pending orders for a symbol is always in insertion
/// order — a `Vec<OrderId>` alongside the lookup map, matching the deterministic-
/// iteration-via-owned-collection idiom the wider pack uses instead of relying on
/// hash-map iteration order.
#[derive(Debug, Default)]
pub struct OrderBook {
    pending_ids: Vec<OrderId>,
    pending: HashMap<OrderId, Order>,
    filled: HashMap<OrderId, Order>,
}

/// One resolved fill produced by `OrderBook::evaluate`.
#[derive(Debug, Clone)]
pub struct Fill {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub price: Decimal,
    pub quantity: Decimal,
    pub slippage_fraction: Decimal,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an order to the pending book. Fails if the id is already known, which would
    /// indicate a caller bug (ids are freshly generated per order).
    pub fn submit(&mut self, order: Order) -> Result<(), ExecutionError> {
        if self.pending.contains_key(&order.id) || self.filled.contains_key(&order.id) {
            return Err(ExecutionError::DuplicateOrder(order.id.to_string()));
        }
        self.pending_ids.push(order.id);
        self.pending.insert(order.id, order);
        Ok(())
    }

    pub fn cancel(&mut self, id: OrderId) -> Option<Order> {
        if let Some(mut order) = self.pending.remove(&id) {
            self.pending_ids.retain(|o| *o != id);
            order.status = OrderStatus::Cancelled;
            Some(order)
        } else {
            None
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn filled_order(&self, id: &OrderId) -> Option<&Order> {
        self.filled.get(id)
    }

    /// Evaluates every pending order against `symbol`'s new snapshot, producing fills in
    /// deterministic order: insertion order within a type-priority group, Limit/TakeProfit
    /// before Market/Stop, matching the policy that the less-adverse execution wins a tie.
    pub fn evaluate(
        &mut self,
        symbol: &str,
        snapshot: &MarketSnapshot,
        slippage_model: &dyn SlippageModel,
    ) -> Vec<Fill> {
        let mut candidates: Vec<OrderId> = self
            .pending_ids
            .iter()
            .copied()
            .filter(|id| {
                self.pending
                    .get(id)
                    .map(|o| o.symbol == symbol)
                    .unwrap_or(false)
            })
            .collect();

        candidates.sort_by_key(|id| type_priority(self.pending[id].order_type));

        let mut fills = Vec::new();
        for id in candidates {
            let order = match self.pending.get(&id) {
                Some(o) => o,
                None => continue,
            };
            if !is_eligible(order, snapshot.price) {
                continue;
            }
            let slippage_fraction = match order.order_type {
                OrderType::Limit | OrderType::TakeProfit => Decimal::ZERO,
                OrderType::Market | OrderType::Stop => {
                    slippage_model.calculate(order.side, order.quantity, snapshot)
                }
            };
            let price = fill_price(order, snapshot.price, slippage_fraction);

            fills.push(Fill {
                order_id: id,
                symbol: order.symbol.clone(),
                side: order.side,
                price,
                quantity: order.quantity,
                slippage_fraction,
            });
        }

        for fill in &fills {
            self.move_to_filled(fill.order_id, fill.price, fill.quantity, snapshot.timestamp);
        }

        fills
    }

    fn move_to_filled(
        &mut self,
        id: OrderId,
        price: Decimal,
        quantity: Decimal,
        at: chrono::DateTime<chrono::Utc>,
    ) {
        if let Some(mut order) = self.pending.remove(&id) {
            self.pending_ids.retain(|o| *o != id);
            order.status = OrderStatus::Filled;
            order.filled_at = Some(at);
            order.updated_at = at;
            order.filled_quantity = quantity;
            order.avg_fill_price = Some(price);
            self.filled.insert(id, order);
        }
    }
}

fn type_priority(order_type: OrderType) -> u8 {
    match order_type {
        OrderType::Limit | OrderType::TakeProfit => 0,
        OrderType::Market | OrderType::Stop => 1,
    }
}

fn is_eligible(order: &Order, mark: Decimal) -> bool {
    match order.order_type {
        OrderType::Market => true,
        OrderType::Limit => match (order.side, order.price) {
            (OrderSide::Buy, Some(limit)) => mark <= limit,
            (OrderSide::Sell, Some(limit)) => mark >= limit,
            _ => false,
        },
        OrderType::Stop => match (order.side, order.stop_price) {
            (OrderSide::Buy, Some(stop)) => mark >= stop,
            (OrderSide::Sell, Some(stop)) => mark <= stop,
            _ => false,
        },
        OrderType::TakeProfit => match (order.side, order.price) {
            (OrderSide::Buy, Some(target)) => mark <= target,
            (OrderSide::Sell, Some(target)) => mark >= target,
            _ => false,
        },
    }
}

fn fill_price(order: &Order, mark: Decimal, slippage_fraction: Decimal) -> Decimal {
    match order.order_type {
        OrderType::Limit => order.price.unwrap_or(mark),
        OrderType::TakeProfit => order.price.unwrap_or(mark),
        OrderType::Market | OrderType::Stop => match order.side {
            OrderSide::Buy => mark * (Decimal::ONE + slippage_fraction),
            OrderSide::Sell => mark * (Decimal::ONE - slippage_fraction),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slippage::FixedSlippage;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn snapshot(price: Decimal) -> MarketSnapshot {
        MarketSnapshot {
            timestamp: Utc::now(),
            price,
            volume: dec!(1000),
        }
    }

    #[test]
    fn market_order_fills_immediately() {
        let mut book = OrderBook::new();
        let order = Order::new("BTCUSD", OrderSide::Buy, OrderType::Market, dec!(1), None, None, Utc::now());
        book.submit(order).unwrap();
        let no_slip = FixedSlippage { bps: dec!(0) };
        let fills = book.evaluate("BTCUSD", &snapshot(dec!(100)), &no_slip);
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].price, dec!(100));
        assert_eq!(book.pending_count(), 0);
    }

    #[test]
    fn limit_buy_waits_until_price_crosses() {
        let mut book = OrderBook::new();
        let order = Order::new("BTCUSD", OrderSide::Buy, OrderType::Limit, dec!(1), Some(dec!(99)), None, Utc::now());
        book.submit(order).unwrap();
        let no_slip = FixedSlippage { bps: dec!(0) };

        assert!(book.evaluate("BTCUSD", &snapshot(dec!(100)), &no_slip).is_empty());
        assert!(book.evaluate("BTCUSD", &snapshot(dec!(99.5)), &no_slip).is_empty());
        let fills = book.evaluate("BTCUSD", &snapshot(dec!(99)), &no_slip);
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].price, dec!(99));
    }

    #[test]
    fn limit_fires_before_stop_on_same_bar() {
        let mut book = OrderBook::new();
        let stop = Order::new("BTCUSD", OrderSide::Buy, OrderType::Stop, dec!(1), None, Some(dec!(100)), Utc::now());
        let limit = Order::new("BTCUSD", OrderSide::Buy, OrderType::Limit, dec!(1), Some(dec!(100)), None, Utc::now());
        book.submit(stop).unwrap();
        book.submit(limit.clone()).unwrap();
        let no_slip = FixedSlippage { bps: dec!(0) };
        let fills = book.evaluate("BTCUSD", &snapshot(dec!(100)), &no_slip);
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].order_id, limit.id);
    }

    #[test]
    fn other_symbols_are_untouched() {
        let mut book = OrderBook::new();
        let order = Order::new("ETHUSD", OrderSide::Buy, OrderType::Market, dec!(1), None, None, Utc::now());
        book.submit(order).unwrap();
        let no_slip = FixedSlippage { bps: dec!(0) };
        let fills = book.evaluate("BTCUSD", &snapshot(dec!(100)), &no_slip);
        assert!(fills.is_empty());
        assert_eq!(book.pending_count(), 1);
    }
}
