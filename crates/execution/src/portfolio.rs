use crate::error::ExecutionError;
use chrono::{DateTime, Utc};
use core_types::{OrderSide, Position};
use rust_decimal::prelude::Signed;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Manages the state of a simulated trading account: cash, open positions, and the
/// equity/drawdown bookkeeping the risk manager watches.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub cash: Decimal,
    pub positions: HashMap<String, Position>,
    pub peak_equity: Decimal,
    pub allow_short: bool,
}

impl Portfolio {
    /// Creates a new `Portfolio` with a given amount of starting capital.
    pub fn new(initial_capital: Decimal, allow_short: bool) -> Self {
        Self {
            cash: initial_capital,
            positions: HashMap::new(),
            peak_equity: initial_capital,
            allow_short,
        }
    }

    /// Applies a buy fill: debits cash, opens or averages into a position, or covers an
    /// existing short. Returns the realised PnL when the buy closes (part of) a short.
    pub fn buy(
        &mut self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
        commission: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<Decimal>, ExecutionError> {
        let cost = quantity * price + commission;
        let projected_cash = self.cash - cost;
        if projected_cash.is_sign_negative() && !self.allow_short {
            return Err(ExecutionError::InsufficientCash {
                required: cost.to_string(),
                available: self.cash.to_string(),
            });
        }
        self.cash = projected_cash;
        self.settle(symbol, quantity, price, commission, timestamp)
    }

    /// Applies a sell fill: credits cash, reduces or closes an existing position, and
    /// realises PnL against that position's average entry price. Flips to a short
    /// position only when `allow_short` is set.
    pub fn sell(
        &mut self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
        commission: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<Decimal>, ExecutionError> {
        let existing_quantity = self
            .positions
            .get(symbol)
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO);

        if !self.allow_short && quantity > existing_quantity {
            return Err(ExecutionError::InvalidClosingQuantity {
                requested: quantity.to_string(),
                available: existing_quantity.to_string(),
            });
        }

        self.cash += price * quantity - commission;
        self.settle(symbol, -quantity, price, commission, timestamp)
    }

    /// Shared signed-quantity settlement: same-sign deltas average into the position,
    /// opposite-sign deltas realise PnL on the closed portion and, if the delta outweighs
    /// the existing position, flip the remainder into a new position on the other side.
    fn settle(
        &mut self,
        symbol: &str,
        delta: Decimal,
        price: Decimal,
        commission: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<Decimal>, ExecutionError> {
        let position = self
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| Position {
                symbol: symbol.to_string(),
                quantity: Decimal::ZERO,
                avg_entry_price: price,
                current_price: price,
                opened_at: timestamp,
                trade_count: 0,
            });

        let existing_quantity = position.quantity;
        let mut realized_pnl = None;

        if existing_quantity.is_zero() || existing_quantity.signum() == delta.signum() {
            // Opening or adding to a position on the same side: average entry price.
            let total = existing_quantity + delta;
            if !total.is_zero() {
                position.avg_entry_price =
                    (existing_quantity * position.avg_entry_price + delta * price) / total;
            }
            position.quantity = total;
            if existing_quantity.is_zero() {
                position.opened_at = timestamp;
            }
            position.trade_count += 1;
        } else {
            // Reducing or flipping: realise PnL on the closed portion.
            let closing_qty = delta.abs().min(existing_quantity.abs());
            let pnl_per_unit = if existing_quantity.is_sign_positive() {
                price - position.avg_entry_price
            } else {
                position.avg_entry_price - price
            };
            realized_pnl = Some(pnl_per_unit * closing_qty - commission);

            let new_quantity = existing_quantity + delta;
            position.quantity = new_quantity;
            if new_quantity.signum() != existing_quantity.signum() && !new_quantity.is_zero() {
                // Flipped sides: the leftover opens a fresh position at the fill price.
                position.avg_entry_price = price;
                position.opened_at = timestamp;
            }
            position.trade_count += 1;
        }

        if position.quantity.is_zero() {
            self.positions.remove(symbol);
        }

        Ok(realized_pnl)
    }

    /// Marks a position to the latest observed price and refreshes peak equity. A no-op
    /// when there is no open position for the symbol.
    pub fn update_price(&mut self, symbol: &str, price: Decimal) {
        if let Some(position) = self.positions.get_mut(symbol) {
            position.current_price = price;
        }
        let equity = self.equity();
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
    }

    /// Liquidates every open position at its last observed mark price. Charges no
    /// commission: this is the emergency kill-switch path, not an ordinary exit.
    pub fn close_all(&mut self, _timestamp: DateTime<Utc>) -> Decimal {
        let mut total_pnl = Decimal::ZERO;
        for position in self.positions.values() {
            let pnl = position.quantity * (position.current_price - position.avg_entry_price);
            total_pnl += pnl;
            self.cash += position.quantity * position.current_price;
        }
        self.positions.clear();
        total_pnl
    }

    /// `cash + sum(quantity * current_price)` over all open positions.
    pub fn equity(&self) -> Decimal {
        self.cash
            + self
                .positions
                .values()
                .map(|p| p.market_value())
                .sum::<Decimal>()
    }

    /// `(peak_equity - equity) / peak_equity`, or zero when there is no peak yet.
    pub fn drawdown(&self) -> Decimal {
        let equity = self.equity();
        if self.peak_equity.is_zero() {
            Decimal::ZERO
        } else {
            (self.peak_equity - equity) / self.peak_equity
        }
    }

    pub fn open_position_count(&self) -> usize {
        self.positions.len()
    }
}

/// Maps an order's side onto the portfolio operation it triggers on fill.
pub fn apply_fill(
    portfolio: &mut Portfolio,
    side: OrderSide,
    symbol: &str,
    quantity: Decimal,
    price: Decimal,
    commission: Decimal,
    timestamp: DateTime<Utc>,
) -> Result<Option<Decimal>, ExecutionError> {
    match side {
        OrderSide::Buy => portfolio.buy(symbol, quantity, price, commission, timestamp),
        OrderSide::Sell => portfolio.sell(symbol, quantity, price, commission, timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn buy_then_sell_realises_expected_pnl() {
        let mut p = Portfolio::new(dec!(10_000), false);
        p.buy("BTCUSD", dec!(1), dec!(100), dec!(0), now()).unwrap();
        assert_eq!(p.cash, dec!(9_900));
        let pnl = p.sell("BTCUSD", dec!(1), dec!(110), dec!(0), now()).unwrap();
        assert_eq!(pnl, Some(dec!(10)));
        assert_eq!(p.cash, dec!(10_010));
        assert!(!p.positions.contains_key("BTCUSD"));
    }

    #[test]
    fn averaging_into_existing_position() {
        let mut p = Portfolio::new(dec!(10_000), false);
        p.buy("BTCUSD", dec!(1), dec!(100), dec!(0), now()).unwrap();
        p.buy("BTCUSD", dec!(1), dec!(120), dec!(0), now()).unwrap();
        let pos = p.positions.get("BTCUSD").unwrap();
        assert_eq!(pos.quantity, dec!(2));
        assert_eq!(pos.avg_entry_price, dec!(110));
    }

    #[test]
    fn sell_without_position_rejected_when_short_disabled() {
        let mut p = Portfolio::new(dec!(10_000), false);
        let result = p.sell("BTCUSD", dec!(1), dec!(100), dec!(0), now());
        assert!(result.is_err());
    }

    #[test]
    fn buy_insufficient_cash_rejected() {
        let mut p = Portfolio::new(dec!(50), false);
        let result = p.buy("BTCUSD", dec!(1), dec!(100), dec!(0), now());
        assert!(result.is_err());
    }

    #[test]
    fn close_all_zeroes_positions_without_commission() {
        let mut p = Portfolio::new(dec!(10_000), false);
        p.buy("BTCUSD", dec!(1), dec!(100), dec!(0), now()).unwrap();
        p.update_price("BTCUSD", dec!(150));
        let pnl = p.close_all(now());
        assert_eq!(pnl, dec!(50));
        assert!(p.positions.is_empty());
    }

    #[test]
    fn drawdown_tracks_peak_equity() {
        let mut p = Portfolio::new(dec!(10_000), false);
        p.buy("BTCUSD", dec!(10), dec!(100), dec!(0), now()).unwrap();
        p.update_price("BTCUSD", dec!(150));
        assert_eq!(p.drawdown(), Decimal::ZERO);
        p.update_price("BTCUSD", dec!(75));
        assert!(p.drawdown() > Decimal::ZERO);
    }
}
