use crate::error::StrategyError;
use crate::StrategySignalSource;
use core_types::{Bar, OrderSide, Signal};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use uuid::Uuid;

/// A fixed-window rolling simple moving average over `Decimal` closes.
///
/// Hand-rolled rather than pulled from a technical-analysis crate: this strategy exists
/// to exercise the engine's own test suite, not to be a production trading strategy, so
/// it stays in the same numeric domain as the rest of the simulation core instead of
/// crossing to `f64` and back for every bar.
struct RollingSma {
    period: usize,
    window: VecDeque<Decimal>,
    sum: Decimal,
}

impl RollingSma {
    fn new(period: usize) -> Result<Self, StrategyError> {
        if period == 0 {
            return Err(StrategyError::InvalidParameters(
                "moving average period must be > 0".to_string(),
            ));
        }
        Ok(Self {
            period,
            window: VecDeque::with_capacity(period),
            sum: Decimal::ZERO,
        })
    }

    /// Pushes a new close and returns the average once the window is full.
    fn next(&mut self, value: Decimal) -> Option<Decimal> {
        self.window.push_back(value);
        self.sum += value;
        if self.window.len() > self.period {
            if let Some(popped) = self.window.pop_front() {
                self.sum -= popped;
            }
        }
        if self.window.len() == self.period {
            Some(self.sum / Decimal::from(self.period as u64))
        } else {
            None
        }
    }
}

/// The triple moving-average crossover strategy: a bullish cross of fast over slow,
/// confirmed by a longer trend filter, produces a buy; the mirror produces a sell.
pub struct MaCrossover {
    symbol: String,
    fast: RollingSma,
    slow: RollingSma,
    trend_filter: RollingSma,
    prev_fast: Option<Decimal>,
    prev_slow: Option<Decimal>,
}

impl MaCrossover {
    pub fn new(
        symbol: impl Into<String>,
        fast_period: usize,
        slow_period: usize,
        trend_filter_period: usize,
    ) -> Result<Self, StrategyError> {
        if fast_period >= slow_period {
            return Err(StrategyError::InvalidParameters(
                "fast period must be less than slow period".to_string(),
            ));
        }
        Ok(Self {
            symbol: symbol.into(),
            fast: RollingSma::new(fast_period)?,
            slow: RollingSma::new(slow_period)?,
            trend_filter: RollingSma::new(trend_filter_period)?,
            prev_fast: None,
            prev_slow: None,
        })
    }
}

impl StrategySignalSource for MaCrossover {
    fn on_bar(&mut self, bar: &Bar) -> Result<Option<Signal>, StrategyError> {
        let fast_ma = self.fast.next(bar.close);
        let slow_ma = self.slow.next(bar.close);
        let trend_ma = self.trend_filter.next(bar.close);

        let mut signal = None;

        if let (Some(fast_ma), Some(slow_ma), Some(trend_ma), Some(prev_fast), Some(prev_slow)) =
            (fast_ma, slow_ma, trend_ma, self.prev_fast, self.prev_slow)
        {
            let bullish_cross = prev_fast <= prev_slow && fast_ma > slow_ma;
            let bearish_cross = prev_fast >= prev_slow && fast_ma < slow_ma;
            let uptrend = bar.close > trend_ma;
            let downtrend = bar.close < trend_ma;

            if bullish_cross && uptrend {
                tracing::debug!(symbol = %self.symbol, "MaCrossover: bullish cross, emitting buy");
                signal = Some(Signal {
                    id: Uuid::new_v4(),
                    timestamp: bar.timestamp,
                    symbol: self.symbol.clone(),
                    side: OrderSide::Buy,
                    confidence: dec!(1.0),
                    price: None,
                });
            } else if bearish_cross && downtrend {
                tracing::debug!(symbol = %self.symbol, "MaCrossover: bearish cross, emitting sell");
                signal = Some(Signal {
                    id: Uuid::new_v4(),
                    timestamp: bar.timestamp,
                    symbol: self.symbol.clone(),
                    side: OrderSide::Sell,
                    confidence: dec!(1.0),
                    price: None,
                });
            }
        }

        if let Some(fast_ma) = fast_ma {
            self.prev_fast = Some(fast_ma);
        }
        if let Some(slow_ma) = slow_ma {
            self.prev_slow = Some(slow_ma);
        }

        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn bar(close: Decimal, ts: chrono::DateTime<Utc>) -> Bar {
        Bar {
            timestamp: ts,
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(1000),
        }
    }

    #[test]
    fn rejects_fast_period_not_less_than_slow() {
        assert!(MaCrossover::new("X", 5, 5, 10).is_err());
    }

    #[test]
    fn emits_buy_on_bullish_cross_in_uptrend() {
        let mut strat = MaCrossover::new("BTCUSD", 2, 3, 4).unwrap();
        let t0 = Utc::now();
        // Declining then rising prices: fast MA crosses above slow MA once the
        // uptrend establishes, with the trend filter confirming.
        let closes = [
            dec!(100),
            dec!(99),
            dec!(98),
            dec!(97),
            dec!(100),
            dec!(105),
            dec!(110),
            dec!(115),
        ];
        let mut any_signal = false;
        for (i, c) in closes.iter().enumerate() {
            if let Some(sig) = strat.on_bar(&bar(*c, t0 + Duration::minutes(i as i64))).unwrap() {
                assert_eq!(sig.side, OrderSide::Buy);
                any_signal = true;
            }
        }
        assert!(any_signal, "expected at least one buy signal on the uptrend");
    }
}
