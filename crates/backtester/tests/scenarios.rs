//! Literal-numbered end-to-end scenarios for the event-driven backtest loop: a flat
//! market, a single profitable round trip, a kill-switch latch, and a limit-order fill.
//! Each fixture is built only from the crate's public API plus its public dependencies,
//! since these run as a separate binary with no access to `src/lib.rs`'s private test
//! helpers.

use backtester::Engine;
use chrono::{DateTime, Duration, Utc};
use core_types::{
    Bar, BacktestConfig, MonteCarloConfig, OrderSide, RiskLimits, Signal, SlippageConfig,
    SlippageModelKind, Timeframe, ValidationConfig, WalkForwardConfig,
};
use data_loader::InMemoryDataLoader;
use execution::FixedSlippage;
use risk::SimpleRiskManager;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strategies::{NoSignalSource, StrategyError, StrategySignalSource};
use uuid::Uuid;

const SYMBOL: &str = "BTCUSD";

fn bars(prices: &[&str]) -> Vec<Bar> {
    let start = Utc::now();
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let price: Decimal = p.parse().unwrap();
            Bar {
                timestamp: start + Duration::hours(i as i64),
                open: price,
                high: price,
                low: price,
                close: price,
                volume: dec!(1000),
            }
        })
        .collect()
}

fn limits() -> RiskLimits {
    RiskLimits {
        max_position_size: dec!(1.0),
        max_drawdown: dec!(0.9),
        max_daily_loss: dec!(0.9),
        max_open_positions: 5,
        max_consecutive_losses: None,
        kill_switch_threshold: None,
    }
}

fn no_slippage() -> SlippageConfig {
    SlippageConfig {
        model: SlippageModelKind::Fixed,
        base_bps: dec!(0),
        impact_factor: dec!(0),
        volume_fraction: dec!(0),
    }
}

fn no_validation() -> ValidationConfig {
    ValidationConfig {
        monte_carlo: MonteCarloConfig { enabled: false, iterations: 0, confidence_level: dec!(0.95), seed: None },
        walk_forward: WalkForwardConfig { enabled: false, windows: 0, in_sample_fraction: dec!(0.7), anchored: true },
    }
}

fn config_for(bars: &[Bar], risk_limits: RiskLimits) -> BacktestConfig {
    BacktestConfig {
        id: "scenario".to_string(),
        symbols: vec![SYMBOL.to_string()],
        start_date: bars.first().unwrap().timestamp,
        end_date: bars.last().unwrap().timestamp,
        timeframe: Timeframe::OneHour,
        initial_capital: dec!(10_000),
        commission: dec!(0),
        allow_short: false,
        slippage: no_slippage(),
        risk_limits,
        validation: no_validation(),
    }
}

fn loader(bars: Vec<Bar>) -> InMemoryDataLoader {
    InMemoryDataLoader::new().with_bars(SYMBOL, bars).unwrap()
}

fn risk_manager(limits: RiskLimits) -> Box<SimpleRiskManager> {
    Box::new(SimpleRiskManager::new(limits, dec!(0.2), dec!(0.5), dec!(10_000)).unwrap())
}

fn signal(side: OrderSide, price: Option<Decimal>, timestamp: DateTime<Utc>) -> Signal {
    Signal {
        id: Uuid::new_v4(),
        timestamp,
        symbol: SYMBOL.to_string(),
        side,
        confidence: dec!(1.0),
        price,
    }
}

/// Fires a caller-chosen signal on a caller-chosen 1-indexed call number, then stays
/// silent. Lets each scenario script exactly the bar it wants a signal emitted on
/// without coupling to the strategy's own notion of "first" or "last" bar.
struct ScriptedSignal {
    fire_on_call: usize,
    side: OrderSide,
    price: Option<Decimal>,
    calls: usize,
}

impl StrategySignalSource for ScriptedSignal {
    fn on_bar(&mut self, bar: &Bar) -> Result<Option<Signal>, StrategyError> {
        self.calls += 1;
        if self.calls == self.fire_on_call {
            return Ok(Some(signal(self.side, self.price, bar.timestamp)));
        }
        Ok(None)
    }
}

/// Fires two scripted signals on two different call numbers: an entry then an exit.
struct ScriptedRoundTrip {
    entry_on_call: usize,
    entry_side: OrderSide,
    entry_price: Option<Decimal>,
    exit_on_call: usize,
    exit_side: OrderSide,
    calls: usize,
}

impl StrategySignalSource for ScriptedRoundTrip {
    fn on_bar(&mut self, bar: &Bar) -> Result<Option<Signal>, StrategyError> {
        self.calls += 1;
        if self.calls == self.entry_on_call {
            return Ok(Some(signal(self.entry_side, self.entry_price, bar.timestamp)));
        }
        if self.calls == self.exit_on_call {
            return Ok(Some(signal(self.exit_side, None, bar.timestamp)));
        }
        Ok(None)
    }
}

/// Scenario 1: a flat market with no signal source produces zero trades, an equity
/// curve pinned at the starting capital throughout, zero drawdown, and a Sharpe ratio
/// of exactly zero (not `None`) since every per-period return is zero.
#[test]
fn scenario_1_flat_market_has_zero_drawdown_and_zero_sharpe() {
    let prices: Vec<&str> = std::iter::repeat("100").take(1000).collect();
    let data = bars(&prices);
    let cfg = config_for(&data, limits());
    let mut engine = Engine::new(
        cfg,
        &loader(data),
        Box::new(NoSignalSource),
        risk_manager(limits()),
        Box::new(FixedSlippage { bps: dec!(0) }),
    )
    .unwrap();

    let result = engine.run().unwrap();

    assert!(result.trades.is_empty());
    assert_eq!(result.equity_curve.len(), 1000);
    assert!(result.equity_curve.iter().all(|p| p.equity == dec!(10_000)));
    assert_eq!(result.report.max_drawdown_pct, Decimal::ZERO);
    assert_eq!(result.report.sharpe_ratio, Some(Decimal::ZERO));
}

/// Scenario 2: a single buy-then-sell round trip with no slippage and no commission
/// realises a PnL of exactly 10 and leaves final equity at exactly 10010.
#[test]
fn scenario_2_single_round_trip_realizes_exact_pnl() {
    let data = bars(&["100", "100", "100", "100.25", "100.25"]);
    let cfg = config_for(&data, limits());
    let strategy = Box::new(ScriptedRoundTrip {
        entry_on_call: 1,
        entry_side: OrderSide::Buy,
        entry_price: None,
        exit_on_call: 3,
        exit_side: OrderSide::Sell,
        calls: 0,
    });

    let mut engine = Engine::new(
        cfg,
        &loader(data),
        strategy,
        risk_manager(limits()),
        Box::new(FixedSlippage { bps: dec!(0) }),
    )
    .unwrap();

    let result = engine.run().unwrap();

    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].realized_pnl, dec!(10));
    assert_eq!(result.equity_curve.last().unwrap().equity, dec!(10_010));
}

/// Scenario 3: a position held through a crash that drives equity to exactly 7500
/// (a 25% drawdown from the 10000 peak) breaches a tighter 20% limit, latches the
/// kill switch, liquidates the open position as the sole trade, and blocks every
/// signal the strategy emits afterward — the trade count never grows past that point.
#[test]
fn scenario_3_kill_switch_latches_at_quarter_drawdown_and_halts_new_trades() {
    let data = bars(&["100", "100", "37.5", "37.5"]);
    let tight_limits = RiskLimits { max_drawdown: dec!(0.2), ..limits() };
    let cfg = config_for(&data, tight_limits.clone());
    let strategy = Box::new(ScriptedRoundTrip {
        entry_on_call: 1,
        entry_side: OrderSide::Buy,
        entry_price: None,
        exit_on_call: 4,
        exit_side: OrderSide::Sell,
        calls: 0,
    });

    let mut engine = Engine::new(
        cfg,
        &loader(data),
        strategy,
        risk_manager(tight_limits),
        Box::new(FixedSlippage { bps: dec!(0) }),
    )
    .unwrap();

    let result = engine.run().unwrap();

    assert!(result.kill_switch_triggered);
    assert_eq!(result.kill_switch_reason.as_deref(), Some("max_drawdown"));
    assert_eq!(result.equity_curve.last().unwrap().equity, dec!(7_500));
    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].realized_pnl, dec!(-2_500));
}

/// Scenario 4: a limit buy at 99 stays pending while the mark sits above it and fills
/// the instant the mark touches 99, at bar index 3, at exactly the limit price with
/// zero slippage (the book never applies a `SlippageModel` to a `Limit` fill).
#[test]
fn scenario_4_limit_order_fills_at_bar_index_3_at_exact_limit_price() {
    let data = bars(&["100", "100", "99.5", "99", "98.5", "98"]);
    let cfg = config_for(&data, limits());
    let strategy = Box::new(ScriptedRoundTrip {
        entry_on_call: 1,
        entry_side: OrderSide::Buy,
        entry_price: Some(dec!(99)),
        exit_on_call: 5,
        exit_side: OrderSide::Sell,
        calls: 0,
    });
    let fill_bar_timestamp = data[3].timestamp;

    let mut engine = Engine::new(
        cfg,
        &loader(data),
        strategy,
        risk_manager(limits()),
        Box::new(FixedSlippage { bps: dec!(0) }),
    )
    .unwrap();

    let result = engine.run().unwrap();

    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].entry_price, dec!(99));
    assert_eq!(result.trades[0].entered_at, fill_bar_timestamp);
}
