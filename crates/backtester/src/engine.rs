use crate::error::BacktestError;
use crate::result::{BacktestResult, Progress};
use analytics::AnalyticsEngine;
use chrono::{DateTime, Utc};
use core_types::{Bar, EquityCurvePoint, MarketSnapshot, Order, OrderSide, OrderType, Trade};
use data_loader::DataLoader;
use execution::slippage::SlippageModel;
use execution::{apply_fill, OrderBook, Portfolio};
use parking_lot::RwLock;
use risk::{PortfolioSnapshot, RiskManager};
use rust_decimal::Decimal;
use sim_events::{Event, EventKind, EventQueue, FillPayload, KillSwitchPayload, RiskBreach};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use strategies::StrategySignalSource;
use uuid::Uuid;

/// Emit a progress snapshot every this many processed events.
const PROGRESS_INTERVAL: u64 = 10_000;

/// A cloneable handle a caller can use to request early termination of a running
/// `Engine::run` from another thread.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A consistent snapshot of engine progress, read by external observers under
/// `StateHandle`'s reader-writer lock. Unlike the progress channel, a read here never
/// misses an update — it just sees whatever the engine thread last wrote.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub events_processed: u64,
    pub total_events: u64,
    pub current_clock: Option<DateTime<Utc>>,
    pub trades_executed: usize,
    pub current_equity: Decimal,
    pub kill_switch_triggered: bool,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            events_processed: 0,
            total_events: 0,
            current_clock: None,
            trades_executed: 0,
            current_equity: Decimal::ZERO,
            kill_switch_triggered: false,
        }
    }
}

/// A cloneable handle onto the engine's state, guarded by a `parking_lot::RwLock`. The
/// engine thread holds the write lock only for the duration of copying its current
/// fields in; readers never block the engine for more than that trivial critical
/// section.
#[derive(Debug, Clone)]
pub struct StateHandle(Arc<RwLock<EngineState>>);

impl StateHandle {
    /// Returns a copy of the most recently published state.
    pub fn read(&self) -> EngineState {
        self.0.read().clone()
    }
}

/// The event-driven backtesting engine. Owns the event queue and every component the
/// loop dispatches into; nothing here performs I/O or awaits.
pub struct Engine {
    config: core_types::BacktestConfig,
    strategy: Box<dyn StrategySignalSource>,
    risk_manager: Box<dyn RiskManager>,
    slippage_model: Box<dyn SlippageModel>,
    portfolio: Portfolio,
    order_book: OrderBook,
    queue: EventQueue,
    bar_queues: HashMap<String, VecDeque<Bar>>,
    last_mark: HashMap<String, Decimal>,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityCurvePoint>,
    kill_switch_reason: Option<String>,
    risk_breach_count: u32,
    events_processed: u64,
    cancel: Arc<AtomicBool>,
    progress_tx: Option<SyncSender<Progress>>,
    state: Arc<RwLock<EngineState>>,
}

impl Engine {
    /// Materialises every symbol's bars up front via `data_loader` and seeds the event
    /// queue with one `MarketData` event per bar. Returns an error if the config is
    /// structurally invalid or any symbol has no data in the requested range.
    pub fn new(
        config: core_types::BacktestConfig,
        data_loader: &dyn DataLoader,
        strategy: Box<dyn StrategySignalSource>,
        risk_manager: Box<dyn RiskManager>,
        slippage_model: Box<dyn SlippageModel>,
    ) -> Result<Self, BacktestError> {
        config.validate()?;

        let mut queue = EventQueue::new();
        let mut bar_queues = HashMap::new();

        for symbol in &config.symbols {
            let bars = data_loader
                .load_bars(symbol, config.start_date, config.end_date)
                .map_err(|_| BacktestError::DataUnavailable(symbol.clone()))?;
            if bars.is_empty() {
                return Err(BacktestError::DataUnavailable(symbol.clone()));
            }
            for bar in &bars {
                queue.push(bar.timestamp, EventKind::MarketData { symbol: symbol.clone() });
            }
            bar_queues.insert(symbol.clone(), bars.into_iter().collect());
        }

        let portfolio = Portfolio::new(config.initial_capital, config.allow_short);

        Ok(Self {
            config,
            strategy,
            risk_manager,
            slippage_model,
            portfolio,
            order_book: OrderBook::new(),
            queue,
            bar_queues,
            last_mark: HashMap::new(),
            trades: Vec::new(),
            equity_curve: Vec::new(),
            kill_switch_reason: None,
            risk_breach_count: 0,
            events_processed: 0,
            cancel: Arc::new(AtomicBool::new(false)),
            progress_tx: None,
            state: Arc::new(RwLock::new(EngineState::default())),
        })
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancel))
    }

    pub fn with_progress_sender(mut self, tx: SyncSender<Progress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// A cloneable, lock-guarded handle external observers can poll for a consistent
    /// snapshot of engine progress from another thread.
    pub fn state_handle(&self) -> StateHandle {
        StateHandle(Arc::clone(&self.state))
    }

    fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            cash: self.portfolio.cash,
            equity: self.portfolio.equity(),
            positions: self.portfolio.positions.values().cloned().collect(),
        }
    }

    /// Drains the event queue to completion (or until cancelled) and assembles the final
    /// result. The only way this returns `Err` before exhausting the queue is an
    /// explicit cancellation or a propagated component error.
    pub fn run(&mut self) -> Result<BacktestResult, BacktestError> {
        let started_at = Utc::now();
        let total_events = self.queue.len() as u64;

        while let Some(event) = self.queue.pop() {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(BacktestError::Cancelled(self.events_processed));
            }

            self.dispatch(event)?;
            self.events_processed += 1;
            self.sync_state(total_events);

            if self.events_processed % PROGRESS_INTERVAL == 0 {
                self.emit_progress(total_events);
            }
        }

        self.sync_state(total_events);

        let periods_per_year = self.config.timeframe.periods_per_year();
        let analytics_engine = AnalyticsEngine::new();
        let report = analytics_engine.calculate(
            &self.trades,
            &self.equity_curve,
            self.config.initial_capital,
            periods_per_year,
        )?;

        tracing::info!(
            events = self.events_processed,
            trades = self.trades.len(),
            risk_breaches = self.risk_breach_count,
            "backtest run complete"
        );

        Ok(BacktestResult {
            config: self.config.clone(),
            report,
            trades: self.trades.clone(),
            equity_curve: self.equity_curve.clone(),
            events_processed: self.events_processed,
            kill_switch_triggered: self.kill_switch_reason.is_some(),
            kill_switch_reason: self.kill_switch_reason.clone(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Publishes a fresh snapshot for `StateHandle` readers. Holds the write lock only
    /// long enough to copy the current fields in.
    fn sync_state(&self, total_events: u64) {
        let mut guard = self.state.write();
        guard.events_processed = self.events_processed;
        guard.total_events = total_events;
        guard.current_clock = self.equity_curve.last().map(|p| p.timestamp);
        guard.trades_executed = self.trades.len();
        guard.current_equity = self.portfolio.equity();
        guard.kill_switch_triggered = self.kill_switch_reason.is_some();
    }

    fn emit_progress(&self, total_events: u64) {
        if let Some(tx) = &self.progress_tx {
            let progress = Progress {
                events_processed: self.events_processed,
                total_events,
                current_clock: self.equity_curve.last().map(|p| p.timestamp).unwrap_or_default(),
                trades_executed: self.trades.len(),
                current_equity: self.portfolio.equity(),
            };
            let _ = tx.try_send(progress);
        }
    }

    fn dispatch(&mut self, event: Event) -> Result<(), BacktestError> {
        match event.kind {
            EventKind::MarketData { symbol } => self.handle_market_data(event.timestamp, &symbol),
            EventKind::Signal(signal) => self.handle_signal(event.timestamp, signal),
            EventKind::Order(order) => self.handle_order(event.timestamp, order),
            EventKind::Fill(payload) => self.handle_fill(event.timestamp, payload),
            EventKind::Risk(breach) => {
                self.handle_risk(breach);
                Ok(())
            }
            EventKind::KillSwitch(payload) => self.handle_kill_switch(event.timestamp, payload),
        }
    }

    fn handle_market_data(&mut self, timestamp: DateTime<Utc>, symbol: &str) -> Result<(), BacktestError> {
        let bar = match self.bar_queues.get_mut(symbol).and_then(VecDeque::pop_front) {
            Some(bar) => bar,
            None => return Ok(()),
        };

        self.portfolio.update_price(symbol, bar.close);
        self.last_mark.insert(symbol.to_string(), bar.close);

        let snapshot = MarketSnapshot::from(bar.clone());
        let fills = self
            .order_book
            .evaluate(symbol, &snapshot, self.slippage_model.as_ref());
        for fill in fills {
            let commission = self.config.commission * fill.price * fill.quantity;
            self.queue.push(
                timestamp,
                EventKind::Fill(FillPayload {
                    order_id: fill.order_id,
                    symbol: fill.symbol,
                    side: fill.side,
                    price: fill.price,
                    quantity: fill.quantity,
                    commission,
                    slippage: fill.slippage_fraction,
                }),
            );
        }

        if let Some(signal) = self.strategy.on_bar(&bar)? {
            self.queue.push(timestamp, EventKind::Signal(signal));
        }

        let equity = self.portfolio.equity();
        self.equity_curve.push(EquityCurvePoint {
            timestamp,
            equity,
            cash: self.portfolio.cash,
            drawdown: self.portfolio.drawdown(),
        });

        let portfolio_snapshot = self.snapshot();
        if let Some(reason) = self.risk_manager.check(&portfolio_snapshot) {
            self.queue.push(
                timestamp,
                EventKind::KillSwitch(KillSwitchPayload {
                    reason: reason.as_str().to_string(),
                    equity_at_trigger: equity,
                }),
            );
        }

        Ok(())
    }

    fn handle_signal(&mut self, timestamp: DateTime<Utc>, signal: core_types::Signal) -> Result<(), BacktestError> {
        let snapshot = self.snapshot();
        let existing = self.portfolio.positions.get(&signal.symbol).cloned();
        let is_exit = existing
            .as_ref()
            .map(|p| p.quantity.is_sign_positive() != (signal.side == OrderSide::Buy))
            .unwrap_or(false);

        if !self.risk_manager.allow_signal(&snapshot, is_exit) {
            return Ok(());
        }

        let mark = self
            .last_mark
            .get(&signal.symbol)
            .copied()
            .unwrap_or_else(|| signal.price.unwrap_or(Decimal::ZERO));

        let quantity = if is_exit {
            existing.map(|p| p.quantity.abs()).unwrap_or(Decimal::ZERO)
        } else {
            let entry_price = signal.price.unwrap_or(mark);
            match self.risk_manager.size_signal(&snapshot, entry_price, signal.confidence) {
                Ok(qty) => qty,
                Err(_) => return Ok(()),
            }
        };

        if quantity.is_zero() {
            return Ok(());
        }

        let order_type = if signal.price.is_none() {
            OrderType::Market
        } else {
            OrderType::Limit
        };

        let order = Order::new(
            signal.symbol.clone(),
            signal.side,
            order_type,
            quantity,
            signal.price,
            None,
            timestamp,
        );
        self.queue.push(timestamp, EventKind::Order(order));
        Ok(())
    }

    fn handle_order(&mut self, _timestamp: DateTime<Utc>, order: Order) -> Result<(), BacktestError> {
        let snapshot = self.snapshot();
        let mark = self
            .last_mark
            .get(&order.symbol)
            .copied()
            .unwrap_or_else(|| order.price.unwrap_or(Decimal::ZERO));
        let notional = order.quantity * order.price.unwrap_or(mark);

        if !self.risk_manager.allow_order(notional, &snapshot) {
            return Ok(());
        }

        self.order_book.submit(order)?;
        Ok(())
    }

    fn handle_fill(&mut self, timestamp: DateTime<Utc>, payload: FillPayload) -> Result<(), BacktestError> {
        let pre_position = self.portfolio.positions.get(&payload.symbol).cloned();

        let realized_pnl = apply_fill(
            &mut self.portfolio,
            payload.side,
            &payload.symbol,
            payload.quantity,
            payload.price,
            payload.commission,
            timestamp,
        )?;

        if let (Some(pnl), Some(entry)) = (realized_pnl, pre_position) {
            self.trades.push(Trade {
                id: Uuid::new_v4(),
                symbol: payload.symbol.clone(),
                side: payload.side,
                quantity: payload.quantity,
                entry_price: entry.avg_entry_price,
                exit_price: payload.price,
                realized_pnl: pnl,
                commission: payload.commission,
                slippage: payload.slippage * payload.price * payload.quantity,
                entered_at: entry.opened_at,
                executed_at: timestamp,
            });
            self.risk_manager.record_trade_result(pnl);
        }

        Ok(())
    }

    fn handle_risk(&mut self, breach: RiskBreach) {
        self.risk_breach_count += 1;
        tracing::warn!(reason = %breach.reason, drawdown = %breach.drawdown, "risk breach recorded");
    }

    fn handle_kill_switch(&mut self, timestamp: DateTime<Utc>, payload: KillSwitchPayload) -> Result<(), BacktestError> {
        if self.kill_switch_reason.is_some() {
            return Ok(());
        }

        for (symbol, position) in self.portfolio.positions.clone() {
            let pnl = position.quantity * (position.current_price - position.avg_entry_price);
            self.trades.push(Trade {
                id: Uuid::new_v4(),
                symbol,
                side: if position.quantity.is_sign_positive() {
                    OrderSide::Sell
                } else {
                    OrderSide::Buy
                },
                quantity: position.quantity.abs(),
                entry_price: position.avg_entry_price,
                exit_price: position.current_price,
                realized_pnl: pnl,
                commission: Decimal::ZERO,
                slippage: Decimal::ZERO,
                entered_at: position.opened_at,
                executed_at: timestamp,
            });
        }

        self.portfolio.close_all(timestamp);
        self.kill_switch_reason = Some(payload.reason);
        tracing::warn!(equity = %payload.equity_at_trigger, "kill switch triggered, positions liquidated");
        Ok(())
    }
}
