use crate::error::RiskError;
use crate::sizing;
use core_types::{Position, RiskLimits};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A read-only view of the portfolio the risk manager needs to size signals and check
/// for breaches, decoupled from `execution::Portfolio` so this crate stays a pure-logic
/// leaf with no dependency on the execution layer.
#[derive(Debug, Clone)]
pub struct PortfolioSnapshot {
    pub cash: Decimal,
    pub equity: Decimal,
    pub positions: Vec<Position>,
}

/// Why the kill switch latched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillSwitchReason {
    MaxDrawdown,
    MaxDailyLoss,
    ConsecutiveLosses,
}

impl KillSwitchReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            KillSwitchReason::MaxDrawdown => "max_drawdown",
            KillSwitchReason::MaxDailyLoss => "max_daily_loss",
            KillSwitchReason::ConsecutiveLosses => "max_consecutive_losses",
        }
    }
}

/// The capability the engine consults before accepting a signal or order, and after
/// every market-data event to check for a breach.
pub trait RiskManager: Send + Sync {
    /// Called once per market-data event. Latches the kill switch and returns the
    /// reason the first time a configured threshold is breached; returns `None` once
    /// latched or while all thresholds hold.
    fn check(&mut self, portfolio: &PortfolioSnapshot) -> Option<KillSwitchReason>;

    /// Gate applied before sizing a signal. `is_exit` signals are always allowed through
    /// the open-position-count check since they reduce, not add, exposure.
    fn allow_signal(&self, portfolio: &PortfolioSnapshot, is_exit: bool) -> bool;

    /// Gate applied to a sized order before it reaches the order book.
    fn allow_order(&self, notional: Decimal, portfolio: &PortfolioSnapshot) -> bool;

    /// Sizes a signal into a quantity using the manager's configured sizing rule.
    fn size_signal(
        &self,
        portfolio: &PortfolioSnapshot,
        entry_price: Decimal,
        confidence: Decimal,
    ) -> Result<Decimal, RiskError>;

    /// Feeds a realised trade PnL back in so the consecutive-loss breach can track it.
    fn record_trade_result(&mut self, realized_pnl: Decimal);

    fn is_kill_switch_active(&self) -> bool;
}

/// A concrete `RiskManager` sizing by fixed-fractional risk and gating on the limits in
/// `RiskLimits`, including the kill switch.
#[derive(Debug, Clone)]
pub struct SimpleRiskManager {
    limits: RiskLimits,
    risk_per_trade_pct: Decimal,
    stop_loss_pct: Decimal,
    peak_equity: Decimal,
    daily_start_equity: Decimal,
    consecutive_losses: u32,
    kill_switch_active: bool,
}

impl SimpleRiskManager {
    pub fn new(
        limits: RiskLimits,
        risk_per_trade_pct: Decimal,
        stop_loss_pct: Decimal,
        starting_equity: Decimal,
    ) -> Result<Self, RiskError> {
        if risk_per_trade_pct <= Decimal::ZERO || risk_per_trade_pct >= Decimal::ONE {
            return Err(RiskError::InvalidParameters(
                "risk_per_trade_pct must be between 0 and 1".to_string(),
            ));
        }
        if stop_loss_pct <= Decimal::ZERO {
            return Err(RiskError::InvalidParameters(
                "stop_loss_pct must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            limits,
            risk_per_trade_pct,
            stop_loss_pct,
            peak_equity: starting_equity,
            daily_start_equity: starting_equity,
            consecutive_losses: 0,
            kill_switch_active: false,
        })
    }

    /// Resets the daily-loss baseline. The loop never calls this on its own — a caller
    /// driving a multi-day run is expected to call it at each day boundary.
    pub fn reset_daily_baseline(&mut self, equity: Decimal) {
        self.daily_start_equity = equity;
    }
}

impl RiskManager for SimpleRiskManager {
    fn check(&mut self, portfolio: &PortfolioSnapshot) -> Option<KillSwitchReason> {
        if self.kill_switch_active {
            return None;
        }

        if portfolio.equity > self.peak_equity {
            self.peak_equity = portfolio.equity;
        }

        let drawdown = if self.peak_equity.is_zero() {
            Decimal::ZERO
        } else {
            (self.peak_equity - portfolio.equity) / self.peak_equity
        };
        if drawdown > self.limits.max_drawdown {
            self.kill_switch_active = true;
            tracing::warn!(%drawdown, "risk: max_drawdown breached, latching kill switch");
            return Some(KillSwitchReason::MaxDrawdown);
        }

        let daily_loss = if self.daily_start_equity.is_zero() {
            Decimal::ZERO
        } else {
            (self.daily_start_equity - portfolio.equity) / self.daily_start_equity
        };
        if daily_loss > self.limits.max_daily_loss {
            self.kill_switch_active = true;
            tracing::warn!(%daily_loss, "risk: max_daily_loss breached, latching kill switch");
            return Some(KillSwitchReason::MaxDailyLoss);
        }

        if let Some(max_losses) = self.limits.max_consecutive_losses {
            if self.consecutive_losses >= max_losses {
                self.kill_switch_active = true;
                tracing::warn!(
                    consecutive_losses = self.consecutive_losses,
                    "risk: max_consecutive_losses breached, latching kill switch"
                );
                return Some(KillSwitchReason::ConsecutiveLosses);
            }
        }

        None
    }

    fn allow_signal(&self, portfolio: &PortfolioSnapshot, is_exit: bool) -> bool {
        if self.kill_switch_active {
            return false;
        }
        if is_exit {
            return true;
        }
        (portfolio.positions.len() as u32) < self.limits.max_open_positions
    }

    fn allow_order(&self, notional: Decimal, portfolio: &PortfolioSnapshot) -> bool {
        if self.kill_switch_active {
            return false;
        }
        if portfolio.equity.is_zero() {
            return false;
        }
        notional / portfolio.equity <= self.limits.max_position_size
    }

    fn size_signal(
        &self,
        portfolio: &PortfolioSnapshot,
        entry_price: Decimal,
        confidence: Decimal,
    ) -> Result<Decimal, RiskError> {
        if entry_price <= Decimal::ZERO {
            return Err(RiskError::InvalidEntryPrice(entry_price));
        }
        if portfolio.equity <= Decimal::ZERO {
            return Err(RiskError::InsufficientEquity(portfolio.equity));
        }

        let confidence = confidence.max(Decimal::ZERO).min(Decimal::ONE);
        let sized = sizing::fixed_fractional(
            portfolio.equity,
            self.risk_per_trade_pct * confidence,
            entry_price,
            self.stop_loss_pct,
            self.limits.max_position_size,
        );

        let rounded = sized.round_dp(6);
        let min_order_size = dec!(0.0001);
        if rounded < min_order_size {
            return Err(RiskError::Calculation(format!(
                "sized quantity {} is below minimum order size {}",
                rounded, min_order_size
            )));
        }
        Ok(rounded)
    }

    fn record_trade_result(&mut self, realized_pnl: Decimal) {
        if realized_pnl.is_sign_negative() {
            self.consecutive_losses += 1;
        } else {
            self.consecutive_losses = 0;
        }
    }

    fn is_kill_switch_active(&self) -> bool {
        self.kill_switch_active
    }
}
