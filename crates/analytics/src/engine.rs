use crate::error::AnalyticsError;
use crate::report::PerformanceReport;
use crate::stats;
use core_types::{EquityCurvePoint, Trade};
use rust_decimal::Decimal;

/// A stateless calculator for deriving performance metrics from trading activity.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// `periods_per_year` annualises the Sharpe/Sortino/return figures and should match
    /// the cadence of `equity_curve` (e.g. 252 for daily bars, 252*6.5*60 for minute bars).
    pub fn calculate(
        &self,
        trades: &[Trade],
        equity_curve: &[EquityCurvePoint],
        initial_capital: Decimal,
        periods_per_year: u32,
    ) -> Result<PerformanceReport, AnalyticsError> {
        let mut report = PerformanceReport::new();

        self.calculate_drawdown(equity_curve, &mut report)?;
        self.calculate_ratios(equity_curve, periods_per_year, &mut report)?;

        if trades.is_empty() {
            return Ok(report);
        }

        self.calculate_profitability(trades, initial_capital, &mut report)?;
        self.calculate_time_metrics(trades, &mut report)?;

        if report.max_drawdown_pct > Decimal::ZERO {
            report.calmar_ratio = Some(report.annualized_return_pct / report.max_drawdown_pct);
        }

        Ok(report)
    }

    /// Calculates all profitability-related metrics.
    fn calculate_profitability(
        &self,
        trades: &[Trade],
        initial_capital: Decimal,
        report: &mut PerformanceReport,
    ) -> Result<(), AnalyticsError> {
        report.total_trades = trades.len();

        for trade in trades {
            let pnl = trade.realized_pnl;
            report.total_net_profit += pnl;

            if pnl.is_sign_positive() {
                report.gross_profit += pnl;
                report.winning_trades += 1;
                report.largest_win = report.largest_win.max(pnl);
            } else {
                report.gross_loss += pnl.abs();
                report.losing_trades += 1;
                report.largest_loss = report.largest_loss.min(pnl);
            }
        }

        if report.gross_loss > Decimal::ZERO {
            report.profit_factor = Some(report.gross_profit / report.gross_loss);
        }

        if report.total_trades > 0 {
            let win_rate =
                Decimal::from(report.winning_trades) / Decimal::from(report.total_trades);
            report.win_rate_pct = Some(win_rate * Decimal::from(100));

            if report.winning_trades > 0 {
                report.average_win = report.gross_profit / Decimal::from(report.winning_trades);
            }
            if report.losing_trades > 0 {
                report.average_loss = report.gross_loss / Decimal::from(report.losing_trades);
                report.payoff_ratio = Some(report.average_win / report.average_loss);
            }

            let loss_rate = Decimal::ONE - win_rate;
            report.expectancy = win_rate * report.average_win - loss_rate * report.average_loss;
        }

        if initial_capital > Decimal::ZERO {
            report.total_return_pct =
                (report.total_net_profit / initial_capital) * Decimal::from(100);
        }

        Ok(())
    }

    /// Calculates maximum drawdown and the timestamp it occurred at.
    fn calculate_drawdown(
        &self,
        equity_curve: &[EquityCurvePoint],
        report: &mut PerformanceReport,
    ) -> Result<(), AnalyticsError> {
        if equity_curve.is_empty() {
            return Ok(());
        }

        let mut peak_equity = equity_curve[0].equity;
        let mut max_drawdown = Decimal::ZERO;
        let mut max_drawdown_pct = Decimal::ZERO;
        let mut max_drawdown_at = None;

        for point in equity_curve {
            if point.equity > peak_equity {
                peak_equity = point.equity;
            }
            let drawdown = peak_equity - point.equity;
            if peak_equity > Decimal::ZERO {
                let drawdown_pct = drawdown / peak_equity;
                if drawdown_pct > max_drawdown_pct {
                    max_drawdown = drawdown;
                    max_drawdown_pct = drawdown_pct;
                    max_drawdown_at = Some(point.timestamp);
                }
            }
        }

        report.max_drawdown = max_drawdown;
        report.max_drawdown_at = max_drawdown_at;
        report.max_drawdown_pct = max_drawdown_pct * Decimal::from(100);

        Ok(())
    }

    /// Calculates Sharpe, Sortino, and the VaR/CVaR tail-risk measures. Converts the
    /// per-period equity returns to `f64` at this function's boundary and converts every
    /// result back to `Decimal` before returning.
    fn calculate_ratios(
        &self,
        equity_curve: &[EquityCurvePoint],
        periods_per_year: u32,
        report: &mut PerformanceReport,
    ) -> Result<(), AnalyticsError> {
        let levels: Vec<Decimal> = equity_curve.iter().map(|p| p.equity).collect();
        let returns = stats::period_returns_f64(&levels);

        if returns.len() < 2 {
            return Ok(());
        }

        let mean_return = stats::mean(&returns);
        let stdev = stats::sample_stdev(&returns);
        let annualisation = (periods_per_year.max(1) as f64).sqrt();

        report.annualized_return_pct =
            stats::decimal(mean_return * periods_per_year.max(1) as f64 * 100.0);

        if stdev > 0.0 {
            report.sharpe_ratio = Some(stats::decimal((mean_return / stdev) * annualisation));
        } else {
            report.sharpe_ratio = Some(Decimal::ZERO);
        }

        let downside = stats::downside_stdev(&returns);
        if downside > 0.0 {
            report.sortino_ratio = Some(stats::decimal((mean_return / downside) * annualisation));
        } else {
            report.sortino_ratio = Some(Decimal::ZERO);
        }

        report.var_95_pct = Some(stats::decimal(-stats::percentile(&returns, 0.05) * 100.0));
        report.var_99_pct = Some(stats::decimal(-stats::percentile(&returns, 0.01) * 100.0));
        report.cvar_95_pct = Some(stats::decimal(-stats::tail_mean(&returns, 0.05) * 100.0));

        Ok(())
    }

    /// Calculates time-based metrics.
    fn calculate_time_metrics(
        &self,
        trades: &[Trade],
        report: &mut PerformanceReport,
    ) -> Result<(), AnalyticsError> {
        if trades.is_empty() {
            return Ok(());
        }

        let total_duration_secs: i64 = trades
            .iter()
            .map(|t| (t.executed_at - t.entered_at).num_seconds())
            .sum();

        let avg_secs = total_duration_secs / trades.len() as i64;
        report.average_holding_period = chrono::Duration::seconds(avg_secs);

        Ok(())
    }
}
