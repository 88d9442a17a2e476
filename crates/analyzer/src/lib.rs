//! # Viability Checker
//!
//! Grades a completed backtest across four dimensions — returns, risk, consistency, and
//! robustness — against configurable thresholds. There is exactly one run to grade
//! rather than many to rank, so the usual filter-then-score shape collapses into a
//! single weighted-average score plus a list of issues and strengths.
//!
//! Kept to a layer-3 dependency on `analytics` and `core-types` only: this crate never
//! reaches into `backtester`, `monte-carlo`, or `wfo` for their result types. Callers
//! that ran a walk-forward analysis pass its aggregate numbers in through
//! `RobustnessInput` rather than this crate taking a dependency on `wfo` just to read
//! two fields off its result.

pub mod error;

use core_types::EquityCurvePoint;
use error::AnalyzerError;
use analytics::PerformanceReport;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// How serious an issue found during grading is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// One finding surfaced during grading, paired with its severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

/// Letter grade mapped from the overall 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    fn from_score(score: Decimal) -> Self {
        if score >= dec!(90) {
            Grade::A
        } else if score >= dec!(80) {
            Grade::B
        } else if score >= dec!(70) {
            Grade::C
        } else if score >= dec!(60) {
            Grade::D
        } else {
            Grade::F
        }
    }
}

/// The out-of-sample aggregate numbers a walk-forward analysis produced, passed in by
/// the caller rather than read from a `wfo::WalkForwardResult` directly.
#[derive(Debug, Clone, Copy)]
pub struct RobustnessInput {
    pub fraction_positive_out_sample: Decimal,
    pub degradation_ratio: Decimal,
}

/// The thresholds the four dimensions are scored against. Each `target_*` maps to a
/// sub-score of 100, each `floor_*`/`ceiling_*` maps to a sub-score of 0, with linear
/// interpolation in between a fixed anchor pair, rather than the min/max of a batch of
/// competing runs.
#[derive(Debug, Clone, Copy)]
pub struct ViabilityThresholds {
    pub floor_return_pct: Decimal,
    pub target_return_pct: Decimal,
    pub target_profit_factor: Decimal,
    pub ceiling_drawdown_pct: Decimal,
    pub floor_drawdown_pct: Decimal,
    pub target_sharpe: Decimal,
    pub floor_sharpe: Decimal,
    pub target_win_rate_pct: Decimal,
    pub floor_win_rate_pct: Decimal,
    pub critical_drawdown_pct: Decimal,
}

impl Default for ViabilityThresholds {
    fn default() -> Self {
        Self {
            floor_return_pct: dec!(0),
            target_return_pct: dec!(30),
            target_profit_factor: dec!(2),
            ceiling_drawdown_pct: dec!(0.05),
            floor_drawdown_pct: dec!(0.40),
            target_sharpe: dec!(2),
            floor_sharpe: dec!(-0.5),
            target_win_rate_pct: dec!(0.60),
            floor_win_rate_pct: dec!(0.30),
            critical_drawdown_pct: dec!(0.50),
        }
    }
}

/// The complete grading output for one backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViabilityReport {
    pub returns_score: Decimal,
    pub risk_score: Decimal,
    pub consistency_score: Decimal,
    pub robustness_score: Decimal,
    pub overall_score: Decimal,
    pub grade: Grade,
    pub viable: bool,
    pub issues: Vec<Issue>,
    pub strengths: Vec<String>,
}

const RETURNS_WEIGHT: Decimal = dec!(0.30);
const RISK_WEIGHT: Decimal = dec!(0.30);
const CONSISTENCY_WEIGHT: Decimal = dec!(0.20);
const ROBUSTNESS_WEIGHT: Decimal = dec!(0.20);

/// Grades backtest results against a fixed set of thresholds.
pub struct Analyzer {
    thresholds: ViabilityThresholds,
}

impl Analyzer {
    pub fn new(thresholds: ViabilityThresholds) -> Self {
        Self { thresholds }
    }

    /// Grades `report` across the four dimensions. `equity_curve` must be the same run's
    /// curve (used for the consistency dimension); `robustness` is `None` when no
    /// walk-forward analysis was run for this backtest.
    pub fn grade(
        &self,
        report: &PerformanceReport,
        equity_curve: &[EquityCurvePoint],
        robustness: Option<RobustnessInput>,
    ) -> Result<ViabilityReport, AnalyzerError> {
        if report.total_trades == 0 {
            return Err(AnalyzerError::NoTrades);
        }

        let mut issues = Vec::new();
        let mut strengths = Vec::new();

        let returns_score = self.score_returns(report, &mut issues, &mut strengths);
        let risk_score = self.score_risk(report, &mut issues, &mut strengths);
        let consistency_score = self.score_consistency(report, equity_curve, &mut issues, &mut strengths);
        let robustness_score = self.score_robustness(robustness, &mut issues, &mut strengths);

        let overall_score = returns_score * RETURNS_WEIGHT
            + risk_score * RISK_WEIGHT
            + consistency_score * CONSISTENCY_WEIGHT
            + robustness_score * ROBUSTNESS_WEIGHT;

        let grade = Grade::from_score(overall_score);
        let has_critical = issues.iter().any(|i| i.severity == Severity::Critical);
        let viable = !has_critical && overall_score >= dec!(60);

        Ok(ViabilityReport {
            returns_score,
            risk_score,
            consistency_score,
            robustness_score,
            overall_score,
            grade,
            viable,
            issues,
            strengths,
        })
    }

    fn score_returns(
        &self,
        report: &PerformanceReport,
        issues: &mut Vec<Issue>,
        strengths: &mut Vec<String>,
    ) -> Decimal {
        let t = &self.thresholds;
        let return_component = scale(report.total_return_pct, t.floor_return_pct, t.target_return_pct);
        let pf_component = match report.profit_factor {
            Some(pf) => scale(pf, Decimal::ONE, t.target_profit_factor),
            None => dec!(100),
        };
        let score = (return_component + pf_component) / dec!(2);

        if report.total_return_pct < Decimal::ZERO {
            issues.push(Issue {
                severity: Severity::Critical,
                message: "total return is negative".to_string(),
            });
        }
        match report.profit_factor {
            Some(pf) if pf < Decimal::ONE => issues.push(Issue {
                severity: Severity::Critical,
                message: format!("profit factor {} is below breakeven", pf),
            }),
            _ => {}
        }
        if score >= dec!(85) {
            strengths.push(format!("strong returns ({}% total)", report.total_return_pct));
        }
        score
    }

    fn score_risk(
        &self,
        report: &PerformanceReport,
        issues: &mut Vec<Issue>,
        strengths: &mut Vec<String>,
    ) -> Decimal {
        let t = &self.thresholds;
        let drawdown_component = scale(
            t.floor_drawdown_pct - report.max_drawdown_pct,
            t.floor_drawdown_pct - t.ceiling_drawdown_pct,
            t.floor_drawdown_pct - Decimal::ZERO,
        );
        let sharpe_component = match report.sharpe_ratio {
            Some(sharpe) => scale(sharpe, t.floor_sharpe, t.target_sharpe),
            None => dec!(50),
        };
        let score = (drawdown_component + sharpe_component) / dec!(2);

        if report.max_drawdown_pct >= t.critical_drawdown_pct {
            issues.push(Issue {
                severity: Severity::Critical,
                message: format!("max drawdown {}% exceeds the critical threshold", report.max_drawdown_pct),
            });
        } else if report.max_drawdown_pct >= t.ceiling_drawdown_pct {
            issues.push(Issue {
                severity: Severity::Warning,
                message: format!("max drawdown {}% is above the comfortable ceiling", report.max_drawdown_pct),
            });
        }
        if let Some(sharpe) = report.sharpe_ratio {
            if sharpe < Decimal::ZERO {
                issues.push(Issue {
                    severity: Severity::Warning,
                    message: "sharpe ratio is negative".to_string(),
                });
            } else if sharpe >= t.target_sharpe {
                strengths.push(format!("sharpe ratio {} meets the target", sharpe));
            }
        }
        score
    }

    fn score_consistency(
        &self,
        report: &PerformanceReport,
        equity_curve: &[EquityCurvePoint],
        issues: &mut Vec<Issue>,
        strengths: &mut Vec<String>,
    ) -> Decimal {
        let t = &self.thresholds;
        let win_rate_component = match report.win_rate_pct {
            Some(rate) => scale(rate, t.floor_win_rate_pct, t.target_win_rate_pct),
            None => dec!(50),
        };
        let smoothness_component = scale(positive_step_fraction(equity_curve), dec!(0.30), dec!(0.70));
        let score = (win_rate_component + smoothness_component) / dec!(2);

        if let Some(rate) = report.win_rate_pct {
            if rate < t.floor_win_rate_pct {
                issues.push(Issue {
                    severity: Severity::Warning,
                    message: format!("win rate {}% is below the comfortable floor", rate),
                });
            }
        }
        if report.losing_trades > 0 && report.winning_trades == 0 {
            issues.push(Issue {
                severity: Severity::Critical,
                message: "every trade lost".to_string(),
            });
        }
        if score >= dec!(85) {
            strengths.push("equity curve advances consistently".to_string());
        }
        score
    }

    fn score_robustness(
        &self,
        robustness: Option<RobustnessInput>,
        issues: &mut Vec<Issue>,
        strengths: &mut Vec<String>,
    ) -> Decimal {
        match robustness {
            None => {
                issues.push(Issue {
                    severity: Severity::Info,
                    message: "walk-forward validation was not run".to_string(),
                });
                dec!(50)
            }
            Some(input) => {
                let consistency = scale(input.fraction_positive_out_sample, Decimal::ZERO, Decimal::ONE);
                let degradation_component = scale(Decimal::ONE - input.degradation_ratio, dec!(0.5), Decimal::ONE);
                let score = (consistency + degradation_component) / dec!(2);

                if input.fraction_positive_out_sample < dec!(0.5) {
                    issues.push(Issue {
                        severity: Severity::Warning,
                        message: "fewer than half of out-of-sample windows were profitable".to_string(),
                    });
                }
                if input.degradation_ratio > dec!(0.5) {
                    issues.push(Issue {
                        severity: Severity::Critical,
                        message: "out-of-sample performance degraded by more than half versus in-sample".to_string(),
                    });
                }
                if score >= dec!(85) {
                    strengths.push("out-of-sample performance closely tracks in-sample".to_string());
                }
                score
            }
        }
    }
}

/// Maps `value` linearly from `[low, high]` into `[0, 100]`, clamped at both ends.
/// `low` may be greater than `high` to express an inverted (lower-is-better) metric.
fn scale(value: Decimal, low: Decimal, high: Decimal) -> Decimal {
    if low == high {
        return if value >= high { dec!(100) } else { dec!(0) };
    }
    let fraction = (value - low) / (high - low);
    (fraction * dec!(100)).clamp(Decimal::ZERO, dec!(100))
}

/// Fraction of consecutive equity-curve steps that were non-negative. A cheap,
/// timeframe-agnostic proxy for "how often does the curve advance rather than retreat".
fn positive_step_fraction(equity_curve: &[EquityCurvePoint]) -> Decimal {
    if equity_curve.len() < 2 {
        return dec!(0.5);
    }
    let mut positive = 0usize;
    let mut total = 0usize;
    for pair in equity_curve.windows(2) {
        total += 1;
        if pair[1].equity >= pair[0].equity {
            positive += 1;
        }
    }
    Decimal::from(positive as u64) / Decimal::from(total as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report_with(total_return_pct: Decimal, max_drawdown_pct: Decimal, sharpe: Option<Decimal>) -> PerformanceReport {
        let mut report = PerformanceReport::new();
        report.total_return_pct = total_return_pct;
        report.max_drawdown_pct = max_drawdown_pct;
        report.sharpe_ratio = sharpe;
        report.profit_factor = Some(dec!(1.8));
        report.win_rate_pct = Some(dec!(0.55));
        report.total_trades = 20;
        report.winning_trades = 11;
        report.losing_trades = 9;
        report
    }

    fn rising_curve() -> Vec<EquityCurvePoint> {
        let t0 = Utc::now();
        (0..10)
            .map(|i| EquityCurvePoint {
                timestamp: t0 + chrono::Duration::hours(i),
                equity: dec!(10000) + Decimal::from(i * 50),
                cash: dec!(10000),
                drawdown: Decimal::ZERO,
            })
            .collect()
    }

    #[test]
    fn strong_report_grades_highly_and_is_viable() {
        let analyzer = Analyzer::new(ViabilityThresholds::default());
        let report = report_with(dec!(35), dec!(0.03), Some(dec!(2.2)));
        let result = analyzer
            .grade(&report, &rising_curve(), Some(RobustnessInput {
                fraction_positive_out_sample: dec!(0.8),
                degradation_ratio: dec!(0.1),
            }))
            .unwrap();

        assert!(result.overall_score >= dec!(80));
        assert!(result.viable);
        assert!(!result.issues.iter().any(|i| i.severity == Severity::Critical));
    }

    #[test]
    fn negative_return_is_flagged_critical_and_not_viable() {
        let analyzer = Analyzer::new(ViabilityThresholds::default());
        let report = report_with(dec!(-10), dec!(0.20), Some(dec!(-0.2)));
        let result = analyzer.grade(&report, &rising_curve(), None).unwrap();

        assert!(result.issues.iter().any(|i| i.severity == Severity::Critical));
        assert!(!result.viable);
    }

    #[test]
    fn missing_robustness_input_is_informational_not_critical() {
        let analyzer = Analyzer::new(ViabilityThresholds::default());
        let report = report_with(dec!(20), dec!(0.05), Some(dec!(1.5)));
        let result = analyzer.grade(&report, &rising_curve(), None).unwrap();

        assert!(result
            .issues
            .iter()
            .any(|i| i.severity == Severity::Info && i.message.contains("walk-forward")));
    }

    #[test]
    fn zero_trades_is_rejected() {
        let analyzer = Analyzer::new(ViabilityThresholds::default());
        let report = PerformanceReport::new();
        let result = analyzer.grade(&report, &[], None);
        assert!(matches!(result, Err(AnalyzerError::NoTrades)));
    }

    #[test]
    fn grade_letters_map_to_score_bands() {
        assert_eq!(Grade::from_score(dec!(95)), Grade::A);
        assert_eq!(Grade::from_score(dec!(85)), Grade::B);
        assert_eq!(Grade::from_score(dec!(75)), Grade::C);
        assert_eq!(Grade::from_score(dec!(65)), Grade::D);
        assert_eq!(Grade::from_score(dec!(40)), Grade::F);
    }

    #[test]
    fn scale_clamps_outside_range() {
        assert_eq!(scale(dec!(-5), Decimal::ZERO, dec!(10)), Decimal::ZERO);
        assert_eq!(scale(dec!(15), Decimal::ZERO, dec!(10)), dec!(100));
        assert_eq!(scale(dec!(5), Decimal::ZERO, dec!(10)), dec!(50));
    }
}
