//! Earning-power trajectory: growth against cash conversion, window by
//! window.
//!
//! A window ending at period `e` measures the 3-year PAT CAGR from `e-3` to
//! `e` and the average CFO/PAT over `e-2..=e` (loss years skipped). The
//! window's quadrant is read off both against the configured thresholds:
//!
//! | | high cash | low cash |
//! |---|---|---|
//! | high growth | STAR | INVESTIGATE |
//! | low growth | CASH_COW | RED_FLAG |

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, TrajectoryConfig};
use crate::series::math::{average, cagr_between, percent};
use crate::series::{FinancialSeries, LineItem};
use crate::types::{Outcome, Percent};

pub const TRAJECTORY_MIN_PERIODS: usize = 4;

const CAGR_YEARS: usize = 3;
const CASH_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Quadrant {
    Star,
    Investigate,
    CashCow,
    RedFlag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryPattern {
    ConsistentCompounder,
    Turnaround,
    Maturing,
    Stable,
    Transitioning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Last period of the window.
    pub period: NaiveDate,
    pub pat_cagr_3y: Option<Percent>,
    pub average_cfo_to_pat: Option<Percent>,
    pub quadrant: Quadrant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningPowerTrajectory {
    pub trajectory: Vec<TrajectoryPoint>,
    pub current_quadrant: Quadrant,
    pub pattern: TrajectoryPattern,
}

fn quadrant(
    growth: Option<Percent>,
    cash: Option<Percent>,
    thresholds: &TrajectoryConfig,
) -> Quadrant {
    let high_growth = growth.is_some_and(|g| g > thresholds.growth_threshold);
    let high_cash = cash.is_some_and(|c| c > thresholds.cash_conversion_threshold);
    match (high_growth, high_cash) {
        (true, true) => Quadrant::Star,
        (true, false) => Quadrant::Investigate,
        (false, true) => Quadrant::CashCow,
        (false, false) => Quadrant::RedFlag,
    }
}

/// Classify the shape of the trailing two or three windows.
pub fn classify_pattern(quadrants: &[Quadrant]) -> TrajectoryPattern {
    let tail = &quadrants[quadrants.len().saturating_sub(3)..];
    match tail {
        [Quadrant::Star, Quadrant::Star, Quadrant::Star] => TrajectoryPattern::ConsistentCompounder,
        [.., Quadrant::Star] if tail.contains(&Quadrant::RedFlag) => TrajectoryPattern::Turnaround,
        [.., Quadrant::Star, Quadrant::CashCow] => TrajectoryPattern::Maturing,
        [.., previous, current] if previous == current => TrajectoryPattern::Stable,
        [_] | [] => TrajectoryPattern::Stable,
        _ => TrajectoryPattern::Transitioning,
    }
}

fn window(fs: &FinancialSeries, end: usize, thresholds: &TrajectoryConfig) -> TrajectoryPoint {
    let pat_cagr_3y = cagr_between(
        fs.value_back(LineItem::NetProfit, end, CAGR_YEARS),
        fs.value(LineItem::NetProfit, end),
        CAGR_YEARS,
    );
    let cash_ratios: Vec<Option<Percent>> = (end + 1 - CASH_WINDOW..=end)
        .map(|i| {
            let profit = fs
                .value(LineItem::NetProfit, i)
                .filter(|np| *np > Decimal::ZERO);
            percent(fs.value(LineItem::Cfo, i), profit)
        })
        .collect();
    let average_cfo_to_pat = average(&cash_ratios);

    TrajectoryPoint {
        period: fs.periods()[end],
        pat_cagr_3y,
        average_cfo_to_pat,
        quadrant: quadrant(pat_cagr_3y, average_cfo_to_pat, thresholds),
    }
}

/// Build the trajectory across every complete window. Needs four periods.
pub fn calculate_trajectory(
    fs: &FinancialSeries,
    config: &AnalysisConfig,
) -> Outcome<EarningPowerTrajectory> {
    Outcome::require(TRAJECTORY_MIN_PERIODS, fs.len(), || {
        let trajectory: Vec<TrajectoryPoint> = (CAGR_YEARS..fs.len())
            .map(|end| window(fs, end, &config.trajectory))
            .collect();
        let quadrants: Vec<Quadrant> = trajectory.iter().map(|p| p.quadrant).collect();
        let current_quadrant = quadrants.last().copied().unwrap_or(Quadrant::RedFlag);

        EarningPowerTrajectory {
            pattern: classify_pattern(&quadrants),
            current_quadrant,
            trajectory,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::FinancialSeriesInput;
    use rust_decimal_macros::dec;
    use super::Quadrant::*;

    #[test]
    fn test_quadrant_thresholds_are_strict() {
        let t = TrajectoryConfig::default();
        assert_eq!(quadrant(Some(dec!(16)), Some(dec!(90)), &t), Star);
        assert_eq!(quadrant(Some(dec!(16)), Some(dec!(80)), &t), Investigate);
        assert_eq!(quadrant(Some(dec!(15)), Some(dec!(81)), &t), CashCow);
        assert_eq!(quadrant(None, None, &t), RedFlag);
    }

    #[test]
    fn test_patterns() {
        assert_eq!(
            classify_pattern(&[CashCow, Star, Star, Star]),
            TrajectoryPattern::ConsistentCompounder
        );
        assert_eq!(classify_pattern(&[RedFlag, Investigate, Star]), TrajectoryPattern::Turnaround);
        assert_eq!(classify_pattern(&[RedFlag, Star]), TrajectoryPattern::Turnaround);
        assert_eq!(classify_pattern(&[Investigate, Star, CashCow]), TrajectoryPattern::Maturing);
        assert_eq!(classify_pattern(&[Star, CashCow, CashCow]), TrajectoryPattern::Stable);
        assert_eq!(classify_pattern(&[Star]), TrajectoryPattern::Stable);
        assert_eq!(
            classify_pattern(&[CashCow, Investigate]),
            TrajectoryPattern::Transitioning
        );
    }

    #[test]
    fn test_trajectory_windows() {
        // PAT doubles every three years with CFO at 100% of profit.
        let profit = [dec!(100), dec!(126), dec!(159), dec!(200), dec!(252)];
        let fs = FinancialSeriesInput::fiscal_years(2019, 5)
            .with(LineItem::NetProfit, &profit)
            .with(LineItem::Cfo, &profit)
            .build()
            .unwrap();
        let t = calculate_trajectory(&fs, &AnalysisConfig::default())
            .computed()
            .cloned()
            .unwrap();
        assert_eq!(t.trajectory.len(), 2);
        assert_eq!(t.trajectory[0].period, fs.periods()[3]);
        assert!((t.trajectory[0].pat_cagr_3y.unwrap() - dec!(25.99)).abs() < dec!(0.01));
        assert_eq!(t.trajectory[0].average_cfo_to_pat, Some(dec!(100)));
        assert_eq!(t.current_quadrant, Star);
        assert_eq!(t.pattern, TrajectoryPattern::Stable);
    }

    #[test]
    fn test_three_periods_is_insufficient() {
        let fs = FinancialSeriesInput::fiscal_years(2021, 3).build().unwrap();
        assert!(!calculate_trajectory(&fs, &AnalysisConfig::default()).is_computed());
    }
}
