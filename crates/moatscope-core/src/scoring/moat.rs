//! Competitive-advantage period (CAP) and moat strength.
//!
//! CAP counts the trailing periods (up to seven) in which ROIC beat the
//! hurdle rate. The composite adds six signals for a maximum of 14 points:
//! ROIC sustainability (3), ROIC stability (2), pricing power (3), scale
//! efficiency (2), customer stickiness (2) and core earnings quality (2).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::ratios::snapshot::{asset_turnover, debtor_days, net_margin, operating_profit, roic_series};
use crate::scoring::breakdown::{ClassificationTable, DimensionScore, ScoreBreakdown};
use crate::scoring::wacc::{estimate_wacc, WaccEstimate};
use crate::series::math::{bucket_score, change, growth_pct, inverse_bucket_score, percent, stddev, Tier};
use crate::series::{FinancialSeries, LineItem};
use crate::types::{Days, Outcome, Percent, PeriodValue};

pub const MOAT_RUBRIC: &str = "MOAT_RUBRIC_V2";
pub const MOAT_METHODOLOGY: &str = "MOAT_RUBRIC_V2 (CAP plus six moat signals, 14 points)";

/// Minimum history for a moat assessment.
pub const MOAT_MIN_PERIODS: usize = 5;

const CAP_WINDOW: usize = 7;
const PRICING_WINDOW: usize = 5;
const SIGNAL_LOOKBACK: usize = 4;

const SUSTAINABILITY_TIERS: &[Tier] = &[(dec!(3), 1), (dec!(5), 2), (dec!(7), 3)];
const STABILITY_CEILINGS: &[Tier] = &[(dec!(10), 1), (dec!(5), 2)];

const CLASSIFICATIONS: &ClassificationTable = &[
    (11, "Exceptional"),
    (8, "Wide"),
    (5, "Narrow"),
    (0, "No Moat"),
];

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoatSignals {
    /// ROIC over the CAP window, oldest first.
    pub roic_window: Vec<PeriodValue>,
    pub roic_volatility: Option<Percent>,
    /// Latest net margin minus the margin four periods back.
    pub margin_trend: Option<Percent>,
    pub margin_volatility: Option<Percent>,
    /// Relative change in asset turnover over four periods.
    pub asset_turnover_change: Option<Percent>,
    pub sales_growth_4y: Option<Percent>,
    pub debtor_days_change: Option<Days>,
    /// Other income as a share of operating profit.
    pub other_income_share: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoatScore {
    pub wacc: WaccEstimate,
    /// Periods in the CAP window where ROIC exceeded WACC.
    pub cap_years: u32,
    pub cap_window: usize,
    pub signals: MoatSignals,
    pub breakdown: ScoreBreakdown,
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Number of observations strictly above the hurdle. Absent values and a
/// ROIC equal to WACC do not count.
pub fn competitive_advantage_period(roic: &[Option<Percent>], wacc: Percent) -> u32 {
    roic.iter().flatten().filter(|r| **r > wacc).count() as u32
}

fn pricing_power_points(trend: Option<Percent>, volatility: Option<Percent>) -> u32 {
    let expanding = trend.is_some_and(|t| t >= Decimal::ZERO);
    let steady = volatility.is_some_and(|s| s < dec!(3));
    match (expanding, steady) {
        (true, true) => 3,
        (true, false) | (false, true) => 2,
        _ if volatility.is_some_and(|s| s < dec!(5)) => 1,
        _ => 0,
    }
}

fn scale_points(turnover_change: Option<Percent>) -> u32 {
    match turnover_change {
        Some(c) if c > dec!(10) => 2,
        Some(c) if c > Decimal::ZERO => 1,
        _ => 0,
    }
}

fn stickiness_points(sales_growth: Option<Percent>, debtor_days_change: Option<Days>) -> u32 {
    let collections_holding = debtor_days_change.is_some_and(|d| d <= Decimal::ZERO);
    if !collections_holding {
        return 0;
    }
    if sales_growth.is_some_and(|g| g > dec!(30)) {
        2
    } else {
        1
    }
}

fn core_earnings_points(other_income_share: Option<Percent>) -> u32 {
    match other_income_share {
        Some(s) if s < dec!(10) => 2,
        Some(s) if s < dec!(30) => 1,
        _ => 0,
    }
}

fn collect_signals(fs: &FinancialSeries, config: &AnalysisConfig, window_start: usize) -> MoatSignals {
    let last = fs.last_index();
    let earlier = last.saturating_sub(SIGNAL_LOOKBACK);

    let roic_window: Vec<PeriodValue> = roic_series(fs, config)
        .into_iter()
        .zip(fs.periods())
        .skip(window_start)
        .map(|(value, period)| PeriodValue {
            period: *period,
            value,
        })
        .collect();
    let roic_values: Vec<Option<Percent>> = roic_window.iter().map(|p| p.value).collect();

    let margins: Vec<Option<Percent>> = (last + 1 - PRICING_WINDOW..=last)
        .map(|i| net_margin(fs, i))
        .collect();
    let margin_trend = change(net_margin(fs, last), net_margin(fs, earlier));

    let operating = operating_profit(fs, last).filter(|op| *op > Decimal::ZERO);

    MoatSignals {
        roic_volatility: stddev(&roic_values),
        roic_window,
        margin_trend,
        margin_volatility: stddev(&margins),
        asset_turnover_change: growth_pct(asset_turnover(fs, earlier), asset_turnover(fs, last)),
        sales_growth_4y: growth_pct(
            fs.value(LineItem::Sales, earlier),
            fs.value(LineItem::Sales, last),
        ),
        debtor_days_change: change(debtor_days(fs, last), debtor_days(fs, earlier)),
        other_income_share: percent(fs.value(LineItem::OtherIncome, last), operating),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score the moat. Needs five periods of history.
pub fn calculate_moat_score(fs: &FinancialSeries, config: &AnalysisConfig) -> Outcome<MoatScore> {
    Outcome::require(MOAT_MIN_PERIODS, fs.len(), || {
        let cap_window = CAP_WINDOW.min(fs.len());
        let wacc = estimate_wacc(fs, config);
        let signals = collect_signals(fs, config, fs.len() - cap_window);

        let roic_values: Vec<Option<Percent>> =
            signals.roic_window.iter().map(|p| p.value).collect();
        let cap_years = competitive_advantage_period(&roic_values, wacc.wacc);

        let breakdown = ScoreBreakdown::from_dimensions(
            MOAT_RUBRIC,
            vec![
                DimensionScore::new(
                    "roic_sustainability",
                    bucket_score(Some(Decimal::from(cap_years)), SUSTAINABILITY_TIERS),
                    3,
                ),
                DimensionScore::new(
                    "roic_stability",
                    inverse_bucket_score(signals.roic_volatility, STABILITY_CEILINGS),
                    2,
                ),
                DimensionScore::new(
                    "pricing_power",
                    pricing_power_points(signals.margin_trend, signals.margin_volatility),
                    3,
                ),
                DimensionScore::new(
                    "scale_efficiency",
                    scale_points(signals.asset_turnover_change),
                    2,
                ),
                DimensionScore::new(
                    "customer_stickiness",
                    stickiness_points(signals.sales_growth_4y, signals.debtor_days_change),
                    2,
                ),
                DimensionScore::new(
                    "core_earnings",
                    core_earnings_points(signals.other_income_share),
                    2,
                ),
            ],
            CLASSIFICATIONS,
        );

        MoatScore {
            wacc,
            cap_years,
            cap_window,
            signals,
            breakdown,
        }
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::FinancialSeriesInput;

    #[test]
    fn test_cap_is_strictly_above_wacc() {
        let roic: Vec<Option<Decimal>> = [8, 10, 13, 14, 16, 20, 22]
            .iter()
            .map(|v| Some(Decimal::from(*v)))
            .collect();
        // 13 itself does not count
        assert_eq!(competitive_advantage_period(&roic, dec!(13)), 4);

        let roic: Vec<Option<Decimal>> = [8, 10, 14, 16, 20, 22, 25]
            .iter()
            .map(|v| Some(Decimal::from(*v)))
            .collect();
        assert_eq!(competitive_advantage_period(&roic, dec!(13)), 5);
        assert_eq!(competitive_advantage_period(&[None, Some(dec!(20))], dec!(13)), 1);
    }

    #[test]
    fn test_methodology_matches_breakdown() {
        let fs = FinancialSeriesInput::fiscal_years(2019, 5).build().unwrap();
        let m = calculate_moat_score(&fs, &AnalysisConfig::default())
            .computed()
            .cloned()
            .unwrap();
        assert_eq!(m.breakdown.dimensions.len(), 6);
        assert_eq!(m.breakdown.max_total, 14);
        assert!(MOAT_METHODOLOGY.contains("six moat signals, 14 points"));
        assert!(MOAT_METHODOLOGY.starts_with(MOAT_RUBRIC));
    }

    #[test]
    fn test_pricing_power_ladder() {
        assert_eq!(pricing_power_points(Some(dec!(1)), Some(dec!(2))), 3);
        assert_eq!(pricing_power_points(Some(dec!(-1)), Some(dec!(2))), 2);
        assert_eq!(pricing_power_points(Some(dec!(0)), Some(dec!(6))), 2);
        assert_eq!(pricing_power_points(Some(dec!(-1)), Some(dec!(4))), 1);
        assert_eq!(pricing_power_points(None, None), 0);
    }

    #[test]
    fn test_stickiness_requires_collections_discipline() {
        assert_eq!(stickiness_points(Some(dec!(40)), Some(dec!(-2))), 2);
        assert_eq!(stickiness_points(Some(dec!(10)), Some(dec!(0))), 1);
        assert_eq!(stickiness_points(Some(dec!(40)), Some(dec!(3))), 0);
        assert_eq!(stickiness_points(Some(dec!(40)), None), 0);
    }

    #[test]
    fn test_short_history_is_insufficient() {
        let fs = FinancialSeriesInput::fiscal_years(2021, 4).build().unwrap();
        assert_eq!(
            calculate_moat_score(&fs, &AnalysisConfig::default()),
            Outcome::InsufficientData {
                required_periods: 5,
                available_periods: 4
            }
        );
    }

    #[test]
    fn test_high_return_franchise() {
        // Debt-free, ROIC ~30% every year, steady 20% margins, rising
        // turnover and flat debtor days.
        let sales = [dec!(1000), dec!(1100), dec!(1250), dec!(1400), dec!(1600)];
        let fs = FinancialSeriesInput::fiscal_years(2019, 5)
            .with(LineItem::Sales, &sales)
            .with(LineItem::NetProfit, &sales.map(|s| s * dec!(0.2)))
            .with(LineItem::Pbt, &sales.map(|s| s * dec!(0.27)))
            .with(LineItem::Tax, &sales.map(|s| s * dec!(0.07)))
            .with(LineItem::RawMaterial, &sales.map(|s| s * dec!(0.5)))
            .with(LineItem::OtherIncome, &[dec!(5); 5])
            .with(LineItem::Equity, &[dec!(900), dec!(950), dec!(1000), dec!(1050), dec!(1100)])
            .with(LineItem::TotalAssets, &[dec!(1000); 5])
            .with(LineItem::Receivables, &sales.map(|s| s * dec!(0.1)))
            .build()
            .unwrap();
        let m = calculate_moat_score(&fs, &AnalysisConfig::default())
            .computed()
            .cloned()
            .unwrap();

        assert_eq!(m.wacc.wacc, dec!(13));
        assert_eq!(m.cap_window, 5);
        assert_eq!(m.cap_years, 5);
        assert_eq!(m.breakdown.points("roic_sustainability"), Some(2));
        assert_eq!(m.breakdown.points("pricing_power"), Some(3));
        // turnover 1.0 → 1.6
        assert_eq!(m.breakdown.points("scale_efficiency"), Some(2));
        // sales +60%, debtor days unchanged
        assert_eq!(m.breakdown.points("customer_stickiness"), Some(2));
        assert_eq!(m.breakdown.points("core_earnings"), Some(2));
        assert_eq!(m.breakdown.max_total, 14);
        assert!(m.breakdown.total >= 11);
        assert_eq!(m.breakdown.classification, "Exceptional");
    }
}
