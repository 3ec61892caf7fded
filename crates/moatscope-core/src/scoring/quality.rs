//! 100-point business quality rubric.
//!
//! Five dimensions of 20 points each:
//!
//! **Profitability**: profitable-year count plus net margin level/stability.
//!
//! **Returns**: latest ROCE plus ROCE change against five periods earlier.
//!
//! **Cash Flow**: CFO / net profit plus free-cash-flow margin.
//!
//! **Balance Sheet**: debt-to-equity plus cash-conversion cycle (lower is
//! better for both).
//!
//! **Growth**: sales CAGR plus profit leverage (profit CAGR against sales CAGR).
//!
//! Every sub-test scores zero when its inputs are absent, so an all-absent
//! series scores 0 and the total can never leave [0, 100].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::ratios::snapshot::{cash_conversion_cycle, debt_to_equity, net_margin_series, roce};
use crate::scoring::breakdown::{ClassificationTable, DimensionScore, ScoreBreakdown};
use crate::series::math::{average, bucket_score, cagr, change, inverse_bucket_score, percent, stddev, Tier};
use crate::series::{FinancialSeries, LineItem};
use crate::types::{Days, Multiple, Percent};

pub const QUALITY_RUBRIC: &str = "QUALITY_RUBRIC_V1";

const PROFITABLE_YEAR_TIERS: &[Tier] = &[(dec!(5), 5), (dec!(7), 7), (dec!(10), 10)];
const ROCE_TIERS: &[Tier] = &[(dec!(12), 4), (dec!(18), 7), (dec!(25), 10)];
const CASH_CONVERSION_TIERS: &[Tier] = &[(dec!(60), 4), (dec!(80), 7), (dec!(100), 10)];
const FCF_MARGIN_TIERS: &[Tier] = &[(dec!(0), 3), (dec!(5), 6), (dec!(10), 10)];
const DEBT_TO_EQUITY_CEILINGS: &[Tier] = &[(dec!(1.5), 3), (dec!(0.7), 6), (dec!(0.3), 10)];
const CCC_CEILINGS: &[Tier] = &[(dec!(120), 4), (dec!(90), 7), (dec!(60), 10)];
const SALES_CAGR_TIERS: &[Tier] = &[(dec!(7), 4), (dec!(12), 7), (dec!(20), 10)];

const ROCE_LOOKBACK: usize = 5;
const GROWTH_HORIZON: usize = 5;
const DIMENSION_MAX: u32 = 20;

const CLASSIFICATIONS: &ClassificationTable = &[
    (90, "Exceptional"),
    (75, "High Quality"),
    (60, "Above Average"),
    (40, "Average"),
    (0, "Low Quality"),
];

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The raw measurements the rubric was applied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub profitable_years: u32,
    pub average_net_margin: Option<Percent>,
    pub net_margin_volatility: Option<Percent>,
    pub roce: Option<Percent>,
    /// Latest ROCE minus ROCE five periods earlier, in percentage points.
    pub roce_change: Option<Percent>,
    pub cfo_to_net_profit: Option<Percent>,
    pub fcf_margin: Option<Percent>,
    pub debt_to_equity: Option<Multiple>,
    pub cash_conversion_cycle: Option<Days>,
    /// Years spanned by the growth CAGRs (five, or less on a short history).
    pub growth_horizon: usize,
    pub sales_cagr: Option<Percent>,
    pub profit_cagr: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub breakdown: ScoreBreakdown,
    pub metrics: QualityMetrics,
}

// ---------------------------------------------------------------------------
// Sub-tests
// ---------------------------------------------------------------------------

fn margin_consistency_points(avg: Option<Percent>, sd: Option<Percent>) -> u32 {
    let Some(avg) = avg else { return 0 };
    let stable_within = |limit: Decimal| sd.is_some_and(|s| s < limit);
    if avg > dec!(15) && stable_within(dec!(3)) {
        10
    } else if avg > dec!(10) && stable_within(dec!(5)) {
        6
    } else if avg > dec!(5) {
        3
    } else {
        0
    }
}

fn roce_trend_points(change: Option<Percent>) -> u32 {
    match change {
        Some(c) if c > dec!(2) => 10,
        Some(c) if c.abs() <= dec!(2) => 6,
        _ => 0,
    }
}

fn profit_leverage_points(sales_cagr: Option<Percent>, profit_cagr: Option<Percent>) -> u32 {
    let Some(profit) = profit_cagr else { return 0 };
    match change(Some(profit), sales_cagr) {
        Some(gap) if gap > dec!(5) => 10,
        Some(gap) if gap.abs() <= dec!(5) => 6,
        _ => 2,
    }
}

fn free_cash_flow_margin(fs: &FinancialSeries, i: usize) -> Option<Percent> {
    let cfo = fs.value(LineItem::Cfo, i)?;
    let cfi = fs.value(LineItem::Cfi, i)?;
    percent(change(Some(cfo), Some(cfi.abs())), fs.value(LineItem::Sales, i))
}

fn measure(fs: &FinancialSeries, config: &AnalysisConfig) -> QualityMetrics {
    let last = fs.last_index();
    let margins = net_margin_series(fs);

    let profitable_years = fs
        .series(LineItem::NetProfit)
        .iter()
        .flatten()
        .filter(|np| **np > Decimal::ZERO)
        .count() as u32;

    let latest_roce = roce(fs, last);
    let roce_change = last
        .checked_sub(ROCE_LOOKBACK)
        .and_then(|earlier| change(latest_roce, roce(fs, earlier)));

    let net_profit = fs
        .value(LineItem::NetProfit, last)
        .filter(|np| *np > Decimal::ZERO);

    let growth_horizon = GROWTH_HORIZON.min(last);

    QualityMetrics {
        profitable_years,
        average_net_margin: average(&margins),
        net_margin_volatility: stddev(&margins),
        roce: latest_roce,
        roce_change,
        cfo_to_net_profit: percent(fs.value(LineItem::Cfo, last), net_profit),
        fcf_margin: free_cash_flow_margin(fs, last),
        debt_to_equity: debt_to_equity(fs, last),
        cash_conversion_cycle: cash_conversion_cycle(fs, last, config),
        growth_horizon,
        sales_cagr: cagr(fs.series(LineItem::Sales), growth_horizon),
        profit_cagr: cagr(fs.series(LineItem::NetProfit), growth_horizon),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn calculate_quality_score(fs: &FinancialSeries, config: &AnalysisConfig) -> QualityScore {
    let m = measure(fs, config);

    let profitability = bucket_score(Some(Decimal::from(m.profitable_years)), PROFITABLE_YEAR_TIERS)
        + margin_consistency_points(m.average_net_margin, m.net_margin_volatility);
    let returns = bucket_score(m.roce, ROCE_TIERS) + roce_trend_points(m.roce_change);
    let cash_flow = bucket_score(m.cfo_to_net_profit, CASH_CONVERSION_TIERS)
        + bucket_score(m.fcf_margin, FCF_MARGIN_TIERS);
    let balance_sheet = inverse_bucket_score(m.debt_to_equity, DEBT_TO_EQUITY_CEILINGS)
        + inverse_bucket_score(m.cash_conversion_cycle, CCC_CEILINGS);
    let growth = bucket_score(m.sales_cagr, SALES_CAGR_TIERS)
        + profit_leverage_points(m.sales_cagr, m.profit_cagr);

    let breakdown = ScoreBreakdown::from_dimensions(
        QUALITY_RUBRIC,
        vec![
            DimensionScore::new("profitability", profitability, DIMENSION_MAX),
            DimensionScore::new("returns", returns, DIMENSION_MAX),
            DimensionScore::new("cash_flow", cash_flow, DIMENSION_MAX),
            DimensionScore::new("balance_sheet", balance_sheet, DIMENSION_MAX),
            DimensionScore::new("growth", growth, DIMENSION_MAX),
        ],
        CLASSIFICATIONS,
    );

    QualityScore {
        breakdown,
        metrics: m,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
