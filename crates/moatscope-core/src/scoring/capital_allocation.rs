//! Capital allocation grade.
//!
//! Reinvestment (0-60) rewards high incremental ROIC over the last three
//! single-period deltas. Deployment (0-40) checks that the payout policy
//! fits those returns: a high-return business should retain, a low-return
//! one should distribute.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::scoring::breakdown::{ClassificationTable, DimensionScore, ScoreBreakdown};
use crate::series::math::{average, bucket_score, growth_pct, percent, Tier};
use crate::series::{FinancialSeries, LineItem};
use crate::trends::growth::incremental_roic;
use crate::types::{Outcome, Percent};

pub const CAPITAL_ALLOCATION_RUBRIC: &str = "CAPITAL_ALLOCATION_RUBRIC_V2";

pub const CAPITAL_ALLOCATION_MIN_PERIODS: usize = 4;

const TRAILING: usize = 3;

const REINVESTMENT_TIERS: &[Tier] = &[(dec!(5), 15), (dec!(13), 30), (dec!(18), 45), (dec!(25), 60)];

const GRADES: &ClassificationTable = &[(85, "A"), (70, "B"), (55, "C"), (35, "D"), (0, "F")];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnBand {
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutBand {
    Low,
    Medium,
    High,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalAllocationGrade {
    pub average_incremental_roic: Option<Percent>,
    pub average_payout: Option<Percent>,
    pub return_band: Option<ReturnBand>,
    pub payout_band: Option<PayoutBand>,
    pub reinvestment_score: u32,
    pub deployment_score: u32,
    pub grade: String,
    pub breakdown: ScoreBreakdown,
    /// Periods with a positive dividend, over the whole series.
    pub dividend_paying_periods: usize,
    /// Borrowings growth over the trailing two periods (not scored).
    pub borrowings_growth: Option<Percent>,
}

// ---------------------------------------------------------------------------
// Bands and the deployment table
// ---------------------------------------------------------------------------

fn return_band(roic: Percent) -> ReturnBand {
    if roic > dec!(20) {
        ReturnBand::High
    } else if roic >= dec!(13) {
        ReturnBand::Moderate
    } else {
        ReturnBand::Low
    }
}

fn payout_band(payout: Percent) -> PayoutBand {
    if payout < dec!(30) {
        PayoutBand::Low
    } else if payout <= dec!(60) {
        PayoutBand::Medium
    } else {
        PayoutBand::High
    }
}

fn deployment_points(returns: ReturnBand, payout: PayoutBand) -> u32 {
    match (returns, payout) {
        (ReturnBand::High, PayoutBand::Low) => 40,
        (ReturnBand::High, PayoutBand::Medium) => 25,
        (ReturnBand::High, PayoutBand::High) => 10,
        (ReturnBand::Moderate, PayoutBand::Low) => 25,
        (ReturnBand::Moderate, PayoutBand::Medium) => 35,
        (ReturnBand::Moderate, PayoutBand::High) => 20,
        (ReturnBand::Low, PayoutBand::Low) => 10,
        (ReturnBand::Low, PayoutBand::Medium) => 20,
        (ReturnBand::Low, PayoutBand::High) => 40,
    }
}

/// Dividend / net profit over the trailing periods, skipping loss years and
/// years without a reported dividend.
fn average_payout(fs: &FinancialSeries, from: usize) -> Option<Percent> {
    let ratios: Vec<Option<Percent>> = (from..fs.len())
        .map(|i| {
            let profit = fs
                .value(LineItem::NetProfit, i)
                .filter(|np| *np > Decimal::ZERO);
            percent(fs.value(LineItem::Dividend, i), profit)
        })
        .collect();
    average(&ratios)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Grade capital allocation. Needs four periods (three deltas).
pub fn calculate_capital_allocation(
    fs: &FinancialSeries,
    config: &AnalysisConfig,
) -> Outcome<CapitalAllocationGrade> {
    Outcome::require(CAPITAL_ALLOCATION_MIN_PERIODS, fs.len(), || {
        let last = fs.last_index();
        let first = fs.len() - TRAILING;

        let deltas: Vec<Option<Percent>> = (first..=last)
            .map(|p1| incremental_roic(fs, p1 - 1, p1, config))
            .collect();
        let average_incremental_roic = average(&deltas);
        let average_payout = average_payout(fs, first);

        let return_band = average_incremental_roic.map(return_band);
        let payout_band = average_payout.map(payout_band);

        let reinvestment_score = bucket_score(average_incremental_roic, REINVESTMENT_TIERS);
        let deployment_score = match (return_band, payout_band) {
            (Some(r), Some(p)) => deployment_points(r, p),
            _ => 0,
        };

        let breakdown = ScoreBreakdown::from_dimensions(
            CAPITAL_ALLOCATION_RUBRIC,
            vec![
                DimensionScore::new("reinvestment", reinvestment_score, 60),
                DimensionScore::new("deployment", deployment_score, 40),
            ],
            GRADES,
        );

        let dividend_paying_periods = fs
            .series(LineItem::Dividend)
            .iter()
            .flatten()
            .filter(|d| **d > Decimal::ZERO)
            .count();

        CapitalAllocationGrade {
            average_incremental_roic,
            average_payout,
            return_band,
            payout_band,
            reinvestment_score,
            deployment_score,
            grade: breakdown.classification.clone(),
            breakdown,
            dividend_paying_periods,
            borrowings_growth: growth_pct(
                fs.value_back(LineItem::Borrowings, last, 2),
                fs.value(LineItem::Borrowings, last),
            ),
        }
    })
}

// ===========================================================================
// Tests
// ===========================================================================
