//! Single-period ratios: returns on equity, capital employed and invested
//! capital, margins, leverage and working-capital day counts.
//!
//! The per-period functions take a period index so that trend, moat and
//! red-flag analysis evaluate exactly the same formulas at earlier periods.
//! Capital-based returns require a strictly positive denominator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::series::math::{average, percent, ratio};
use crate::series::{FinancialSeries, LineItem};
use crate::types::{Days, Money, Multiple, Percent, Rate};

const DAYS_PER_YEAR: Decimal = dec!(365);

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Ratios for the latest period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioSnapshot {
    pub period: NaiveDate,
    pub operating_profit: Option<Money>,
    pub operating_margin: Option<Percent>,
    pub net_margin: Option<Percent>,
    pub average_equity: Option<Money>,
    pub capital_employed: Option<Money>,
    pub ebit: Option<Money>,
    pub roe: Option<Percent>,
    pub roce: Option<Percent>,
    pub effective_tax_rate: Rate,
    /// True when the configured default replaced the reported tax rate.
    pub tax_rate_defaulted: bool,
    pub nopat: Option<Money>,
    pub invested_capital: Option<Money>,
    pub roic: Option<Percent>,
    pub asset_turnover: Option<Multiple>,
    pub debtor_days: Option<Days>,
    pub inventory_days: Option<Days>,
    pub assumed_payable_days: Days,
    pub cash_conversion_cycle: Option<Days>,
    pub debt_to_equity: Option<Multiple>,
    pub interest_coverage: Option<Multiple>,
}

// ---------------------------------------------------------------------------
// Per-period building blocks
// ---------------------------------------------------------------------------

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

/// Sales less operating costs. Missing cost rows count as zero; missing
/// sales makes the result absent.
pub fn operating_profit(fs: &FinancialSeries, i: usize) -> Option<Money> {
    let sales = fs.value(LineItem::Sales, i)?;
    LineItem::OPERATING_COSTS
        .iter()
        .filter_map(|item| fs.value(*item, i))
        .try_fold(sales, |acc, cost| acc.checked_sub(cost))
}

pub fn operating_margin(fs: &FinancialSeries, i: usize) -> Option<Percent> {
    percent(operating_profit(fs, i), fs.value(LineItem::Sales, i))
}

pub fn net_margin(fs: &FinancialSeries, i: usize) -> Option<Percent> {
    percent(fs.value(LineItem::NetProfit, i), fs.value(LineItem::Sales, i))
}

/// Net margin for every period, oldest first.
pub fn net_margin_series(fs: &FinancialSeries) -> Vec<Option<Percent>> {
    (0..fs.len()).map(|i| net_margin(fs, i)).collect()
}

/// Two-point average of the capital base; degrades to the current period
/// alone when the prior period is missing.
pub fn average_equity(fs: &FinancialSeries, i: usize) -> Option<Money> {
    let current = fs.capital_base(i)?;
    let prior = i.checked_sub(1).and_then(|p| fs.capital_base(p));
    average(&[Some(current), prior])
}

/// PBT plus interest. Missing interest counts as zero.
pub fn ebit(fs: &FinancialSeries, i: usize) -> Option<Money> {
    let pbt = fs.value(LineItem::Pbt, i)?;
    pbt.checked_add(fs.value(LineItem::Interest, i).unwrap_or(Decimal::ZERO))
}

/// Average equity plus period-end borrowings (missing borrowings = debt free).
pub fn capital_employed(fs: &FinancialSeries, i: usize) -> Option<Money> {
    let equity = average_equity(fs, i)?;
    equity.checked_add(fs.value(LineItem::Borrowings, i).unwrap_or(Decimal::ZERO))
}

pub fn roe(fs: &FinancialSeries, i: usize) -> Option<Percent> {
    percent(fs.value(LineItem::NetProfit, i), positive(average_equity(fs, i)))
}

pub fn roce(fs: &FinancialSeries, i: usize) -> Option<Percent> {
    percent(ebit(fs, i), positive(capital_employed(fs, i)))
}

/// Reported tax / PBT, when PBT is positive.
fn reported_tax_rate(fs: &FinancialSeries, i: usize) -> Option<Rate> {
    let pbt = positive(fs.value(LineItem::Pbt, i))?;
    ratio(fs.value(LineItem::Tax, i), Some(pbt))
}

pub fn effective_tax_rate(fs: &FinancialSeries, i: usize, config: &AnalysisConfig) -> Rate {
    reported_tax_rate(fs, i).unwrap_or(config.default_tax_rate)
}

/// EBIT × (1 − tax rate).
pub fn nopat(fs: &FinancialSeries, i: usize, config: &AnalysisConfig) -> Option<Money> {
    let retained_share = Decimal::ONE.checked_sub(effective_tax_rate(fs, i, config))?;
    ebit(fs, i)?.checked_mul(retained_share)
}

/// Average equity plus borrowings less cash held beyond the operating
/// reserve (a configured share of sales). Excess cash is never negative.
pub fn invested_capital(fs: &FinancialSeries, i: usize, config: &AnalysisConfig) -> Option<Money> {
    let capital = capital_employed(fs, i)?;
    let cash = fs.value(LineItem::Cash, i).unwrap_or(Decimal::ZERO);
    let reserve = fs
        .value(LineItem::Sales, i)
        .unwrap_or(Decimal::ZERO)
        .checked_mul(config.operating_cash_share_of_sales)?;
    let excess_cash = cash.checked_sub(reserve)?.max(Decimal::ZERO);
    capital.checked_sub(excess_cash)
}

pub fn roic(fs: &FinancialSeries, i: usize, config: &AnalysisConfig) -> Option<Percent> {
    percent(nopat(fs, i, config), positive(invested_capital(fs, i, config)))
}

/// ROIC for every period, oldest first.
pub fn roic_series(fs: &FinancialSeries, config: &AnalysisConfig) -> Vec<Option<Percent>> {
    (0..fs.len()).map(|i| roic(fs, i, config)).collect()
}

pub fn asset_turnover(fs: &FinancialSeries, i: usize) -> Option<Multiple> {
    ratio(fs.value(LineItem::Sales, i), fs.value(LineItem::TotalAssets, i))
}

pub fn debtor_days(fs: &FinancialSeries, i: usize) -> Option<Days> {
    ratio(fs.value(LineItem::Receivables, i), fs.value(LineItem::Sales, i))?
        .checked_mul(DAYS_PER_YEAR)
}

/// Inventory over material cost (raw material plus other manufacturing).
pub fn inventory_days(fs: &FinancialSeries, i: usize) -> Option<Days> {
    let cost = match (
        fs.value(LineItem::RawMaterial, i),
        fs.value(LineItem::OtherMfg, i),
    ) {
        (None, None) => None,
        (raw, other) => raw
            .unwrap_or(Decimal::ZERO)
            .checked_add(other.unwrap_or(Decimal::ZERO)),
    };
    ratio(fs.value(LineItem::Inventory, i), positive(cost))?.checked_mul(DAYS_PER_YEAR)
}

pub fn cash_conversion_cycle(
    fs: &FinancialSeries,
    i: usize,
    config: &AnalysisConfig,
) -> Option<Days> {
    debtor_days(fs, i)?
        .checked_add(inventory_days(fs, i)?)?
        .checked_sub(config.assumed_payable_days)
}

/// Borrowings over average equity, falling back to the period-end capital
/// base.
pub fn debt_to_equity(fs: &FinancialSeries, i: usize) -> Option<Multiple> {
    let equity = positive(average_equity(fs, i)).or_else(|| positive(fs.capital_base(i)));
    ratio(fs.value(LineItem::Borrowings, i), equity)
}

pub fn interest_coverage(fs: &FinancialSeries, i: usize) -> Option<Multiple> {
    ratio(ebit(fs, i), fs.value(LineItem::Interest, i))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the latest-period ratio snapshot.
pub fn calculate_ratio_snapshot(fs: &FinancialSeries, config: &AnalysisConfig) -> RatioSnapshot {
    let last = fs.last_index();
    let tax_rate_defaulted = reported_tax_rate(fs, last).is_none();
    if tax_rate_defaulted {
        tracing::debug!(
            default_tax_rate = %config.default_tax_rate,
            "reported tax rate unavailable; using default"
        );
    }

    RatioSnapshot {
        period: fs.periods()[last],
        operating_profit: operating_profit(fs, last),
        operating_margin: operating_margin(fs, last),
        net_margin: net_margin(fs, last),
        average_equity: average_equity(fs, last),
        capital_employed: capital_employed(fs, last),
        ebit: ebit(fs, last),
        roe: roe(fs, last),
        roce: roce(fs, last),
        effective_tax_rate: effective_tax_rate(fs, last, config),
        tax_rate_defaulted,
        nopat: nopat(fs, last, config),
        invested_capital: invested_capital(fs, last, config),
        roic: roic(fs, last, config),
        asset_turnover: asset_turnover(fs, last),
        debtor_days: debtor_days(fs, last),
        inventory_days: inventory_days(fs, last),
        assumed_payable_days: config.assumed_payable_days,
        cash_conversion_cycle: cash_conversion_cycle(fs, last, config),
        debt_to_equity: debt_to_equity(fs, last),
        interest_coverage: interest_coverage(fs, last),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
