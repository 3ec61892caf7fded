//! Multi-year growth, margin volatility and incremental-return analysis.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::ratios::snapshot::{asset_turnover, net_margin_series, nopat};
use crate::series::math::{cagr, change, percent, stddev};
use crate::series::{FinancialSeries, LineItem};
use crate::types::{Money, Multiple, Percent, PeriodValue};

/// Periods between the two asset-turnover observations in the trend.
pub const ASSET_TURNOVER_LOOKBACK: usize = 4;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSummary {
    pub sales_cagr_3y: Option<Percent>,
    pub sales_cagr_5y: Option<Percent>,
    pub sales_cagr_10y: Option<Percent>,
    pub profit_cagr_3y: Option<Percent>,
    pub profit_cagr_5y: Option<Percent>,
    pub profit_cagr_10y: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailingTwelveMonths {
    /// End date of the most recent quarter.
    pub period: NaiveDate,
    pub sales: Option<Money>,
    pub net_profit: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub growth: GrowthSummary,
    pub margin_series: Vec<PeriodValue>,
    pub margin_volatility_window: usize,
    pub margin_volatility: Option<Percent>,
    /// Incremental ROIC from the previous period into each period.
    pub incremental_roic: Vec<PeriodValue>,
    pub asset_turnover: Option<Multiple>,
    /// Latest turnover minus turnover four periods back.
    pub asset_turnover_trend: Option<Multiple>,
    pub asset_turnover_improving: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_twelve_months: Option<TrailingTwelveMonths>,
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Standard deviation of net margin over the trailing `window` periods.
pub fn margin_volatility(fs: &FinancialSeries, window: usize) -> Option<Percent> {
    let margins = net_margin_series(fs);
    let start = margins.len().saturating_sub(window);
    stddev(&margins[start..])
}

fn capital_with_debt(fs: &FinancialSeries, i: usize) -> Option<Money> {
    fs.capital_base(i)?
        .checked_add(fs.value(LineItem::Borrowings, i).unwrap_or(Decimal::ZERO))
}

/// ΔNOPAT / Δ(capital base + borrowings) between `p0` and `p1`, in percent.
/// Absent when capital did not grow.
pub fn incremental_roic(
    fs: &FinancialSeries,
    p0: usize,
    p1: usize,
    config: &AnalysisConfig,
) -> Option<Percent> {
    let delta_capital = change(capital_with_debt(fs, p1), capital_with_debt(fs, p0))?;
    if delta_capital <= Decimal::ZERO {
        return None;
    }
    let delta_nopat = change(nopat(fs, p1, config), nopat(fs, p0, config));
    percent(delta_nopat, Some(delta_capital))
}

/// Incremental ROIC for each consecutive pair of periods.
pub fn incremental_roic_series(fs: &FinancialSeries, config: &AnalysisConfig) -> Vec<PeriodValue> {
    (1..fs.len())
        .map(|p1| PeriodValue {
            period: fs.periods()[p1],
            value: incremental_roic(fs, p1 - 1, p1, config),
        })
        .collect()
}

pub fn asset_turnover_trend(fs: &FinancialSeries) -> Option<Multiple> {
    let last = fs.last_index();
    let earlier = last.checked_sub(ASSET_TURNOVER_LOOKBACK)?;
    change(asset_turnover(fs, last), asset_turnover(fs, earlier))
}

fn sum_last_four(values: &[Option<Money>]) -> Option<Money> {
    let start = values.len().checked_sub(4)?;
    values[start..]
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add((*v)?))
}

/// Sum of the last four quarters, when a quarterly block is present.
pub fn trailing_twelve_months(fs: &FinancialSeries) -> Option<TrailingTwelveMonths> {
    let q = fs.quarterly()?;
    let period = *q.periods().last()?;
    Some(TrailingTwelveMonths {
        period,
        sales: sum_last_four(q.sales()),
        net_profit: sum_last_four(q.net_profit()),
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn calculate_trends(fs: &FinancialSeries, config: &AnalysisConfig) -> TrendAnalysis {
    let sales = fs.series(LineItem::Sales);
    let profit = fs.series(LineItem::NetProfit);
    let growth = GrowthSummary {
        sales_cagr_3y: cagr(sales, 3),
        sales_cagr_5y: cagr(sales, 5),
        sales_cagr_10y: cagr(sales, 10),
        profit_cagr_3y: cagr(profit, 3),
        profit_cagr_5y: cagr(profit, 5),
        profit_cagr_10y: cagr(profit, 10),
    };

    let margin_series = fs
        .periods()
        .iter()
        .zip(net_margin_series(fs))
        .map(|(period, value)| PeriodValue {
            period: *period,
            value,
        })
        .collect();

    let trend = asset_turnover_trend(fs);

    TrendAnalysis {
        growth,
        margin_series,
        margin_volatility_window: config.margin_volatility_window,
        margin_volatility: margin_volatility(fs, config.margin_volatility_window),
        incremental_roic: incremental_roic_series(fs, config),
        asset_turnover: asset_turnover(fs, fs.last_index()),
        asset_turnover_trend: trend,
        asset_turnover_improving: trend.map(|t| t > Decimal::ZERO),
        trailing_twelve_months: trailing_twelve_months(fs),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
