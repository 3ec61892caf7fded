//! Null-safe scalar and series helpers.
//!
//! Every function accepts absent operands and answers `None` (or zero points
//! for the scoring helpers) instead of panicking. Aggregates skip absent
//! observations. All arithmetic uses `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::Percent;

/// A scoring tier: (threshold, points).
pub type Tier = (Decimal, u32);

const HUNDRED: Decimal = dec!(100);

fn present(values: &[Option<Decimal>]) -> Vec<Decimal> {
    values.iter().flatten().copied().collect()
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// Arithmetic mean of the present values.
pub fn average(values: &[Option<Decimal>]) -> Option<Decimal> {
    let vals = present(values);
    if vals.is_empty() {
        return None;
    }
    checked_sum(vals.iter().copied())?.checked_div(Decimal::from(vals.len() as u64))
}

/// Median of the present values.
pub fn median(values: &[Option<Decimal>]) -> Option<Decimal> {
    let mut sorted = present(values);
    if sorted.is_empty() {
        return None;
    }
    sorted.sort();
    let len = sorted.len();
    if len % 2 == 1 {
        Some(sorted[len / 2])
    } else {
        Some(sorted[len / 2 - 1] / dec!(2) + sorted[len / 2] / dec!(2))
    }
}

/// Population standard deviation of the present values. Needs at least two.
/// Absent when the squared deviations exceed the decimal range.
pub fn stddev(values: &[Option<Decimal>]) -> Option<Decimal> {
    let vals = present(values);
    if vals.len() < 2 {
        return None;
    }
    let n = Decimal::from(vals.len() as u64);
    let mean = checked_sum(vals.iter().copied())?.checked_div(n)?;
    let squares = vals
        .iter()
        .map(|v| {
            let d = v.checked_sub(mean)?;
            d.checked_mul(d)
        })
        .collect::<Option<Vec<_>>>()?;
    checked_sum(squares)?.checked_div(n)?.sqrt()
}

/// `num / den`; absent if either side is absent or `den` is zero.
pub fn ratio(num: Option<Decimal>, den: Option<Decimal>) -> Option<Decimal> {
    let (num, den) = (num?, den?);
    if den.is_zero() {
        return None;
    }
    num.checked_div(den)
}

/// `num / den` expressed in percentage points.
pub fn percent(num: Option<Decimal>, den: Option<Decimal>) -> Option<Percent> {
    ratio(num, den)?.checked_mul(HUNDRED)
}

/// `now - then`, absent if either side is absent or the difference
/// overflows.
pub fn change(now: Option<Decimal>, then: Option<Decimal>) -> Option<Decimal> {
    now?.checked_sub(then?)
}

/// Growth from `from` to `to` in percentage points. Undefined for a
/// non-positive base.
pub fn growth_pct(from: Option<Decimal>, to: Option<Decimal>) -> Option<Percent> {
    let from = from.filter(|v| *v > Decimal::ZERO)?;
    percent(change(to, Some(from)), Some(from))
}

/// Compound annual growth between two observations `years` apart.
/// Undefined unless both endpoints are strictly positive.
pub fn cagr_between(start: Option<Decimal>, end: Option<Decimal>, years: usize) -> Option<Percent> {
    let (start, end) = (start?, end?);
    if years == 0 || start <= Decimal::ZERO || end <= Decimal::ZERO {
        return None;
    }
    let exponent = Decimal::ONE / Decimal::from(years as u64);
    let growth = end.checked_div(start)?.checked_powd(exponent)?;
    (growth - Decimal::ONE).checked_mul(HUNDRED)
}

/// CAGR ending at the latest present observation and starting `horizon`
/// periods before it.
pub fn cagr(series: &[Option<Decimal>], horizon: usize) -> Option<Percent> {
    let end_index = series.iter().rposition(Option::is_some)?;
    let start_index = end_index.checked_sub(horizon)?;
    cagr_between(series[start_index], series[end_index], horizon)
}

/// Points of the highest tier whose minimum the value meets or exceeds.
/// Tiers must be ascending by threshold. Absent values score zero.
pub fn bucket_score(value: Option<Decimal>, tiers: &[Tier]) -> u32 {
    debug_assert!(tiers.windows(2).all(|w| w[0].0 <= w[1].0));
    let Some(v) = value else { return 0 };
    tiers
        .iter()
        .rev()
        .find(|(min, _)| v >= *min)
        .map_or(0, |(_, points)| *points)
}

/// Points of the tightest tier whose (exclusive) ceiling the value stays
/// under. Tiers must be descending by ceiling, loosest first. Absent values
/// score zero.
pub fn inverse_bucket_score(value: Option<Decimal>, tiers: &[Tier]) -> u32 {
    debug_assert!(tiers.windows(2).all(|w| w[0].0 >= w[1].0));
    let Some(v) = value else { return 0 };
    tiers
        .iter()
        .rev()
        .find(|(max, _)| v < *max)
        .map_or(0, |(_, points)| *points)
}

// ===========================================================================
// Tests
// ===========================================================================
