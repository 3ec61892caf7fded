//! Retained-earnings test: did every unit of profit kept in the business
//! create at least one unit of value?
//!
//! Retained earnings are summed over the trailing six periods. Value created
//! is the change in market capitalisation between the first and last of
//! those periods, or the change in book equity when prices are missing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::series::math::{change, ratio};
use crate::series::{FinancialSeries, LineItem};
use crate::types::{Money, Multiple, Outcome};

pub const VALUE_CREATION_MIN_PERIODS: usize = 6;

const SPAN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMeasure {
    MarketCap,
    BookValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCreationTest {
    /// Net profit less dividends over the window. A missing dividend counts
    /// as nothing paid out.
    pub retained_earnings: Option<Money>,
    pub measure: Option<ValueMeasure>,
    pub value_created: Option<Money>,
    /// Value created per unit retained; only defined for positive retention.
    pub ratio: Option<Multiple>,
    pub passed: bool,
}

fn market_cap(fs: &FinancialSeries, i: usize, config: &AnalysisConfig) -> Option<Money> {
    let shares = fs.value(LineItem::Shares, i)?;
    let price = fs.value(LineItem::Price, i)?;
    ratio(shares.checked_mul(price), Some(config.market_cap_divisor))
}

fn retained_earnings(fs: &FinancialSeries, start: usize, end: usize) -> Option<Money> {
    (start..=end)
        .map(|i| {
            let profit = fs.value(LineItem::NetProfit, i)?;
            let dividend = fs.value(LineItem::Dividend, i).unwrap_or(Decimal::ZERO);
            profit.checked_sub(dividend)
        })
        .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r?))
}

fn value_created(
    fs: &FinancialSeries,
    start: usize,
    end: usize,
    config: &AnalysisConfig,
) -> Option<(ValueMeasure, Money)> {
    if let (Some(now), Some(then)) = (market_cap(fs, end, config), market_cap(fs, start, config)) {
        return now.checked_sub(then).map(|v| (ValueMeasure::MarketCap, v));
    }
    tracing::debug!("price or share count missing; value creation falls back to book value");
    let book = change(fs.capital_base(end), fs.capital_base(start))?;
    Some((ValueMeasure::BookValue, book))
}

/// Run the test over the trailing six periods.
pub fn calculate_value_creation(
    fs: &FinancialSeries,
    config: &AnalysisConfig,
) -> Outcome<ValueCreationTest> {
    Outcome::require(VALUE_CREATION_MIN_PERIODS, fs.len(), || {
        let end = fs.last_index();
        let start = end - SPAN;

        let retained = retained_earnings(fs, start, end);
        let created = value_created(fs, start, end, config);
        let value = created.map(|(_, v)| v);
        let ratio = ratio(value, retained.filter(|r| *r > Decimal::ZERO));

        ValueCreationTest {
            retained_earnings: retained,
            measure: created.map(|(m, _)| m),
            value_created: value,
            ratio,
            passed: ratio.is_some_and(|r| r >= Decimal::ONE),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::FinancialSeriesInput;
    use rust_decimal_macros::dec;

    fn six_years() -> FinancialSeriesInput {
        FinancialSeriesInput::fiscal_years(2018, 6)
            .with(LineItem::NetProfit, &[dec!(100); 6])
            .with(LineItem::Dividend, &[dec!(20); 6])
    }

    #[test]
    fn test_market_cap_method() {
        // retained = 6 * 80 = 480; market cap 1000 → 2000
        let fs = six_years()
            .with(LineItem::Shares, &[dec!(10); 6])
            .with(
                LineItem::Price,
                &[dec!(100), dec!(110), dec!(120), dec!(150), dec!(180), dec!(200)],
            )
            .build()
            .unwrap();
        let t = calculate_value_creation(&fs, &AnalysisConfig::default())
            .computed()
            .cloned()
            .unwrap();
        assert_eq!(t.retained_earnings, Some(dec!(480)));
        assert_eq!(t.measure, Some(ValueMeasure::MarketCap));
        assert_eq!(t.value_created, Some(dec!(1000)));
        assert!(t.passed);
    }

    #[test]
    fn test_book_value_fallback_fails_below_one() {
        let fs = six_years()
            .with(
                LineItem::Reserves,
                &[dec!(500), dec!(560), dec!(620), dec!(680), dec!(740), dec!(800)],
            )
            .build()
            .unwrap();
        let t = calculate_value_creation(&fs, &AnalysisConfig::default())
            .computed()
            .cloned()
            .unwrap();
        assert_eq!(t.measure, Some(ValueMeasure::BookValue));
        assert_eq!(t.value_created, Some(dec!(300)));
        assert_eq!(t.ratio, Some(dec!(0.625)));
        assert!(!t.passed);
    }

    #[test]
    fn test_price_at_one_endpoint_falls_back_to_book_value() {
        let fs = six_years()
            .with(LineItem::Shares, &[dec!(10); 6])
            .with_optional(
                LineItem::Price,
                vec![None, Some(dec!(110)), Some(dec!(120)), Some(dec!(150)), Some(dec!(180)), Some(dec!(200))],
            )
            .with(
                LineItem::Reserves,
                &[dec!(500), dec!(600), dec!(700), dec!(800), dec!(900), dec!(1000)],
            )
            .build()
            .unwrap();
        let t = calculate_value_creation(&fs, &AnalysisConfig::default())
            .computed()
            .cloned()
            .unwrap();
        // retained 480 against book growth 500
        assert_eq!(t.measure, Some(ValueMeasure::BookValue));
        assert_eq!(t.value_created, Some(dec!(500)));
        assert!(t.passed);
    }

    #[test]
    fn test_no_ratio_without_positive_retention() {
        let fs = FinancialSeriesInput::fiscal_years(2018, 6)
            .with(LineItem::NetProfit, &[dec!(10); 6])
            .with(LineItem::Dividend, &[dec!(10); 6])
            .with(LineItem::Equity, &[dec!(100); 6])
            .build()
            .unwrap();
        let t = calculate_value_creation(&fs, &AnalysisConfig::default())
            .computed()
            .cloned()
            .unwrap();
        assert_eq!(t.retained_earnings, Some(dec!(0)));
        assert_eq!(t.ratio, None);
        assert!(!t.passed);
    }

    #[test]
    fn test_five_periods_is_insufficient() {
        let fs = FinancialSeriesInput::fiscal_years(2019, 5).build().unwrap();
        assert!(!calculate_value_creation(&fs, &AnalysisConfig::default()).is_computed());
    }
}
