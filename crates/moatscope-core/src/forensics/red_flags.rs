//! Rule-based red flags over a two-period window.
//!
//! Each rule compares the latest period with the one two periods earlier.
//! A rule whose operands are absent simply does not fire. Flags describe;
//! they do not feed any score.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::ratios::snapshot::{operating_profit, roce};
use crate::series::math::{change, growth_pct};
use crate::series::{FinancialSeries, LineItem};
use crate::types::{Outcome, Percent};

pub const RED_FLAG_MIN_PERIODS: usize = 3;

const LOOKBACK: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedFlag {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedFlagStatus {
    Clean,
    Caution,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedFlagReport {
    pub flags: Vec<RedFlag>,
    pub high_severity_count: usize,
    pub status: RedFlagStatus,
}

fn flag(title: &str, description: String, severity: Severity) -> RedFlag {
    RedFlag {
        title: title.to_string(),
        description,
        severity,
    }
}

/// Growth of `item` over the lookback window, ending at `last`.
fn window_growth(fs: &FinancialSeries, item: LineItem, last: usize) -> Option<Percent> {
    growth_pct(fs.value_back(item, last, LOOKBACK), fs.value(item, last))
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn receivables_outpacing_sales(fs: &FinancialSeries, last: usize) -> Option<RedFlag> {
    let sales = window_growth(fs, LineItem::Sales, last)?;
    let receivables = window_growth(fs, LineItem::Receivables, last)?;
    (change(Some(receivables), Some(sales))? > dec!(10)).then(|| {
        flag(
            "Receivables Growing Faster Than Sales",
            format!(
                "Receivables grew {:.1}% against sales growth of {:.1}% over two periods",
                receivables, sales
            ),
            Severity::High,
        )
    })
}

fn inventory_build_up(fs: &FinancialSeries, last: usize) -> Option<RedFlag> {
    let sales = window_growth(fs, LineItem::Sales, last)?;
    let inventory = window_growth(fs, LineItem::Inventory, last)?;
    (change(Some(inventory), Some(sales))? > dec!(15)).then(|| {
        flag(
            "Inventory Building Up",
            format!(
                "Inventory grew {:.1}% against sales growth of {:.1}% over two periods",
                inventory, sales
            ),
            Severity::Medium,
        )
    })
}

fn other_income_dependence(fs: &FinancialSeries, last: usize) -> Option<RedFlag> {
    let other = fs
        .value(LineItem::OtherIncome, last)
        .filter(|v| *v > Decimal::ZERO)?;
    let operating = operating_profit(fs, last)?;
    (other > operating * dec!(0.5)).then(|| {
        flag(
            "High Other Income",
            format!(
                "Other income of {} exceeds half of operating profit ({})",
                other.round_dp(2),
                operating.round_dp(2)
            ),
            Severity::Medium,
        )
    })
}

fn capital_work_in_progress(
    fs: &FinancialSeries,
    last: usize,
    config: &AnalysisConfig,
) -> Option<RedFlag> {
    let cwip = fs.value(LineItem::Cwip, last)?;
    let gross_block = fs
        .value(LineItem::NetBlock, last)?
        .checked_mul(config.gross_block_multiplier)?;
    (cwip > gross_block * dec!(0.3)).then(|| {
        flag(
            "High Capital Work in Progress",
            format!(
                "CWIP of {} exceeds 30% of estimated gross block ({})",
                cwip.round_dp(2),
                gross_block.round_dp(2)
            ),
            Severity::Medium,
        )
    })
}

fn debt_funded_decline(fs: &FinancialSeries, last: usize) -> Option<RedFlag> {
    let debt_growth = window_growth(fs, LineItem::Borrowings, last)?;
    let roce_now = roce(fs, last)?;
    let roce_then = roce(fs, last - LOOKBACK)?;
    (debt_growth > dec!(20) && roce_now < roce_then).then(|| {
        flag(
            "Rising Debt With Falling Returns",
            format!(
                "Borrowings grew {:.1}% while ROCE fell from {:.1}% to {:.1}%",
                debt_growth, roce_then, roce_now
            ),
            Severity::High,
        )
    })
}

fn status(flag_count: usize) -> RedFlagStatus {
    match flag_count {
        0 => RedFlagStatus::Clean,
        1..=2 => RedFlagStatus::Caution,
        _ => RedFlagStatus::Danger,
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every rule. Needs three periods.
pub fn detect_red_flags(fs: &FinancialSeries, config: &AnalysisConfig) -> Outcome<RedFlagReport> {
    Outcome::require(RED_FLAG_MIN_PERIODS, fs.len(), || {
        let last = fs.last_index();
        let flags: Vec<RedFlag> = [
            receivables_outpacing_sales(fs, last),
            inventory_build_up(fs, last),
            other_income_dependence(fs, last),
            capital_work_in_progress(fs, last, config),
            debt_funded_decline(fs, last),
        ]
        .into_iter()
        .flatten()
        .collect();

        let high_severity_count = flags
            .iter()
            .filter(|f| f.severity == Severity::High)
            .count();

        RedFlagReport {
            status: status(flags.len()),
            high_severity_count,
            flags,
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

    fn report(fs: &FinancialSeries) -> RedFlagReport {
        detect_red_flags(fs, &AnalysisConfig::default())
            .computed()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_receivables_outpacing_sales_is_high() {
        let fs = FinancialSeriesInput::fiscal_years(2021, 3)
            .with(LineItem::Sales, &[dec!(100), dec!(110), dec!(120)])
            .with(LineItem::Receivables, &[dec!(50), dec!(65), dec!(80)])
            .build()
            .unwrap();
        let r = report(&fs);
        assert_eq!(r.flags.len(), 1);
        assert_eq!(r.flags[0].title, "Receivables Growing Faster Than Sales");
        assert_eq!(r.flags[0].severity, Severity::High);
        assert!(r.flags[0].description.contains("60.0%"));
        assert!(r.flags[0].description.contains("20.0%"));
        assert_eq!(r.high_severity_count, 1);
        assert_eq!(r.status, RedFlagStatus::Caution);
    }

    #[test]
    fn test_two_periods_is_insufficient() {
        let fs = FinancialSeriesInput::fiscal_years(2022, 2).build().unwrap();
        assert_eq!(
            detect_red_flags(&fs, &AnalysisConfig::default()),
            Outcome::InsufficientData {
                required_periods: 3,
                available_periods: 2
            }
        );
    }

    #[test]
    fn test_absent_operands_never_fire() {
        let fs = FinancialSeriesInput::fiscal_years(2021, 3)
            .with(LineItem::Sales, &[dec!(100), dec!(110), dec!(120)])
            .with_optional(LineItem::Receivables, vec![None, Some(dec!(60)), Some(dec!(90))])
            .build()
            .unwrap();
        let r = report(&fs);
        assert!(r.flags.is_empty());
        assert_eq!(r.status, RedFlagStatus::Clean);
    }

    #[test]
    fn test_inventory_other_income_and_cwip() {
        let fs = FinancialSeriesInput::fiscal_years(2021, 3)
            .with(LineItem::Sales, &[dec!(100), dec!(105), dec!(110)])
            .with(LineItem::RawMaterial, &[dec!(80), dec!(84), dec!(90)])
            .with(LineItem::Inventory, &[dec!(20), dec!(25), dec!(30)])
            .with(LineItem::OtherIncome, &[dec!(5), dec!(8), dec!(12)])
            .with(LineItem::NetBlock, &[dec!(100); 3])
            .with(LineItem::Cwip, &[dec!(10), dec!(30), dec!(60)])
            .build()
            .unwrap();
        let r = report(&fs);
        let titles: Vec<&str> = r.flags.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Inventory Building Up",
                "High Other Income",
                "High Capital Work in Progress"
            ]
        );
        assert_eq!(r.high_severity_count, 0);
        assert_eq!(r.status, RedFlagStatus::Danger);
    }

    #[test]
    fn test_debt_growth_with_falling_roce() {
        let fs = FinancialSeriesInput::fiscal_years(2021, 3)
            .with(LineItem::Equity, &[dec!(100); 3])
            .with(LineItem::Borrowings, &[dec!(50), dec!(70), dec!(100)])
            .with(LineItem::Pbt, &[dec!(30), dec!(25), dec!(20)])
            .build()
            .unwrap();
        let r = report(&fs);
        assert_eq!(r.flags.len(), 1);
        assert_eq!(r.flags[0].title, "Rising Debt With Falling Returns");
        assert_eq!(r.flags[0].severity, Severity::High);
    }
}
