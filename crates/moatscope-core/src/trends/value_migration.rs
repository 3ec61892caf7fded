//! Value migration: is economic value flowing toward the business or away
//! from it? Compares five-year sales growth with the change in net margin
//! and ROCE over the same window.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::ratios::snapshot::{net_margin, roce};
use crate::series::math::{cagr, change};
use crate::series::{FinancialSeries, LineItem};
use crate::types::{Outcome, Percent};

const LOOKBACK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationDirection {
    StrongInward,
    Inward,
    Stable,
    Outward,
}

impl MigrationDirection {
    /// 4 = strongest inflow, 1 = outflow.
    pub fn strength(&self) -> u8 {
        match self {
            MigrationDirection::StrongInward => 4,
            MigrationDirection::Inward => 3,
            MigrationDirection::Stable => 2,
            MigrationDirection::Outward => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueMigration {
    pub sales_cagr_5y: Option<Percent>,
    /// Net margin change in percentage points.
    pub margin_change: Option<Percent>,
    /// ROCE change in percentage points.
    pub roce_change: Option<Percent>,
    pub direction: MigrationDirection,
    pub strength: u8,
}

fn exceeds(value: Option<Decimal>, threshold: Decimal) -> bool {
    value.is_some_and(|v| v > threshold)
}

fn classify(
    sales_cagr: Option<Percent>,
    margin_change: Option<Percent>,
    roce_change: Option<Percent>,
) -> MigrationDirection {
    if exceeds(sales_cagr, dec!(15))
        && exceeds(margin_change, dec!(2))
        && exceeds(roce_change, Decimal::ZERO)
    {
        MigrationDirection::StrongInward
    } else if exceeds(sales_cagr, dec!(10)) && exceeds(margin_change, Decimal::ZERO) {
        MigrationDirection::Inward
    } else if exceeds(sales_cagr, dec!(5)) {
        MigrationDirection::Stable
    } else {
        MigrationDirection::Outward
    }
}

/// Classify value migration over the trailing five years. Needs six periods.
pub fn calculate_value_migration(fs: &FinancialSeries) -> Outcome<ValueMigration> {
    Outcome::require(LOOKBACK + 1, fs.len(), || {
        let last = fs.last_index();
        let start = last - LOOKBACK;

        let sales_cagr_5y = cagr(fs.series(LineItem::Sales), LOOKBACK);
        let margin_change = change(net_margin(fs, last), net_margin(fs, start));
        let roce_change = change(roce(fs, last), roce(fs, start));
        let direction = classify(sales_cagr_5y, margin_change, roce_change);

        ValueMigration {
            sales_cagr_5y,
            margin_change,
            roce_change,
            direction,
            strength: direction.strength(),
        }
    })
}
