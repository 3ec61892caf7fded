//! The validated, immutable multi-year statement series every analysis
//! component reads.
//!
//! A `FinancialSeries` can only be obtained through validation: all line-item
//! arrays have exactly one slot per period, periods are strictly increasing
//! (oldest first), and a missing observation is `None`. Line items omitted
//! from the input document become all-`None` arrays.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MoatscopeError;
use crate::types::Money;
use crate::MoatscopeResult;

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

/// Named statement rows carried by a [`FinancialSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItem {
    // Profit & loss
    Sales,
    RawMaterial,
    ChangeInInventory,
    PowerFuel,
    OtherMfg,
    EmployeeCost,
    SellingAdmin,
    OtherExpenses,
    OtherIncome,
    Depreciation,
    Interest,
    Pbt,
    Tax,
    NetProfit,
    Dividend,
    // Balance sheet
    Equity,
    Reserves,
    Borrowings,
    OtherLiabilities,
    TotalLiabilities,
    NetBlock,
    Cwip,
    Investments,
    OtherAssets,
    TotalAssets,
    Receivables,
    Inventory,
    Cash,
    Shares,
    // Cash flow
    Cfo,
    Cfi,
    Cff,
    NetCashFlow,
    // Market
    Price,
}

impl LineItem {
    pub const ALL: [LineItem; 34] = [
        LineItem::Sales,
        LineItem::RawMaterial,
        LineItem::ChangeInInventory,
        LineItem::PowerFuel,
        LineItem::OtherMfg,
        LineItem::EmployeeCost,
        LineItem::SellingAdmin,
        LineItem::OtherExpenses,
        LineItem::OtherIncome,
        LineItem::Depreciation,
        LineItem::Interest,
        LineItem::Pbt,
        LineItem::Tax,
        LineItem::NetProfit,
        LineItem::Dividend,
        LineItem::Equity,
        LineItem::Reserves,
        LineItem::Borrowings,
        LineItem::OtherLiabilities,
        LineItem::TotalLiabilities,
        LineItem::NetBlock,
        LineItem::Cwip,
        LineItem::Investments,
        LineItem::OtherAssets,
        LineItem::TotalAssets,
        LineItem::Receivables,
        LineItem::Inventory,
        LineItem::Cash,
        LineItem::Shares,
        LineItem::Cfo,
        LineItem::Cfi,
        LineItem::Cff,
        LineItem::NetCashFlow,
        LineItem::Price,
    ];

    /// Operating cost rows subtracted from sales to reach operating profit.
    pub const OPERATING_COSTS: [LineItem; 7] = [
        LineItem::RawMaterial,
        LineItem::ChangeInInventory,
        LineItem::PowerFuel,
        LineItem::OtherMfg,
        LineItem::EmployeeCost,
        LineItem::SellingAdmin,
        LineItem::OtherExpenses,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LineItem::Sales => "sales",
            LineItem::RawMaterial => "raw_material",
            LineItem::ChangeInInventory => "change_in_inventory",
            LineItem::PowerFuel => "power_fuel",
            LineItem::OtherMfg => "other_mfg",
            LineItem::EmployeeCost => "employee_cost",
            LineItem::SellingAdmin => "selling_admin",
            LineItem::OtherExpenses => "other_expenses",
            LineItem::OtherIncome => "other_income",
            LineItem::Depreciation => "depreciation",
            LineItem::Interest => "interest",
            LineItem::Pbt => "pbt",
            LineItem::Tax => "tax",
            LineItem::NetProfit => "net_profit",
            LineItem::Dividend => "dividend",
            LineItem::Equity => "equity",
            LineItem::Reserves => "reserves",
            LineItem::Borrowings => "borrowings",
            LineItem::OtherLiabilities => "other_liabilities",
            LineItem::TotalLiabilities => "total_liabilities",
            LineItem::NetBlock => "net_block",
            LineItem::Cwip => "cwip",
            LineItem::Investments => "investments",
            LineItem::OtherAssets => "other_assets",
            LineItem::TotalAssets => "total_assets",
            LineItem::Receivables => "receivables",
            LineItem::Inventory => "inventory",
            LineItem::Cash => "cash",
            LineItem::Shares => "shares",
            LineItem::Cfo => "cfo",
            LineItem::Cfi => "cfi",
            LineItem::Cff => "cff",
            LineItem::NetCashFlow => "net_cash_flow",
            LineItem::Price => "price",
        }
    }
}

// ---------------------------------------------------------------------------
// Input documents
// ---------------------------------------------------------------------------

/// Unvalidated annual series as produced by the ingestion layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialSeriesInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Period-end dates, oldest first.
    pub periods: Vec<NaiveDate>,
    #[serde(default)]
    pub line_items: BTreeMap<LineItem, Vec<Option<Money>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarterly: Option<QuarterlySeriesInput>,
}

/// Unvalidated quarterly block. Only sales and net profit are tracked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuarterlySeriesInput {
    pub periods: Vec<NaiveDate>,
    #[serde(default)]
    pub sales: Option<Vec<Option<Money>>>,
    #[serde(default)]
    pub net_profit: Option<Vec<Option<Money>>>,
}

impl FinancialSeriesInput {
    /// Empty input with one period per fiscal year ending 31 December.
    pub fn fiscal_years(first_year: i32, count: usize) -> Self {
        let periods = (0..count)
            .filter_map(|offset| NaiveDate::from_ymd_opt(first_year + offset as i32, 12, 31))
            .collect();
        Self {
            periods,
            ..Self::default()
        }
    }

    pub fn company(mut self, name: impl Into<String>) -> Self {
        self.company = Some(name.into());
        self
    }

    /// Set a line item where every period is observed.
    pub fn with(mut self, item: LineItem, values: &[Money]) -> Self {
        self.line_items
            .insert(item, values.iter().copied().map(Some).collect());
        self
    }

    /// Set a line item that may contain gaps.
    pub fn with_optional(mut self, item: LineItem, values: Vec<Option<Money>>) -> Self {
        self.line_items.insert(item, values);
        self
    }

    pub fn build(self) -> MoatscopeResult<FinancialSeries> {
        FinancialSeries::try_from(self)
    }
}

// ---------------------------------------------------------------------------
// Validated series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuarterlySeriesInput")]
pub struct QuarterlySeries {
    periods: Vec<NaiveDate>,
    sales: Vec<Option<Money>>,
    net_profit: Vec<Option<Money>>,
}

impl QuarterlySeries {
    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn sales(&self) -> &[Option<Money>] {
        &self.sales
    }

    pub fn net_profit(&self) -> &[Option<Money>] {
        &self.net_profit
    }
}

impl TryFrom<QuarterlySeriesInput> for QuarterlySeries {
    type Error = MoatscopeError;

    fn try_from(input: QuarterlySeriesInput) -> MoatscopeResult<Self> {
        validate_periods("quarterly.periods", &input.periods)?;
        let n = input.periods.len();
        let sales = aligned("quarterly.sales", input.sales, n)?;
        let net_profit = aligned("quarterly.net_profit", input.net_profit, n)?;
        Ok(Self {
            periods: input.periods,
            sales,
            net_profit,
        })
    }
}

/// Immutable, length-aligned annual statement series for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FinancialSeriesInput")]
pub struct FinancialSeries {
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<String>,
    periods: Vec<NaiveDate>,
    line_items: BTreeMap<LineItem, Vec<Option<Money>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quarterly: Option<QuarterlySeries>,
}

impl TryFrom<FinancialSeriesInput> for FinancialSeries {
    type Error = MoatscopeError;

    fn try_from(input: FinancialSeriesInput) -> MoatscopeResult<Self> {
        validate_periods("periods", &input.periods)?;
        let n = input.periods.len();

        let mut provided = input.line_items;
        let mut line_items = BTreeMap::new();
        for item in LineItem::ALL {
            let values = provided.remove(&item);
            line_items.insert(item, aligned(item.name(), values, n)?);
        }

        let quarterly = input
            .quarterly
            .map(QuarterlySeries::try_from)
            .transpose()?;

        Ok(Self {
            company: input.company,
            periods: input.periods,
            line_items,
            quarterly,
        })
    }
}

impl FinancialSeries {
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn period(&self, index: usize) -> Option<NaiveDate> {
        self.periods.get(index).copied()
    }

    /// Number of annual periods. Always at least one.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.periods.len().saturating_sub(1)
    }

    pub fn quarterly(&self) -> Option<&QuarterlySeries> {
        self.quarterly.as_ref()
    }

    /// The full row for a line item, one slot per period.
    pub fn series(&self, item: LineItem) -> &[Option<Money>] {
        self.line_items
            .get(&item)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// A single observation; `None` when absent or out of range.
    pub fn value(&self, item: LineItem, index: usize) -> Option<Money> {
        self.series(item).get(index).copied().flatten()
    }

    /// Observation `back` periods before `index`, if that period exists.
    pub fn value_back(&self, item: LineItem, index: usize, back: usize) -> Option<Money> {
        index
            .checked_sub(back)
            .and_then(|earlier| self.value(item, earlier))
    }

    /// Shareholders' funds: equity capital plus reserves. Absent only when
    /// both components are absent.
    pub fn capital_base(&self, index: usize) -> Option<Money> {
        match (
            self.value(LineItem::Equity, index),
            self.value(LineItem::Reserves, index),
        ) {
            (None, None) => None,
            (equity, reserves) => {
                equity
                    .unwrap_or(Decimal::ZERO)
                    .checked_add(reserves.unwrap_or(Decimal::ZERO))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_periods(field: &str, periods: &[NaiveDate]) -> MoatscopeResult<()> {
    if periods.is_empty() {
        return Err(MoatscopeError::invalid(
            field,
            "At least one period is required",
        ));
    }
    if let Some(pair) = periods.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(MoatscopeError::invalid(
            field,
            format!(
                "Periods must be strictly increasing (oldest first); {} is followed by {}",
                pair[0], pair[1]
            ),
        ));
    }
    Ok(())
}

/// An omitted row becomes all-absent; a supplied row must match the period
/// count exactly, even when empty.
fn aligned(
    field: &str,
    values: Option<Vec<Option<Money>>>,
    expected: usize,
) -> MoatscopeResult<Vec<Option<Money>>> {
    let Some(values) = values else {
        return Ok(vec![None; expected]);
    };
    if values.len() != expected {
        return Err(MoatscopeError::invalid(
            field,
            format!("Expected {expected} values, got {}", values.len()),
        ));
    }
    Ok(values)
}

// ===========================================================================
// Tests
// ===========================================================================
