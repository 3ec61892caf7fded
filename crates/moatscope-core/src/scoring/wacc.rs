//! Hurdle rate for the competitive-advantage period.
//!
//! CAPM cost of equity blended with the after-tax cost of debt at book
//! weights taken from the latest capital base and borrowings, or a single
//! configured rate. All rates are percentage points.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, WaccMethod};
use crate::ratios::snapshot::effective_tax_rate;
use crate::series::math::percent;
use crate::series::{FinancialSeries, LineItem};
use crate::types::{Percent, Rate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaccEstimate {
    pub method: WaccMethod,
    pub cost_of_equity: Option<Percent>,
    pub cost_of_debt_after_tax: Option<Percent>,
    pub equity_weight: Option<Rate>,
    pub debt_weight: Option<Rate>,
    pub wacc: Percent,
}

fn capm(fs: &FinancialSeries, config: &AnalysisConfig) -> WaccEstimate {
    let w = &config.wacc;
    let last = fs.last_index();
    let cost_of_equity = w.risk_free_rate + w.beta * w.equity_risk_premium;

    let debt = fs
        .value(LineItem::Borrowings, last)
        .filter(|d| *d > Decimal::ZERO);
    let cost_of_debt_after_tax = debt.and_then(|d| {
        let pre_tax = percent(fs.value(LineItem::Interest, last), Some(d))?;
        pre_tax.checked_mul(Decimal::ONE - effective_tax_rate(fs, last, config))
    });
    let equity = fs
        .capital_base(last)
        .filter(|e| *e > Decimal::ZERO)
        .unwrap_or(Decimal::ZERO);

    let (equity_weight, debt_weight, wacc) = match (debt, cost_of_debt_after_tax) {
        (Some(d), Some(kd)) => {
            let total = equity + d;
            let we = equity / total;
            let wd = d / total;
            (we, wd, we * cost_of_equity + wd * kd)
        }
        (Some(_), None) => {
            tracing::debug!("borrowings without interest cost; WACC falls back to cost of equity");
            (Decimal::ONE, Decimal::ZERO, cost_of_equity)
        }
        (None, _) => (Decimal::ONE, Decimal::ZERO, cost_of_equity),
    };

    WaccEstimate {
        method: WaccMethod::Capm,
        cost_of_equity: Some(cost_of_equity),
        cost_of_debt_after_tax,
        equity_weight: Some(equity_weight),
        debt_weight: Some(debt_weight),
        wacc,
    }
}

/// Estimate the hurdle rate with the configured method.
pub fn estimate_wacc(fs: &FinancialSeries, config: &AnalysisConfig) -> WaccEstimate {
    match config.wacc.method {
        WaccMethod::Capm => capm(fs, config),
        WaccMethod::Fixed => WaccEstimate {
            method: WaccMethod::Fixed,
            cost_of_equity: None,
            cost_of_debt_after_tax: None,
            equity_weight: None,
            debt_weight: None,
            wacc: config.wacc.fixed_rate,
        },
    }
}
