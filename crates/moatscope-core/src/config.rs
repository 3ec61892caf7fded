//! Tunable assumptions shared by every analysis component.
//!
//! Each constant the heuristics depend on lives here under a name so that a
//! caller can override it from a configuration file instead of patching code.
//! Rates that are compared against returns (`wacc.*`, trajectory thresholds)
//! are percentage points; tax and cash shares are fractions.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MoatscopeError;
use crate::types::{Days, Percent, Rate};
use crate::MoatscopeResult;

pub const DEFAULT_PAYABLE_DAYS: Days = dec!(30);
pub const DEFAULT_OPERATING_CASH_SHARE: Rate = dec!(0.02);
pub const DEFAULT_TAX_RATE: Rate = dec!(0.25);
pub const DEFAULT_MARGIN_WINDOW: usize = 5;
pub const DEFAULT_GROSS_BLOCK_MULTIPLIER: Decimal = dec!(1.5);
pub const DEFAULT_FIXED_WACC: Percent = dec!(13);
pub const DEFAULT_RISK_FREE_RATE: Percent = dec!(7);
pub const DEFAULT_BETA: Decimal = dec!(1.0);
pub const DEFAULT_EQUITY_RISK_PREMIUM: Percent = dec!(6);

/// How the hurdle rate for the competitive-advantage period is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaccMethod {
    /// CAPM cost of equity blended with after-tax cost of debt at book weights.
    #[default]
    Capm,
    /// A single hurdle rate for every company.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaccConfig {
    pub method: WaccMethod,
    pub fixed_rate: Percent,
    pub risk_free_rate: Percent,
    pub beta: Decimal,
    pub equity_risk_premium: Percent,
}

impl Default for WaccConfig {
    fn default() -> Self {
        Self {
            method: WaccMethod::Capm,
            fixed_rate: DEFAULT_FIXED_WACC,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            beta: DEFAULT_BETA,
            equity_risk_premium: DEFAULT_EQUITY_RISK_PREMIUM,
        }
    }
}

/// Quadrant cut-offs for the earning-power trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    /// 3-year PAT CAGR (%) above which a window counts as high-growth.
    pub growth_threshold: Percent,
    /// Average CFO/PAT (%) above which a window counts as high-cash.
    pub cash_conversion_threshold: Percent,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            growth_threshold: dec!(15),
            cash_conversion_threshold: dec!(80),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Creditor days subtracted in the cash-conversion cycle. Not derived
    /// from the statements.
    pub assumed_payable_days: Days,
    /// Share of sales held back as operating cash when netting excess cash
    /// out of invested capital.
    pub operating_cash_share_of_sales: Rate,
    /// Tax rate used when PBT is non-positive or the effective rate is absent.
    pub default_tax_rate: Rate,
    /// Number of trailing periods used for margin volatility.
    pub margin_volatility_window: usize,
    /// Net block is scaled by this factor to approximate gross block.
    pub gross_block_multiplier: Decimal,
    /// shares × price is divided by this to land in the statements' unit.
    pub market_cap_divisor: Decimal,
    pub wacc: WaccConfig,
    pub trajectory: TrajectoryConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            assumed_payable_days: DEFAULT_PAYABLE_DAYS,
            operating_cash_share_of_sales: DEFAULT_OPERATING_CASH_SHARE,
            default_tax_rate: DEFAULT_TAX_RATE,
            margin_volatility_window: DEFAULT_MARGIN_WINDOW,
            gross_block_multiplier: DEFAULT_GROSS_BLOCK_MULTIPLIER,
            market_cap_divisor: Decimal::ONE,
            wacc: WaccConfig::default(),
            trajectory: TrajectoryConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> MoatscopeResult<()> {
        if self.assumed_payable_days < Decimal::ZERO {
            return Err(MoatscopeError::invalid(
                "assumed_payable_days",
                "Must be non-negative",
            ));
        }
        if !is_fraction(self.operating_cash_share_of_sales) {
            return Err(MoatscopeError::invalid(
                "operating_cash_share_of_sales",
                "Must be between 0 and 1",
            ));
        }
        if !is_fraction(self.default_tax_rate) {
            return Err(MoatscopeError::invalid(
                "default_tax_rate",
                "Must be between 0 and 1",
            ));
        }
        if self.margin_volatility_window < 2 {
            return Err(MoatscopeError::invalid(
                "margin_volatility_window",
                "Needs at least 2 periods for a standard deviation",
            ));
        }
        if self.gross_block_multiplier <= Decimal::ZERO {
            return Err(MoatscopeError::invalid(
                "gross_block_multiplier",
                "Must be positive",
            ));
        }
        if self.market_cap_divisor <= Decimal::ZERO {
            return Err(MoatscopeError::invalid(
                "market_cap_divisor",
                "Must be positive",
            ));
        }
        if self.wacc.method == WaccMethod::Fixed && self.wacc.fixed_rate <= Decimal::ZERO {
            return Err(MoatscopeError::invalid(
                "wacc.fixed_rate",
                "Must be positive when the fixed method is selected",
            ));
        }
        if self.wacc.beta < Decimal::ZERO {
            return Err(MoatscopeError::invalid("wacc.beta", "Must be non-negative"));
        }
        Ok(())
    }
}

fn is_fraction(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}
