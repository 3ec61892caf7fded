use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MoatscopeError;
use crate::MoatscopeResult;

/// Reported money amounts, in whatever unit the statements were filed in.
pub type Money = Decimal;

/// Fractions (0.25 = 25%). Used for tax rates and reserve shares.
pub type Rate = Decimal;

/// Percentage points (12.5 = 12.5%). Returns, margins and growth rates.
pub type Percent = Decimal;

/// Multiples (e.g., 1.8x asset turnover)
pub type Multiple = Decimal;

/// Day counts (debtor days, inventory days)
pub type Days = Decimal;

/// A single derived value tagged with the fiscal period it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodValue {
    pub period: NaiveDate,
    pub value: Option<Decimal>,
}

/// Result of a component that needs a minimum history length.
///
/// `InsufficientData` is not an error: it tells the caller the series was
/// well-formed but too short for this particular computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Computed(T),
    InsufficientData {
        required_periods: usize,
        available_periods: usize,
    },
}

impl<T> Outcome<T> {
    /// Gate a computation on the number of available periods.
    pub fn require(
        required_periods: usize,
        available_periods: usize,
        compute: impl FnOnce() -> T,
    ) -> Self {
        if available_periods < required_periods {
            tracing::debug!(
                required_periods,
                available_periods,
                "insufficient history for component"
            );
            Outcome::InsufficientData {
                required_periods,
                available_periods,
            }
        } else {
            Outcome::Computed(compute())
        }
    }

    pub fn computed(&self) -> Option<&T> {
        match self {
            Outcome::Computed(value) => Some(value),
            Outcome::InsufficientData { .. } => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Outcome::Computed(_))
    }

    /// Human-readable note for an envelope's warnings, when the component
    /// did not run.
    pub fn insufficiency_warning(&self, component: &str) -> Option<String> {
        match self {
            Outcome::Computed(_) => None,
            Outcome::InsufficientData {
                required_periods,
                available_periods,
            } => Some(format!(
                "{component}: insufficient data ({available_periods} of {required_periods} periods required)"
            )),
        }
    }

    /// For callers that cannot proceed without the value.
    pub fn into_result(self, component: &str) -> MoatscopeResult<T> {
        match self {
            Outcome::Computed(value) => Ok(value),
            Outcome::InsufficientData {
                required_periods,
                available_periods,
            } => Err(MoatscopeError::InsufficientData(format!(
                "{component} needs {required_periods} periods, got {available_periods}"
            ))),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation. Carries no clock values so that repeated
/// runs over the same input serialise identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
