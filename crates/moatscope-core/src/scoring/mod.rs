pub mod breakdown;
pub mod capital_allocation;
pub mod moat;
pub mod quality;
pub mod wacc;

pub use breakdown::{DimensionScore, ScoreBreakdown};
pub use capital_allocation::{calculate_capital_allocation, CapitalAllocationGrade};
pub use moat::{calculate_moat_score, competitive_advantage_period, MoatScore, MOAT_METHODOLOGY};
pub use quality::{calculate_quality_score, QualityScore};
pub use wacc::{estimate_wacc, WaccEstimate};
