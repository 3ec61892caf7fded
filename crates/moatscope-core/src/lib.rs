pub mod config;
pub mod error;
pub mod forensics;
pub mod ratios;
pub mod report;
pub mod scoring;
pub mod series;
pub mod trends;
pub mod types;

pub use config::AnalysisConfig;
pub use error::MoatscopeError;
pub use report::{analyze, build_report, compare, Report};
pub use series::{FinancialSeries, FinancialSeriesInput, LineItem};
pub use types::*;

/// Standard result type for all moatscope operations
pub type MoatscopeResult<T> = Result<T, MoatscopeError>;
