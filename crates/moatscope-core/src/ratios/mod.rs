pub mod dupont;
pub mod snapshot;

pub use dupont::{calculate_dupont, DupontBreakdown};
pub use snapshot::{calculate_ratio_snapshot, RatioSnapshot};
