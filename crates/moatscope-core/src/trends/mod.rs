pub mod growth;
pub mod value_migration;

pub use growth::{calculate_trends, GrowthSummary, TrailingTwelveMonths, TrendAnalysis};
pub use value_migration::{calculate_value_migration, MigrationDirection, ValueMigration};
