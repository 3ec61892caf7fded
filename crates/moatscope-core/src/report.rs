//! Full pipeline: every component run once over the same series, bundled
//! into a `Report`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::forensics::{
    calculate_trajectory, calculate_value_creation, detect_red_flags, EarningPowerTrajectory,
    RedFlagReport, ValueCreationTest,
};
use crate::ratios::{calculate_dupont, calculate_ratio_snapshot, DupontBreakdown, RatioSnapshot};
use crate::scoring::{
    calculate_capital_allocation, calculate_moat_score, calculate_quality_score,
    CapitalAllocationGrade, MoatScore, QualityScore,
};
use crate::series::FinancialSeries;
use crate::trends::{calculate_trends, calculate_value_migration, TrendAnalysis, ValueMigration};
use crate::types::{with_metadata, ComputationOutput, Outcome};
use crate::MoatscopeResult;

const METHODOLOGY: &str = "Multi-year fundamental analysis: ratio snapshot, DuPont, growth \
    trends, value migration, QUALITY_RUBRIC_V1, red flags, MOAT_RUBRIC_V2, \
    CAPITAL_ALLOCATION_RUBRIC_V2, earning-power trajectory and retained-earnings test";

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub company: Option<String>,
    pub periods: usize,
    pub latest_period: NaiveDate,
    pub ratios: RatioSnapshot,
    pub dupont: DupontBreakdown,
    pub trends: TrendAnalysis,
    pub value_migration: Outcome<ValueMigration>,
    pub quality: QualityScore,
    pub red_flags: Outcome<RedFlagReport>,
    pub moat: Outcome<MoatScore>,
    pub capital_allocation: Outcome<CapitalAllocationGrade>,
    pub trajectory: Outcome<EarningPowerTrajectory>,
    pub value_creation: Outcome<ValueCreationTest>,
}

impl Report {
    /// One line per component that could not run on this history.
    pub fn insufficient_data_warnings(&self) -> Vec<String> {
        [
            self.value_migration.insufficiency_warning("value_migration"),
            self.red_flags.insufficiency_warning("red_flags"),
            self.moat.insufficiency_warning("moat"),
            self.capital_allocation.insufficiency_warning("capital_allocation"),
            self.trajectory.insufficiency_warning("trajectory"),
            self.value_creation.insufficiency_warning("value_creation"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every component. The series is already structurally valid by
/// construction; the config is taken as given.
pub fn build_report(fs: &FinancialSeries, config: &AnalysisConfig) -> Report {
    Report {
        company: fs.company().map(str::to_string),
        periods: fs.len(),
        latest_period: fs.periods()[fs.last_index()],
        ratios: calculate_ratio_snapshot(fs, config),
        dupont: calculate_dupont(fs),
        trends: calculate_trends(fs, config),
        value_migration: calculate_value_migration(fs),
        quality: calculate_quality_score(fs, config),
        red_flags: detect_red_flags(fs, config),
        moat: calculate_moat_score(fs, config),
        capital_allocation: calculate_capital_allocation(fs, config),
        trajectory: calculate_trajectory(fs, config),
        value_creation: calculate_value_creation(fs, config),
    }
}

/// Validate the configuration and run the full pipeline for one company.
pub fn analyze(
    fs: &FinancialSeries,
    config: &AnalysisConfig,
) -> MoatscopeResult<ComputationOutput<Report>> {
    config.validate()?;
    let span = tracing::info_span!(
        "analyze",
        company = fs.company().unwrap_or("unnamed"),
        periods = fs.len()
    );
    let _guard = span.enter();

    let report = build_report(fs, config);
    let warnings = report.insufficient_data_warnings();
    if !warnings.is_empty() {
        tracing::debug!(count = warnings.len(), "components skipped for short history");
    }
    Ok(with_metadata(METHODOLOGY, config, warnings, report))
}

/// Analyse several companies independently. Keys are returned in order so
/// the output is deterministic.
pub fn compare(
    companies: &BTreeMap<String, FinancialSeries>,
    config: &AnalysisConfig,
) -> MoatscopeResult<ComputationOutput<BTreeMap<String, Report>>> {
    config.validate()?;
    let span = tracing::info_span!("compare", companies = companies.len());
    let _guard = span.enter();

    let mut warnings = Vec::new();
    let mut reports = BTreeMap::new();
    for (name, fs) in companies {
        let report = build_report(fs, config);
        warnings.extend(
            report
                .insufficient_data_warnings()
                .into_iter()
                .map(|w| format!("{name}: {w}")),
        );
        reports.insert(name.clone(), report);
    }
    Ok(with_metadata(METHODOLOGY, config, warnings, reports))
}
