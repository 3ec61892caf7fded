//! One subcommand per analysis component, each wrapped in the standard
//! output envelope.

use clap::Args;
use serde::Serialize;
use serde_json::Value;

use moatscope_core::forensics::{calculate_trajectory, calculate_value_creation, detect_red_flags};
use moatscope_core::ratios::{calculate_dupont, calculate_ratio_snapshot};
use moatscope_core::scoring::{
    calculate_capital_allocation, calculate_moat_score, calculate_quality_score, MOAT_METHODOLOGY,
};
use moatscope_core::types::with_metadata;
use moatscope_core::{AnalysisConfig, FinancialSeries, Outcome};

use super::{load_series, CliResult, ConfigArgs, SeriesArgs};

#[derive(Args)]
pub struct ComponentArgs {
    #[command(flatten)]
    pub series: SeriesArgs,
}

fn run<T: Serialize>(
    args: ComponentArgs,
    config: &ConfigArgs,
    methodology: &str,
    compute: impl FnOnce(&FinancialSeries, &AnalysisConfig) -> (T, Vec<String>),
) -> CliResult<Value> {
    let config = config.resolve()?;
    let series = load_series(&args.series)?;
    let (result, warnings) = compute(&series, &config);
    Ok(serde_json::to_value(with_metadata(
        methodology,
        &config,
        warnings,
        result,
    ))?)
}

fn gated<T>(name: &str, outcome: Outcome<T>) -> (Outcome<T>, Vec<String>) {
    let warnings = outcome.insufficiency_warning(name).into_iter().collect();
    (outcome, warnings)
}

#[derive(Serialize)]
struct RatiosResult {
    snapshot: moatscope_core::ratios::RatioSnapshot,
    dupont: moatscope_core::ratios::DupontBreakdown,
}

pub fn run_ratios(args: ComponentArgs, config: &ConfigArgs) -> CliResult<Value> {
    run(args, config, "Latest-period ratio snapshot with DuPont decomposition", |fs, cfg| {
        let result = RatiosResult {
            snapshot: calculate_ratio_snapshot(fs, cfg),
            dupont: calculate_dupont(fs),
        };
        (result, Vec::new())
    })
}

pub fn run_quality(args: ComponentArgs, config: &ConfigArgs) -> CliResult<Value> {
    run(args, config, "QUALITY_RUBRIC_V1 (100 points, five dimensions)", |fs, cfg| {
        (calculate_quality_score(fs, cfg), Vec::new())
    })
}

pub fn run_red_flags(args: ComponentArgs, config: &ConfigArgs) -> CliResult<Value> {
    run(args, config, "Two-period red-flag rules", |fs, cfg| {
        gated("red_flags", detect_red_flags(fs, cfg))
    })
}

pub fn run_moat(args: ComponentArgs, config: &ConfigArgs) -> CliResult<Value> {
    run(args, config, MOAT_METHODOLOGY, |fs, cfg| {
        gated("moat", calculate_moat_score(fs, cfg))
    })
}

pub fn run_capital_allocation(args: ComponentArgs, config: &ConfigArgs) -> CliResult<Value> {
    run(
        args,
        config,
        "CAPITAL_ALLOCATION_RUBRIC_V2 (reinvestment 60 + deployment 40)",
        |fs, cfg| gated("capital_allocation", calculate_capital_allocation(fs, cfg)),
    )
}

pub fn run_trajectory(args: ComponentArgs, config: &ConfigArgs) -> CliResult<Value> {
    run(args, config, "Earning-power trajectory (3-year windows)", |fs, cfg| {
        gated("trajectory", calculate_trajectory(fs, cfg))
    })
}

pub fn run_value_test(args: ComponentArgs, config: &ConfigArgs) -> CliResult<Value> {
    run(args, config, "Retained-earnings value creation test", |fs, cfg| {
        gated("value_creation", calculate_value_creation(fs, cfg))
    })
}
