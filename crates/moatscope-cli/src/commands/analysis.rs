use std::collections::BTreeMap;

use clap::Args;
use serde_json::Value;

use moatscope_core::{analyze, compare, FinancialSeries};

use super::{load_series, CliResult, ConfigArgs, SeriesArgs};
use crate::input;

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub series: SeriesArgs,
}

#[derive(Args)]
pub struct CompareArgs {
    /// FinancialSeries JSON file; repeat once per company
    #[arg(long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<String>,
}

pub fn run_analyze(args: AnalyzeArgs, config: &ConfigArgs) -> CliResult<Value> {
    let config = config.resolve()?;
    let series = load_series(&args.series)?;
    let result = analyze(&series, &config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: CompareArgs, config: &ConfigArgs) -> CliResult<Value> {
    let config = config.resolve()?;
    let mut companies: BTreeMap<String, FinancialSeries> = BTreeMap::new();
    for path in &args.inputs {
        let series: FinancialSeries = input::file::read_json(path)?;
        let name = series
            .company()
            .map(str::to_string)
            .unwrap_or_else(|| input::file::stem(path));
        if companies.insert(name.clone(), series).is_some() {
            return Err(format!("Duplicate company '{}' in compare inputs", name).into());
        }
    }
    let result = compare(&companies, &config)?;
    Ok(serde_json::to_value(result)?)
}
