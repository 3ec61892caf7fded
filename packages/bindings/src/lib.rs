use std::collections::BTreeMap;

use napi::Result as NapiResult;
use napi_derive::napi;
use serde::{Deserialize, Serialize};

use moatscope_core::forensics::{calculate_trajectory, calculate_value_creation, detect_red_flags};
use moatscope_core::ratios::{
    calculate_dupont, calculate_ratio_snapshot, DupontBreakdown, RatioSnapshot,
};
use moatscope_core::scoring::{
    calculate_capital_allocation, calculate_moat_score, calculate_quality_score, MOAT_METHODOLOGY,
};
use moatscope_core::types::with_metadata;
use moatscope_core::{AnalysisConfig, FinancialSeries, Outcome};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// `{"series": {...}, "config": {...}}`; config may be omitted.
#[derive(Deserialize)]
struct SeriesRequest {
    series: FinancialSeries,
    #[serde(default)]
    config: AnalysisConfig,
}

/// `{"companies": {"name": {...}}, "config": {...}}`
#[derive(Deserialize)]
struct CompareRequest {
    companies: BTreeMap<String, FinancialSeries>,
    #[serde(default)]
    config: AnalysisConfig,
}

fn parse_series_request(input_json: &str) -> NapiResult<SeriesRequest> {
    let request: SeriesRequest = serde_json::from_str(input_json).map_err(to_napi_error)?;
    request.config.validate().map_err(to_napi_error)?;
    Ok(request)
}

fn component<T: Serialize>(
    input_json: &str,
    methodology: &str,
    compute: impl FnOnce(&FinancialSeries, &AnalysisConfig) -> (T, Vec<String>),
) -> NapiResult<String> {
    let request = parse_series_request(input_json)?;
    let (result, warnings) = compute(&request.series, &request.config);
    let output = with_metadata(methodology, &request.config, warnings, result);
    serde_json::to_string(&output).map_err(to_napi_error)
}

fn gated<T>(name: &str, outcome: Outcome<T>) -> (Outcome<T>, Vec<String>) {
    let warnings = outcome.insufficiency_warning(name).into_iter().collect();
    (outcome, warnings)
}

// ---------------------------------------------------------------------------
// Full report
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze(input_json: String) -> NapiResult<String> {
    let request: SeriesRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        moatscope_core::analyze(&request.series, &request.config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare(input_json: String) -> NapiResult<String> {
    let request: CompareRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        moatscope_core::compare(&request.companies, &request.config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RatiosResult {
    snapshot: RatioSnapshot,
    dupont: DupontBreakdown,
}

#[napi]
pub fn ratios(input_json: String) -> NapiResult<String> {
    component(&input_json, "Latest-period ratio snapshot with DuPont decomposition", |fs, cfg| {
        let result = RatiosResult {
            snapshot: calculate_ratio_snapshot(fs, cfg),
            dupont: calculate_dupont(fs),
        };
        (result, Vec::new())
    })
}

#[napi]
pub fn quality_score(input_json: String) -> NapiResult<String> {
    component(&input_json, "QUALITY_RUBRIC_V1 (100 points, five dimensions)", |fs, cfg| {
        (calculate_quality_score(fs, cfg), Vec::new())
    })
}

#[napi]
pub fn red_flags(input_json: String) -> NapiResult<String> {
    component(&input_json, "Two-period red-flag rules", |fs, cfg| {
        gated("red_flags", detect_red_flags(fs, cfg))
    })
}

#[napi]
pub fn moat_score(input_json: String) -> NapiResult<String> {
    component(&input_json, MOAT_METHODOLOGY, |fs, cfg| {
        gated("moat", calculate_moat_score(fs, cfg))
    })
}

#[napi]
pub fn capital_allocation(input_json: String) -> NapiResult<String> {
    component(
        &input_json,
        "CAPITAL_ALLOCATION_RUBRIC_V2 (reinvestment 60 + deployment 40)",
        |fs, cfg| gated("capital_allocation", calculate_capital_allocation(fs, cfg)),
    )
}

#[napi]
pub fn earning_power_trajectory(input_json: String) -> NapiResult<String> {
    component(&input_json, "Earning-power trajectory (3-year windows)", |fs, cfg| {
        gated("trajectory", calculate_trajectory(fs, cfg))
    })
}

#[napi]
pub fn value_creation_test(input_json: String) -> NapiResult<String> {
    component(&input_json, "Retained-earnings value creation test", |fs, cfg| {
        gated("value_creation", calculate_value_creation(fs, cfg))
    })
}
