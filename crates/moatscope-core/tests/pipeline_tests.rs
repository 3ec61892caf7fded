use std::collections::BTreeMap;

use moatscope_core::forensics::{Quadrant, TrajectoryPattern};
use moatscope_core::{
    analyze, compare, AnalysisConfig, FinancialSeries, FinancialSeriesInput, LineItem,
    MoatscopeError, Outcome,
};
use pretty_assertions::assert_eq;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

/// Ten years of a steadily compounding, debt-light manufacturer.
fn compounder() -> FinancialSeries {
    let sales: Vec<Decimal> = (0..10u32)
        .map(|i| dec!(1000) * dec!(1.18).powu(i as u64))
        .map(|s| s.round_dp(2))
        .collect();
    let scale = |share: Decimal| -> Vec<Decimal> {
        sales.iter().map(|s| (s * share).round_dp(2)).collect()
    };
    let reserves: Vec<Decimal> = (0..10u32).map(|i| dec!(400) + dec!(120) * Decimal::from(i)).collect();

    FinancialSeriesInput::fiscal_years(2015, 10)
        .company("Steady Compounder Ltd")
        .with(LineItem::Sales, &sales)
        .with(LineItem::RawMaterial, &scale(dec!(0.45)))
        .with(LineItem::EmployeeCost, &scale(dec!(0.1)))
        .with(LineItem::SellingAdmin, &scale(dec!(0.08)))
        .with(LineItem::OtherIncome, &scale(dec!(0.01)))
        .with(LineItem::Depreciation, &scale(dec!(0.03)))
        .with(LineItem::Interest, &[dec!(6); 10])
        .with(LineItem::Pbt, &scale(dec!(0.27)))
        .with(LineItem::Tax, &scale(dec!(0.07)))
        .with(LineItem::NetProfit, &scale(dec!(0.2)))
        .with(LineItem::Dividend, &scale(dec!(0.04)))
        .with(LineItem::Equity, &[dec!(100); 10])
        .with(LineItem::Reserves, &reserves)
        .with(LineItem::Borrowings, &[dec!(60); 10])
        .with(LineItem::TotalAssets, &scale(dec!(0.9)))
        .with(LineItem::NetBlock, &scale(dec!(0.4)))
        .with(LineItem::Cwip, &scale(dec!(0.02)))
        .with(LineItem::Receivables, &scale(dec!(0.1)))
        .with(LineItem::Inventory, &scale(dec!(0.05)))
        .with(LineItem::Cash, &scale(dec!(0.03)))
        .with(LineItem::Cfo, &scale(dec!(0.22)))
        .with(LineItem::Cfi, &scale(dec!(-0.06)))
        .build()
        .unwrap()
}

// ===========================================================================
// Full pipeline
// ===========================================================================

#[test]
fn test_pipeline_is_idempotent() {
    let fs = compounder();
    let cfg = AnalysisConfig::default();
    let first = serde_json::to_string(&analyze(&fs, &cfg).unwrap()).unwrap();
    let second = serde_json::to_string(&analyze(&fs, &cfg).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_full_history_computes_every_component() {
    let out = analyze(&compounder(), &AnalysisConfig::default()).unwrap();
    let r = &out.result;

    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    assert_eq!(r.company.as_deref(), Some("Steady Compounder Ltd"));
    assert_eq!(r.periods, 10);
    assert!(r.value_migration.is_computed());
    assert!(r.moat.is_computed());
    assert!(r.capital_allocation.is_computed());
    assert!(r.trajectory.is_computed());
    assert!(r.value_creation.is_computed());

    let flags = r.red_flags.computed().unwrap();
    assert!(flags.flags.is_empty(), "{:?}", flags.flags);

    let trajectory = r.trajectory.computed().unwrap();
    assert_eq!(trajectory.trajectory.len(), 7);
    assert_eq!(trajectory.current_quadrant, Quadrant::Star);
    assert_eq!(trajectory.pattern, TrajectoryPattern::ConsistentCompounder);
}

#[test]
fn test_compounder_scores() {
    let out = analyze(&compounder(), &AnalysisConfig::default()).unwrap();
    let r = &out.result;

    let margin = r.ratios.net_margin.unwrap();
    assert!((margin - dec!(20)).abs() < dec!(0.01));
    assert!(r.quality.breakdown.total >= 75, "{:?}", r.quality.breakdown);

    let moat = r.moat.computed().unwrap();
    assert_eq!(moat.cap_window, 7);
    assert_eq!(moat.cap_years, 7);
    assert!(moat.breakdown.total <= 14);
}

#[test]
fn test_json_shape_of_gated_components() {
    let fs = FinancialSeriesInput::fiscal_years(2023, 2)
        .with(LineItem::Sales, &[dec!(100), dec!(110)])
        .build()
        .unwrap();
    let out = analyze(&fs, &AnalysisConfig::default()).unwrap();
    let json = serde_json::to_value(&out).unwrap();

    assert_eq!(json["result"]["moat"]["status"], "insufficient_data");
    assert_eq!(json["result"]["moat"]["value"]["required_periods"], 5);
    assert_eq!(json["result"]["dupont"]["roe"], serde_json::Value::Null);
    assert_eq!(json["metadata"]["precision"], "rust_decimal_128bit");
}

#[test]
fn test_extreme_margins_degrade_to_absent() {
    // Near-zero sales push net margins past 1e16% and debtor days past the
    // decimal range; squared deviations overflow too.
    let fs = FinancialSeriesInput::fiscal_years(2018, 6)
        .with(LineItem::Sales, &[dec!(0.000001); 6])
        .with(
            LineItem::NetProfit,
            &[dec!(1), dec!(1000000000), dec!(1), dec!(1000000000), dec!(1), dec!(1000000000)],
        )
        .with(LineItem::Receivables, &[dec!(1000000000000000000000); 6])
        .build()
        .unwrap();
    let out = analyze(&fs, &AnalysisConfig::default()).unwrap();
    let r = &out.result;

    assert_eq!(r.quality.metrics.net_margin_volatility, None);
    assert!(r.quality.breakdown.total <= 100);
    assert!(r.moat.is_computed());
    assert_eq!(r.moat.computed().unwrap().signals.margin_volatility, None);
    assert_eq!(r.ratios.debtor_days, None);
}

// ===========================================================================
// Input handling
// ===========================================================================

#[test]
fn test_series_from_json_document() {
    let doc = r#"{
        "company": "Json Co",
        "periods": ["2021-03-31", "2022-03-31", "2023-03-31"],
        "line_items": {
            "sales": ["100", "120", "150"],
            "net_profit": ["10", null, "18"],
            "equity": ["50", "50", "50"]
        }
    }"#;
    let fs: FinancialSeries = serde_json::from_str(doc).unwrap();
    assert_eq!(fs.len(), 3);
    assert_eq!(fs.value(LineItem::NetProfit, 1), None);
    assert_eq!(fs.series(LineItem::Borrowings), &[None, None, None]);

    let out = analyze(&fs, &AnalysisConfig::default()).unwrap();
    assert_eq!(out.result.ratios.net_margin, Some(dec!(12)));
    assert!(matches!(out.result.red_flags, Outcome::Computed(_)));
}

#[test]
fn test_misaligned_json_document_rejected() {
    let doc = r#"{
        "periods": ["2022-03-31", "2023-03-31"],
        "line_items": { "sales": ["100"] }
    }"#;
    let err = serde_json::from_str::<FinancialSeries>(doc).unwrap_err();
    assert!(err.to_string().contains("sales"), "{err}");
}

#[test]
fn test_empty_series_rejected() {
    match FinancialSeriesInput::fiscal_years(2023, 0).build() {
        Err(MoatscopeError::InvalidInput { field, .. }) => assert_eq!(field, "periods"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

// ===========================================================================
// Comparison
// ===========================================================================

#[test]
fn test_compare_matches_individual_runs() {
    let cfg = AnalysisConfig::default();
    let short = FinancialSeriesInput::fiscal_years(2021, 3)
        .with(LineItem::Sales, &[dec!(100), dec!(110), dec!(120)])
        .with(LineItem::Receivables, &[dec!(50), dec!(65), dec!(80)])
        .build()
        .unwrap();

    let mut companies = BTreeMap::new();
    companies.insert("compounder".to_string(), compounder());
    companies.insert("short".to_string(), short.clone());
    let out = compare(&companies, &cfg).unwrap();

    assert_eq!(out.result.len(), 2);
    assert_eq!(out.result["short"], analyze(&short, &cfg).unwrap().result);
    assert!(out.warnings.iter().all(|w| w.starts_with("short: ")));
    let flags = out.result["short"].red_flags.computed().unwrap();
    assert_eq!(flags.high_severity_count, 1);
}
