use moatscope_core::config::{WaccConfig, WaccMethod};
use moatscope_core::scoring::{
    calculate_capital_allocation, calculate_moat_score, calculate_quality_score,
    competitive_advantage_period,
};
use moatscope_core::series::math::{bucket_score, cagr, ratio, stddev};
use moatscope_core::{AnalysisConfig, FinancialSeriesInput, LineItem, Outcome};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Series math known answers
// ===========================================================================

#[test]
fn test_known_answers() {
    let s: Vec<Option<Decimal>> = [
        dec!(100),
        dec!(110),
        dec!(121),
        dec!(133.1),
        dec!(146.41),
        dec!(161.051),
    ]
    .into_iter()
    .map(Some)
    .collect();
    let g = cagr(&s, 5).unwrap();
    assert!((g - dec!(10)).abs() < dec!(0.0001), "got {g}");

    assert_eq!(ratio(Some(dec!(42)), Some(Decimal::ZERO)), None);
    assert_eq!(stddev(&[Some(dec!(5))]), None);
    assert_eq!(bucket_score(None, &[(dec!(1), 5)]), 0);
}

// ===========================================================================
// Quality
// ===========================================================================

#[test]
fn test_quality_bounds_across_degenerate_inputs() {
    let cfg = AnalysisConfig::default();
    let cases = vec![
        FinancialSeriesInput::fiscal_years(2015, 10).build().unwrap(),
        FinancialSeriesInput::fiscal_years(2023, 1)
            .with(LineItem::Sales, &[dec!(0)])
            .with(LineItem::NetProfit, &[dec!(-50)])
            .build()
            .unwrap(),
        FinancialSeriesInput::fiscal_years(2019, 5)
            .with(LineItem::Sales, &[dec!(100), dec!(-10), dec!(0), dec!(50), dec!(80)])
            .with(LineItem::NetProfit, &[dec!(-5), dec!(10), dec!(-20), dec!(5), dec!(8)])
            .with(LineItem::Equity, &[dec!(-10), dec!(0), dec!(10), dec!(20), dec!(0)])
            .with(LineItem::Borrowings, &[dec!(100); 5])
            .build()
            .unwrap(),
    ];
    for fs in &cases {
        let q = calculate_quality_score(fs, &cfg);
        assert!(q.breakdown.total <= 100);
        assert_eq!(q.breakdown.max_total, 100);
        assert_eq!(
            q.breakdown.total,
            q.breakdown.dimensions.iter().map(|d| d.points).sum::<u32>()
        );
        assert!(q.breakdown.dimensions.iter().all(|d| d.points <= d.max_points));
    }
    assert_eq!(calculate_quality_score(&cases[0], &cfg).breakdown.total, 0);
}

// ===========================================================================
// Moat
// ===========================================================================

#[test]
fn test_cap_boundary_at_wacc() {
    let roic: Vec<Option<Decimal>> = [dec!(8), dec!(10), dec!(14), dec!(16), dec!(20), dec!(22), dec!(25)]
        .into_iter()
        .map(Some)
        .collect();
    assert_eq!(competitive_advantage_period(&roic, dec!(13)), 5);

    let at_hurdle: Vec<Option<Decimal>> = vec![Some(dec!(13)); 7];
    assert_eq!(competitive_advantage_period(&at_hurdle, dec!(13)), 0);
}

#[test]
fn test_moat_with_fixed_wacc() {
    // ROIC = NOPAT / equity with no debt or cash: 75/500 = 15%
    let fs = FinancialSeriesInput::fiscal_years(2017, 7)
        .with(LineItem::Equity, &[dec!(500); 7])
        .with(LineItem::Pbt, &[dec!(100); 7])
        .build()
        .unwrap();
    let fixed = |rate: Decimal| AnalysisConfig {
        wacc: WaccConfig {
            method: WaccMethod::Fixed,
            fixed_rate: rate,
            ..WaccConfig::default()
        },
        ..AnalysisConfig::default()
    };

    let below = calculate_moat_score(&fs, &fixed(dec!(14))).computed().cloned().unwrap();
    assert_eq!(below.cap_years, 7);
    assert_eq!(below.breakdown.points("roic_sustainability"), Some(3));
    assert_eq!(below.breakdown.points("roic_stability"), Some(2));

    let at = calculate_moat_score(&fs, &fixed(dec!(15))).computed().cloned().unwrap();
    assert_eq!(at.cap_years, 0);
    assert_eq!(at.breakdown.points("roic_sustainability"), Some(0));
}

#[test]
fn test_moat_classification_bounds() {
    let fs = FinancialSeriesInput::fiscal_years(2019, 5).build().unwrap();
    let m = calculate_moat_score(&fs, &AnalysisConfig::default())
        .computed()
        .cloned()
        .unwrap();
    assert_eq!(m.breakdown.total, 0);
    assert_eq!(m.breakdown.classification, "No Moat");
}

// ===========================================================================
// Capital allocation
// ===========================================================================

#[test]
fn test_low_return_distributor_is_rewarded_for_payouts() {
    // Capital +100 a year, NOPAT +7.5 → incremental ROIC 7.5%; payout 80%.
    let fs = FinancialSeriesInput::fiscal_years(2020, 4)
        .with(LineItem::Equity, &[dec!(1000), dec!(1100), dec!(1200), dec!(1300)])
        .with(LineItem::Pbt, &[dec!(100), dec!(110), dec!(120), dec!(130)])
        .with(LineItem::NetProfit, &[dec!(75), dec!(82.5), dec!(90), dec!(97.5)])
        .with(LineItem::Dividend, &[dec!(60), dec!(66), dec!(72), dec!(78)])
        .build()
        .unwrap();
    let g = calculate_capital_allocation(&fs, &AnalysisConfig::default())
        .computed()
        .cloned()
        .unwrap();
    assert_eq!(g.average_incremental_roic, Some(dec!(7.5)));
    assert_eq!(g.reinvestment_score, 15);
    assert_eq!(g.average_payout, Some(dec!(80)));
    assert_eq!(g.deployment_score, 40);
    assert_eq!(g.breakdown.total, 55);
    assert_eq!(g.grade, "C");
}

#[test]
fn test_gated_components_report_period_counts() {
    let fs = FinancialSeriesInput::fiscal_years(2022, 3).build().unwrap();
    assert_eq!(
        calculate_capital_allocation(&fs, &AnalysisConfig::default()),
        Outcome::InsufficientData {
            required_periods: 4,
            available_periods: 3
        }
    );
}
