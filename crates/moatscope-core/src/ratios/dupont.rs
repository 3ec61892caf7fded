//! Three-way DuPont decomposition for the latest period.
//!
//! ROE = Net Margin x Asset Turnover x Equity Multiplier, with the equity
//! multiplier taken on average equity so the product reconciles to the ROE
//! in the ratio snapshot.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::ratios::snapshot::{asset_turnover, average_equity, net_margin, roe};
use crate::series::math::ratio;
use crate::series::{FinancialSeries, LineItem};
use crate::types::{Multiple, Percent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginProfile {
    Strong,
    Good,
    Thin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverProfile {
    Excellent,
    Decent,
    CapitalIntensive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DupontBreakdown {
    pub net_margin: Option<Percent>,
    pub asset_turnover: Option<Multiple>,
    pub equity_multiplier: Option<Multiple>,
    pub roe: Option<Percent>,
    /// Product of the three drivers; equals `roe` when all are present.
    pub roe_check: Option<Percent>,
    pub margin_profile: Option<MarginProfile>,
    pub turnover_profile: Option<TurnoverProfile>,
}

fn margin_profile(margin: Decimal) -> MarginProfile {
    if margin > dec!(15) {
        MarginProfile::Strong
    } else if margin > dec!(10) {
        MarginProfile::Good
    } else {
        MarginProfile::Thin
    }
}

fn turnover_profile(turnover: Decimal) -> TurnoverProfile {
    if turnover > dec!(2) {
        TurnoverProfile::Excellent
    } else if turnover > Decimal::ONE {
        TurnoverProfile::Decent
    } else {
        TurnoverProfile::CapitalIntensive
    }
}

/// Decompose the latest-period ROE.
pub fn calculate_dupont(fs: &FinancialSeries) -> DupontBreakdown {
    let last = fs.last_index();
    let net_margin = net_margin(fs, last);
    let asset_turnover = asset_turnover(fs, last);
    let equity_multiplier = ratio(
        fs.value(LineItem::TotalAssets, last),
        average_equity(fs, last).filter(|e| *e > Decimal::ZERO),
    );

    let roe_check = match (net_margin, asset_turnover, equity_multiplier) {
        (Some(m), Some(t), Some(e)) => m.checked_mul(t).and_then(|mt| mt.checked_mul(e)),
        _ => None,
    };

    DupontBreakdown {
        net_margin,
        asset_turnover,
        equity_multiplier,
        roe: roe(fs, last),
        roe_check,
        margin_profile: net_margin.map(margin_profile),
        turnover_profile: asset_turnover.map(turnover_profile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::FinancialSeriesInput;

    #[test]
    fn test_dupont_reconciles_to_roe() {
        let fs = FinancialSeriesInput::fiscal_years(2022, 2)
            .with(LineItem::Sales, &[dec!(800), dec!(1000)])
            .with(LineItem::NetProfit, &[dec!(60), dec!(80)])
            .with(LineItem::TotalAssets, &[dec!(450), dec!(500)])
            .with(LineItem::Equity, &[dec!(200), dec!(200)])
            .with(LineItem::Reserves, &[dec!(100), dec!(300)])
            .build()
            .unwrap();
        let d = calculate_dupont(&fs);
        // margin 8%, turnover 2x, multiplier 500/400 = 1.25 → ROE 20%
        assert_eq!(d.net_margin, Some(dec!(8)));
        assert_eq!(d.asset_turnover, Some(dec!(2)));
        assert_eq!(d.equity_multiplier, Some(dec!(1.25)));
        assert_eq!(d.roe, Some(dec!(20)));
        assert_eq!(d.roe_check, Some(dec!(20)));
        assert_eq!(d.margin_profile, Some(MarginProfile::Thin));
        assert_eq!(d.turnover_profile, Some(TurnoverProfile::Decent));
    }

    #[test]
    fn test_missing_assets_leaves_partial_breakdown() {
        let fs = FinancialSeriesInput::fiscal_years(2023, 1)
            .with(LineItem::Sales, &[dec!(100)])
            .with(LineItem::NetProfit, &[dec!(20)])
            .build()
            .unwrap();
        let d = calculate_dupont(&fs);
        assert_eq!(d.net_margin, Some(dec!(20)));
        assert_eq!(d.margin_profile, Some(MarginProfile::Strong));
        assert_eq!(d.asset_turnover, None);
        assert_eq!(d.roe_check, None);
    }
}
