pub mod analysis;
pub mod components;

use clap::{Args, ValueEnum};
use moatscope_core::config::WaccMethod;
use moatscope_core::{AnalysisConfig, FinancialSeries};
use rust_decimal::Decimal;

use crate::input;

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Where a single company's series comes from.
#[derive(Args)]
pub struct SeriesArgs {
    /// FinancialSeries JSON file (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WaccMethodArg {
    Capm,
    Fixed,
}

/// Analysis assumptions: an optional config file, then individual overrides.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Analysis config file (.json, .yaml or .yml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Hurdle-rate method for the competitive-advantage period
    #[arg(long, global = true)]
    pub wacc_method: Option<WaccMethodArg>,

    /// Hurdle rate in percent when --wacc-method fixed
    #[arg(long, global = true)]
    pub fixed_wacc: Option<Decimal>,

    /// Creditor days assumed in the cash-conversion cycle
    #[arg(long, global = true)]
    pub payable_days: Option<Decimal>,

    /// Tax rate (fraction) used when the reported rate is unusable
    #[arg(long, global = true)]
    pub default_tax_rate: Option<Decimal>,

    /// Trailing periods used for margin volatility
    #[arg(long, global = true)]
    pub margin_window: Option<usize>,

    /// Divisor applied to shares x price to match the statements' unit
    #[arg(long, global = true)]
    pub market_cap_divisor: Option<Decimal>,
}

impl ConfigArgs {
    /// Defaults, then the config file, then flags. Validated before use.
    pub fn resolve(&self) -> CliResult<AnalysisConfig> {
        let mut config = match self.config {
            Some(ref path) => input::file::read_config(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(method) = self.wacc_method {
            config.wacc.method = match method {
                WaccMethodArg::Capm => WaccMethod::Capm,
                WaccMethodArg::Fixed => WaccMethod::Fixed,
            };
        }
        if let Some(rate) = self.fixed_wacc {
            config.wacc.fixed_rate = rate;
        }
        if let Some(days) = self.payable_days {
            config.assumed_payable_days = days;
        }
        if let Some(rate) = self.default_tax_rate {
            config.default_tax_rate = rate;
        }
        if let Some(window) = self.margin_window {
            config.margin_volatility_window = window;
        }
        if let Some(divisor) = self.market_cap_divisor {
            config.market_cap_divisor = divisor;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Load one company's series from --input or stdin.
pub fn load_series(args: &SeriesArgs) -> CliResult<FinancialSeries> {
    if let Some(ref path) = args.input {
        input::file::read_json(path)
    } else if let Some(series) = input::stdin::read_stdin()? {
        Ok(series)
    } else {
        Err("--input <file.json> or stdin required".into())
    }
}
