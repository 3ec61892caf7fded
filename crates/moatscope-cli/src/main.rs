mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analysis::{AnalyzeArgs, CompareArgs};
use commands::components::ComponentArgs;
use commands::ConfigArgs;

/// Multi-year fundamental analysis of company financial statements
#[derive(Parser)]
#[command(
    name = "moatscope",
    version,
    about = "Multi-year fundamental analysis of company financial statements",
    long_about = "Scores business quality, economic moat and capital allocation from \
                  a multi-year financial series, and screens for accounting red flags. \
                  All arithmetic is decimal; results are JSON unless --output says otherwise."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every component and print the full report
    Analyze(AnalyzeArgs),
    /// Analyse several companies side by side
    Compare(CompareArgs),
    /// Latest-period ratio snapshot and DuPont breakdown
    Ratios(ComponentArgs),
    /// Business quality score (0-100)
    Quality(ComponentArgs),
    /// Accounting red-flag screen
    RedFlags(ComponentArgs),
    /// Economic moat score and competitive-advantage period
    Moat(ComponentArgs),
    /// Capital allocation grade
    CapitalAllocation(ComponentArgs),
    /// Earning-power trajectory across rolling windows
    Trajectory(ComponentArgs),
    /// Retained-earnings value creation test
    ValueTest(ComponentArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    let config = &cli.config;
    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::analysis::run_analyze(args, config),
        Commands::Compare(args) => commands::analysis::run_compare(args, config),
        Commands::Ratios(args) => commands::components::run_ratios(args, config),
        Commands::Quality(args) => commands::components::run_quality(args, config),
        Commands::RedFlags(args) => commands::components::run_red_flags(args, config),
        Commands::Moat(args) => commands::components::run_moat(args, config),
        Commands::CapitalAllocation(args) => {
            commands::components::run_capital_allocation(args, config)
        }
        Commands::Trajectory(args) => commands::components::run_trajectory(args, config),
        Commands::ValueTest(args) => commands::components::run_value_test(args, config),
        Commands::Version => {
            println!("moatscope {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
