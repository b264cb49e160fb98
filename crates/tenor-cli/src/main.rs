mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::attribution::BrinsonArgs;
use commands::gips::{CompositeArgs, DietzArgs, GipsArgs, MwrArgs, TwrArgs};
use commands::risk::{RiskMetricsArgs, RollingRiskArgs};
use commands::rolling::{NoLossArgs, RollingCagrArgs, SpreadArgs, WindowSummaryArgs};

/// Long-horizon performance analytics with audit-grade return calculations
#[derive(Parser)]
#[command(
    name = "tenor",
    version,
    about = "Long-horizon performance analytics and GIPS return calculations",
    long_about = "Rolling-window CAGR analysis, holding-horizon searches, risk metrics \
                  (Sharpe, Sortino, Calmar, drawdown, VaR/CVaR) and GIPS-style return \
                  calculations (TWR, MWR, Modified Dietz, composites) with decimal \
                  precision where money is involved."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Rolling CAGRs for one window length across a return series
    RollingCagr(RollingCagrArgs),
    /// Best/worst/average CAGR summary per default window length
    WindowSummary(WindowSummaryArgs),
    /// Minimum holding period with no losing window
    NoLossHorizon(NoLossArgs),
    /// Minimum holding period with best-worst CAGR spread within threshold
    SpreadHorizon(SpreadArgs),
    /// Sharpe, Sortino, Calmar, drawdown, volatility, VaR/CVaR
    RiskMetrics(RiskMetricsArgs),
    /// Full risk-metric bundle at every rolling window position
    RollingRisk(RollingRiskArgs),
    /// Time-weighted return from valuations and cash flows
    Twr(TwrArgs),
    /// Money-weighted return (IRR) from valuations and cash flows
    Mwr(MwrArgs),
    /// Modified Dietz return for one measurement period
    Dietz(DietzArgs),
    /// Blend constituent portfolio returns into a composite
    Composite(CompositeArgs),
    /// Full GIPS analysis: TWR + MWR + compliance classification
    Gips(GipsArgs),
    /// Brinson-Hood-Beebower sector attribution
    Brinson(BrinsonArgs),
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

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::RollingCagr(args) => commands::rolling::run_rolling_cagr(args),
        Commands::WindowSummary(args) => commands::rolling::run_window_summary(args),
        Commands::NoLossHorizon(args) => commands::rolling::run_no_loss(args),
        Commands::SpreadHorizon(args) => commands::rolling::run_spread(args),
        Commands::RiskMetrics(args) => commands::risk::run_risk_metrics(args),
        Commands::RollingRisk(args) => commands::risk::run_rolling_risk(args),
        Commands::Twr(args) => commands::gips::run_twr(args),
        Commands::Mwr(args) => commands::gips::run_mwr(args),
        Commands::Dietz(args) => commands::gips::run_dietz(args),
        Commands::Composite(args) => commands::gips::run_composite(args),
        Commands::Gips(args) => commands::gips::run_gips(args),
        Commands::Brinson(args) => commands::attribution::run_brinson(args),
        Commands::Version => {
            println!("tenor {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
