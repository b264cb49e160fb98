use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use tenor_core::gips::{
    analyze_portfolio, calculate_composite_return, calculate_modified_dietz_return,
    calculate_money_weighted_return, calculate_time_weighted_return, generate_gips_report,
    CompositeMethod, PortfolioReturn,
};
use tenor_core::types::{CashFlow, PortfolioValuation};

use crate::input;

/// Valuation history plus cash flows, the shared input shape for
/// TWR / MWR / GIPS analysis.
#[derive(Debug, Deserialize)]
pub struct PortfolioHistory {
    pub valuations: Vec<PortfolioValuation>,
    #[serde(default)]
    pub cash_flows: Vec<CashFlow>,
}

fn load_history(input_path: &Option<String>) -> Result<PortfolioHistory, Box<dyn std::error::Error>> {
    if let Some(ref path) = input_path {
        return Ok(input::file::read_json(path)?);
    }
    if let Some(history) = input::stdin::read_stdin::<PortfolioHistory>()? {
        return Ok(history);
    }
    Err("Provide --input file or pipe JSON via stdin \
         ({\"valuations\": [...], \"cash_flows\": [...]})"
        .into())
}

/// Arguments for time-weighted return
#[derive(Args)]
pub struct TwrArgs {
    /// Path to a JSON file: {"valuations": [...], "cash_flows": [...]}
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for money-weighted return
#[derive(Args)]
pub struct MwrArgs {
    #[arg(long)]
    pub input: Option<String>,

    /// Maximum Newton-Raphson iterations
    #[arg(long, default_value = "100")]
    pub max_iterations: u32,

    /// Convergence tolerance on the NPV residual
    #[arg(long, default_value = "0.000001")]
    pub tolerance: Decimal,
}

/// Arguments for Modified Dietz return
#[derive(Args)]
pub struct DietzArgs {
    /// Path to a JSON file with cash flows: [{"date": ..., "amount": ...}, ...]
    #[arg(long)]
    pub input: Option<String>,

    /// Portfolio value at period start
    #[arg(long)]
    pub start_value: Decimal,

    /// Portfolio value at period end
    #[arg(long)]
    pub end_value: Decimal,

    /// Measurement period start (YYYY-MM-DD)
    #[arg(long)]
    pub period_start: NaiveDate,

    /// Measurement period end (YYYY-MM-DD)
    #[arg(long)]
    pub period_end: NaiveDate,
}

/// Arguments for composite return blending
#[derive(Args)]
pub struct CompositeArgs {
    /// Path to a JSON file: [{"return": 0.10, "weight": 0.5}, ...]
    #[arg(long)]
    pub input: Option<String>,

    /// Weighting method: asset_weighted or equal_weighted
    #[arg(long, default_value = "asset_weighted")]
    pub method: String,
}

/// Arguments for the full GIPS analysis
#[derive(Args)]
pub struct GipsArgs {
    #[arg(long)]
    pub input: Option<String>,

    /// Number of constituent portfolios in the composite
    #[arg(long, default_value = "1")]
    pub portfolios: usize,

    /// Firm name; when given (with --composite-name) a presentation
    /// report is produced instead of the raw result
    #[arg(long, requires = "composite_name")]
    pub firm: Option<String>,

    #[arg(long, requires = "firm")]
    pub composite_name: Option<String>,

    #[arg(long, requires = "benchmark_return")]
    pub benchmark_name: Option<String>,

    #[arg(long, requires = "benchmark_name", allow_hyphen_values = true)]
    pub benchmark_return: Option<Decimal>,
}

pub fn run_twr(args: TwrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let history = load_history(&args.input)?;
    let output = calculate_time_weighted_return(&history.valuations, &history.cash_flows)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_mwr(args: MwrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let history = load_history(&args.input)?;
    let output = calculate_money_weighted_return(
        &history.valuations,
        &history.cash_flows,
        args.max_iterations,
        args.tolerance,
    )?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_dietz(args: DietzArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cash_flows: Vec<CashFlow> = match args.input {
        Some(ref path) => input::file::read_json(path)?,
        None => input::stdin::read_stdin::<Vec<CashFlow>>()?.unwrap_or_default(),
    };
    let output = calculate_modified_dietz_return(
        args.start_value,
        args.end_value,
        &cash_flows,
        args.period_start,
        args.period_end,
    )?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_composite(args: CompositeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let returns: Vec<PortfolioReturn> = match args.input {
        Some(ref path) => input::file::read_json(path)?,
        None => input::stdin::read_stdin::<Vec<PortfolioReturn>>()?
            .ok_or("Provide --input file or pipe JSON via stdin")?,
    };
    let method: CompositeMethod = args.method.parse()?;
    let output = calculate_composite_return(&returns, method)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_gips(args: GipsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let history = load_history(&args.input)?;
    let output = analyze_portfolio(&history.valuations, &history.cash_flows, args.portfolios)?;

    if let (Some(firm), Some(composite_name)) = (&args.firm, &args.composite_name) {
        let benchmark = args.benchmark_name.as_deref().zip(args.benchmark_return);
        let report = generate_gips_report(&output.result, firm, composite_name, benchmark);
        return Ok(serde_json::to_value(report)?);
    }

    Ok(serde_json::to_value(output)?)
}
