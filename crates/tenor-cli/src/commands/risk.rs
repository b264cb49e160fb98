use clap::Args;
use serde_json::{json, Value};

use tenor_core::risk::{
    historical_risk_free_rates, rolling_risk_metrics, RiskMetricsCalculator,
};

use crate::input;

/// Arguments for the full risk-metric bundle
#[derive(Args)]
pub struct RiskMetricsArgs {
    /// Path to a JSON file with a plain array of returns
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated annual returns as decimals
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<f64>>,

    /// Comma-separated risk-free rates, parallel to the returns
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub risk_free_rates: Option<Vec<f64>>,

    /// Derive era-based risk-free rates for this start year instead
    #[arg(long, requires = "rates_end_year")]
    pub rates_start_year: Option<i32>,

    #[arg(long, requires = "rates_start_year")]
    pub rates_end_year: Option<i32>,
}

/// Arguments for rolling risk metrics
#[derive(Args)]
pub struct RollingRiskArgs {
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<f64>>,

    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub risk_free_rates: Option<Vec<f64>>,

    /// Rolling window size in years
    #[arg(long)]
    pub window: usize,
}

fn load_returns(
    input_path: &Option<String>,
    cli_returns: &Option<Vec<f64>>,
) -> Result<Vec<f64>, Box<dyn std::error::Error>> {
    if let Some(ref path) = input_path {
        return Ok(input::file::read_json(path)?);
    }
    if let Some(ref returns) = cli_returns {
        return Ok(returns.clone());
    }
    if let Some(returns) = input::stdin::read_stdin::<Vec<f64>>()? {
        return Ok(returns);
    }
    Err("Provide --returns or --input file or pipe JSON via stdin".into())
}

fn resolve_rates(args: &RiskMetricsArgs) -> Option<Vec<f64>> {
    if args.risk_free_rates.is_some() {
        return args.risk_free_rates.clone();
    }
    match (args.rates_start_year, args.rates_end_year) {
        (Some(start), Some(end)) => Some(
            historical_risk_free_rates(start, end)
                .iter()
                .map(|r| r.rate)
                .collect(),
        ),
        _ => None,
    }
}

pub fn run_risk_metrics(args: RiskMetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let returns = load_returns(&args.input, &args.returns)?;
    let rates = resolve_rates(&args);

    let calculator = RiskMetricsCalculator::new(returns, rates)?;
    let bundle = calculator.all_metrics();
    let drawdown = calculator.maximum_drawdown();

    Ok(json!({
        "metrics": bundle,
        "drawdown": drawdown,
        "observations": calculator.returns().len(),
    }))
}

pub fn run_rolling_risk(args: RollingRiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let returns = load_returns(&args.input, &args.returns)?;
    let results = rolling_risk_metrics(&returns, args.window, args.risk_free_rates.as_deref())?;
    Ok(serde_json::to_value(results)?)
}
