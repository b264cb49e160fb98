use clap::Args;
use serde_json::{json, Value};

use tenor_core::rolling::{
    compute_all_rolling_cagrs, compute_rolling_cagr, compute_window_statistics,
    find_min_no_loss_horizon, find_min_spread_horizon,
};
use tenor_core::types::{AnnualReturn, ReturnSeries};

use crate::input;

/// Arguments for rolling CAGR computation
#[derive(Args)]
pub struct RollingCagrArgs {
    /// Path to a JSON file with annual returns: [{"year": 1990, "return": 0.08}, ...]
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated years, parallel to --returns (e.g. "2000,2001,2002")
    #[arg(long, value_delimiter = ',')]
    pub years: Option<Vec<i32>>,

    /// Comma-separated annual returns as decimals (e.g. "0.10,0.20,-0.10")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<f64>>,

    /// Window length in years; omit to compute every default window length
    #[arg(long)]
    pub window: Option<usize>,

    /// First year of the analysis
    #[arg(long)]
    pub start_year: i32,
}

/// Arguments for per-window-length summary statistics
#[derive(Args)]
pub struct WindowSummaryArgs {
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long, value_delimiter = ',')]
    pub years: Option<Vec<i32>>,

    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<f64>>,

    #[arg(long)]
    pub start_year: i32,
}

/// Arguments for the no-loss horizon search
#[derive(Args)]
pub struct NoLossArgs {
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long, value_delimiter = ',')]
    pub years: Option<Vec<i32>>,

    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<f64>>,

    #[arg(long)]
    pub start_year: i32,
}

/// Arguments for the spread (convergence) horizon search
#[derive(Args)]
pub struct SpreadArgs {
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long, value_delimiter = ',')]
    pub years: Option<Vec<i32>>,

    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<f64>>,

    #[arg(long)]
    pub start_year: i32,

    /// Maximum allowed best-worst CAGR spread
    #[arg(long, default_value = "0.01", allow_hyphen_values = true)]
    pub threshold: f64,
}

/// Assemble a return series from a file, parallel CLI lists, or piped JSON.
pub fn load_series(
    input_path: &Option<String>,
    years: &Option<Vec<i32>>,
    returns: &Option<Vec<f64>>,
) -> Result<ReturnSeries, Box<dyn std::error::Error>> {
    if let Some(ref path) = input_path {
        let observations: Vec<AnnualReturn> = input::file::read_json(path)?;
        return Ok(ReturnSeries::new(observations)?);
    }

    if let (Some(years), Some(returns)) = (years, returns) {
        if years.len() != returns.len() {
            return Err(format!(
                "--years has {} entries but --returns has {}",
                years.len(),
                returns.len()
            )
            .into());
        }
        let pairs: Vec<(i32, f64)> = years.iter().copied().zip(returns.iter().copied()).collect();
        return Ok(ReturnSeries::from_pairs(&pairs)?);
    }

    if let Some(observations) = input::stdin::read_stdin::<Vec<AnnualReturn>>()? {
        return Ok(ReturnSeries::new(observations)?);
    }

    Err("Provide --input file, --years with --returns, or pipe JSON via stdin".into())
}

pub fn run_rolling_cagr(args: RollingCagrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series = load_series(&args.input, &args.years, &args.returns)?;

    let value = match args.window {
        Some(window) => {
            let windows = compute_rolling_cagr(&series, window, args.start_year);
            json!({
                "window_size": window,
                "start_year": args.start_year,
                "count": windows.len(),
                "windows": windows,
            })
        }
        None => {
            let all = compute_all_rolling_cagrs(&series, args.start_year);
            json!({
                "start_year": args.start_year,
                "by_window_size": all,
            })
        }
    };
    Ok(value)
}

pub fn run_window_summary(args: WindowSummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series = load_series(&args.input, &args.years, &args.returns)?;
    let stats = compute_window_statistics(&series, args.start_year);
    Ok(serde_json::to_value(stats)?)
}

pub fn run_no_loss(args: NoLossArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series = load_series(&args.input, &args.years, &args.returns)?;
    Ok(find_min_no_loss_horizon(&series, args.start_year).to_record())
}

pub fn run_spread(args: SpreadArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series = load_series(&args.input, &args.years, &args.returns)?;
    Ok(find_min_spread_horizon(&series, args.start_year, args.threshold).to_record())
}
