use clap::Args;
use serde_json::Value;

use tenor_core::attribution::{brinson_attribution, SectorExposure};

use crate::input;

/// Arguments for Brinson-Hood-Beebower attribution
#[derive(Args)]
pub struct BrinsonArgs {
    /// Path to a JSON file with sector exposures:
    /// [{"sector": ..., "portfolio_weight": ..., "portfolio_return": ...,
    ///   "benchmark_weight": ..., "benchmark_return": ...}, ...]
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_brinson(args: BrinsonArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sectors: Vec<SectorExposure> = match args.input {
        Some(ref path) => input::file::read_json(path)?,
        None => input::stdin::read_stdin::<Vec<SectorExposure>>()?
            .ok_or("Provide --input file or pipe JSON via stdin")?,
    };
    let output = brinson_attribution(&sectors)?;
    Ok(serde_json::to_value(output)?)
}
