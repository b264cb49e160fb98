use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TenorError;
use crate::TenorResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Snap threshold for rolling CAGR values: magnitudes below this are
/// clamped to exactly zero.
pub const FLOATING_TOLERANCE: f64 = 1e-12;

/// Default rolling window lengths in years.
pub const DEFAULT_WINDOWS: [usize; 5] = [5, 10, 15, 20, 30];

/// Default spread thresholds for the convergence horizon search.
pub const DEFAULT_THRESHOLDS: [f64; 4] = [0.0025, 0.005, 0.0075, 0.01];

/// One annual return observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualReturn {
    pub year: i32,
    #[serde(rename = "return")]
    pub value: f64,
}

/// One annual risk-free rate observation, parallel to [`AnnualReturn`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFreeRate {
    pub year: i32,
    pub rate: f64,
}

/// Year-indexed annual return history, chronologically sorted.
///
/// Construction sorts the observations by year and rejects duplicates, so
/// every engine operation can assume strictly increasing years. Operations
/// referencing a `start_year` that is absent from the series return empty
/// results rather than errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<AnnualReturn>", into = "Vec<AnnualReturn>")]
pub struct ReturnSeries {
    years: Vec<i32>,
    returns: Vec<f64>,
}

impl ReturnSeries {
    pub fn new(mut observations: Vec<AnnualReturn>) -> TenorResult<Self> {
        observations.sort_by_key(|o| o.year);
        if observations.windows(2).any(|w| w[0].year == w[1].year) {
            return Err(TenorError::InvalidInput {
                field: "observations".into(),
                reason: "Return series must not contain duplicate years".into(),
            });
        }
        Ok(Self {
            years: observations.iter().map(|o| o.year).collect(),
            returns: observations.iter().map(|o| o.value).collect(),
        })
    }

    /// Convenience constructor for `(year, return)` pairs.
    pub fn from_pairs(pairs: &[(i32, f64)]) -> TenorResult<Self> {
        Self::new(
            pairs
                .iter()
                .map(|&(year, value)| AnnualReturn { year, value })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Position of `year` in the series, if present.
    pub fn index_of_year(&self, year: i32) -> Option<usize> {
        self.years.binary_search(&year).ok()
    }
}

impl TryFrom<Vec<AnnualReturn>> for ReturnSeries {
    type Error = TenorError;

    fn try_from(observations: Vec<AnnualReturn>) -> TenorResult<Self> {
        Self::new(observations)
    }
}

impl From<ReturnSeries> for Vec<AnnualReturn> {
    fn from(series: ReturnSeries) -> Self {
        series
            .years
            .iter()
            .zip(series.returns.iter())
            .map(|(&year, &value)| AnnualReturn { year, value })
            .collect()
    }
}

/// Cash flow classification for performance calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    Contribution,
    Withdrawal,
    Dividend,
    Fee,
}

/// A dated external cash flow. Amounts are signed and enter the return
/// formulas as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: Money,
    pub flow_type: FlowType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Portfolio valuation at a specific date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub date: NaiveDate,
    pub market_value: Money,
    #[serde(default)]
    pub accrued_income: Money,
    #[serde(default)]
    pub cash_balance: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    precision: &str,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: precision.to_string(),
        },
    }
}
