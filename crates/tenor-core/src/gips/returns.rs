use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::time::Instant;

use crate::error::TenorError;
use crate::types::{with_metadata, CashFlow, ComputationOutput, Money, PortfolioValuation, Rate};
use crate::TenorResult;

const DAYS_PER_YEAR: Decimal = dec!(365.25);

/// A Modified Dietz denominator at or below this divides by noise.
const NEAR_ZERO: Decimal = dec!(0.000001);

/// Asset-weighted composites must have weights summing to 1 within this.
const WEIGHT_TOLERANCE: Decimal = dec!(0.01);

/// Time-weighted return and the chain-linked sub-periods behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwrOutput {
    pub time_weighted_return: Rate,
    pub sub_period_returns: Vec<Rate>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// Time-weighted return over a valuation history.
///
/// Valuations are sorted by date and must be pairwise distinct. Each
/// consecutive pair frames a sub-period; cash flows dated strictly after
/// the opening valuation and on or before the closing one belong to it.
/// A non-positive opening value forces that sub-period's return to zero
/// and records a warning instead of failing the whole calculation.
pub fn calculate_time_weighted_return(
    valuations: &[PortfolioValuation],
    cash_flows: &[CashFlow],
) -> TenorResult<ComputationOutput<TwrOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if valuations.len() < 2 {
        return Err(TenorError::InsufficientData(
            "At least two valuations required for TWR calculation".into(),
        ));
    }

    let mut valuations = valuations.to_vec();
    valuations.sort_by_key(|v| v.date);
    if valuations.windows(2).any(|w| w[0].date == w[1].date) {
        return Err(TenorError::InvalidInput {
            field: "valuations".into(),
            reason: "Valuation dates must be distinct".into(),
        });
    }

    let mut cash_flows = cash_flows.to_vec();
    cash_flows.sort_by_key(|cf| cf.date);

    let mut sub_period_returns = Vec::with_capacity(valuations.len() - 1);
    for pair in valuations.windows(2) {
        let (start_val, end_val) = (&pair[0], &pair[1]);

        let net_cash_flow: Money = cash_flows
            .iter()
            .filter(|cf| cf.date > start_val.date && cf.date <= end_val.date)
            .map(|cf| cf.amount)
            .sum();

        let sub_return = if start_val.market_value <= Decimal::ZERO {
            warnings.push(format!(
                "Zero or negative starting value on {}",
                start_val.date
            ));
            Decimal::ZERO
        } else {
            (end_val.market_value - start_val.market_value - net_cash_flow)
                / start_val.market_value
        };
        sub_period_returns.push(sub_return);
    }

    let mut total_growth = Decimal::ONE;
    for sub_return in &sub_period_returns {
        total_growth *= Decimal::ONE + sub_return;
    }

    let output = TwrOutput {
        time_weighted_return: total_growth - Decimal::ONE,
        sub_period_returns,
        period_start: valuations[0].date,
        period_end: valuations[valuations.len() - 1].date,
    };

    Ok(with_metadata(
        "Time-weighted return, chain-linked over valuation sub-periods",
        &json!({
            "valuation_count": valuations.len(),
            "cash_flow_count": cash_flows.len(),
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        "decimal",
        output,
    ))
}

/// Money-weighted return (IRR) solution details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MwrOutput {
    pub money_weighted_return: Rate,
    pub iterations: u32,
    pub converged: bool,
}

/// Money-weighted return via Newton-Raphson on the signed cash-flow
/// timeline: the opening value as an outflow at day zero, interior flows at
/// their day offsets, the closing value as an inflow at the full span.
///
/// Never fails on non-convergence: an unstable derivative or iteration
/// exhaustion records a warning and the last rate stands, so batch analyses
/// always get a figure alongside its caveat.
pub fn calculate_money_weighted_return(
    valuations: &[PortfolioValuation],
    cash_flows: &[CashFlow],
    max_iterations: u32,
    tolerance: Decimal,
) -> TenorResult<ComputationOutput<MwrOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if valuations.len() < 2 {
        return Err(TenorError::InsufficientData(
            "At least two valuations required for MWR calculation".into(),
        ));
    }

    let start_val = valuations
        .iter()
        .min_by_key(|v| v.date)
        .ok_or_else(|| TenorError::InsufficientData("Empty valuation list".into()))?;
    let end_val = valuations
        .iter()
        .max_by_key(|v| v.date)
        .ok_or_else(|| TenorError::InsufficientData("Empty valuation list".into()))?;

    let mut timeline: Vec<(Money, i64)> = Vec::with_capacity(cash_flows.len() + 2);
    timeline.push((-start_val.market_value, 0));
    for cf in cash_flows {
        timeline.push((cf.amount, (cf.date - start_val.date).num_days()));
    }
    timeline.push((end_val.market_value, (end_val.date - start_val.date).num_days()));

    let mut rate: Rate = dec!(0.1);
    let mut iterations = max_iterations;
    let mut converged = false;

    for i in 0..max_iterations {
        let mut npv = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;
        let one_plus_r = Decimal::ONE + rate;

        for (amount, days) in &timeline {
            let years = Decimal::from(*days) / DAYS_PER_YEAR;
            let discount = one_plus_r.powd(years);
            if discount.is_zero() {
                continue;
            }
            npv += amount / discount;
            dnpv -= years * amount / (one_plus_r * discount);
        }

        if npv.abs() < tolerance {
            iterations = i;
            converged = true;
            break;
        }

        if dnpv.abs() < tolerance {
            warnings.push("IRR calculation may be unstable".into());
            iterations = i;
            break;
        }

        rate -= npv / dnpv;

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(100.0) {
            rate = dec!(100.0);
        }
    }

    if !converged && iterations == max_iterations {
        warnings.push(format!(
            "IRR calculation did not converge after {max_iterations} iterations"
        ));
    }

    let output = MwrOutput {
        money_weighted_return: rate,
        iterations,
        converged,
    };

    Ok(with_metadata(
        "Money-weighted return, Newton-Raphson IRR with actual/365.25 day count",
        &json!({
            "max_iterations": max_iterations,
            "tolerance": tolerance,
            "initial_guess": 0.1,
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        "decimal",
        output,
    ))
}

/// Modified Dietz return and its flow weighting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietzOutput {
    pub modified_dietz_return: Rate,
    pub net_cash_flow: Money,
    pub weighted_cash_flow: Money,
    pub total_days: i64,
}

/// Modified Dietz approximation of the time-weighted return.
///
/// Each flow inside `[period_start, period_end]` is weighted by the share
/// of the period remaining after it. A denominator at or near zero yields
/// a zero return plus a warning; an inverted period is a fatal input error.
pub fn calculate_modified_dietz_return(
    start_value: Money,
    end_value: Money,
    cash_flows: &[CashFlow],
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> TenorResult<ComputationOutput<DietzOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let total_days = (period_end - period_start).num_days();
    if total_days <= 0 {
        return Err(TenorError::DateError(
            "Period end must be after period start".into(),
        ));
    }

    let mut weighted_cash_flow = Decimal::ZERO;
    let mut net_cash_flow = Decimal::ZERO;
    for cf in cash_flows {
        if cf.date >= period_start && cf.date <= period_end {
            let days_remaining = (period_end - cf.date).num_days();
            let weight = Decimal::from(days_remaining) / Decimal::from(total_days);
            weighted_cash_flow += cf.amount * weight;
            net_cash_flow += cf.amount;
        }
    }

    let denominator = start_value + weighted_cash_flow;
    let modified_dietz_return = if denominator <= NEAR_ZERO {
        warnings.push("Denominator close to zero in Modified Dietz calculation".into());
        Decimal::ZERO
    } else {
        (end_value - start_value - net_cash_flow) / denominator
    };

    let output = DietzOutput {
        modified_dietz_return,
        net_cash_flow,
        weighted_cash_flow,
        total_days,
    };

    Ok(with_metadata(
        "Modified Dietz return with day-weighted cash flows",
        &json!({
            "period_start": period_start,
            "period_end": period_end,
            "total_days": total_days,
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        "decimal",
        output,
    ))
}

/// Composite blending method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeMethod {
    AssetWeighted,
    EqualWeighted,
}

impl FromStr for CompositeMethod {
    type Err = TenorError;

    fn from_str(s: &str) -> TenorResult<Self> {
        match s {
            "asset_weighted" => Ok(CompositeMethod::AssetWeighted),
            "equal_weighted" => Ok(CompositeMethod::EqualWeighted),
            other => Err(TenorError::InvalidInput {
                field: "method".into(),
                reason: format!("Unknown composite method: {other}"),
            }),
        }
    }
}

/// One constituent portfolio's period return and composite weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PortfolioReturn {
    #[serde(rename = "return")]
    pub value: Rate,
    pub weight: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeOutput {
    pub composite_return: Rate,
    pub method: CompositeMethod,
    pub portfolio_count: usize,
}

/// Blend constituent portfolio returns into a composite return.
///
/// Asset weighting requires the weights to sum to 1 within
/// [`WEIGHT_TOLERANCE`]; equal weighting ignores the weights entirely.
pub fn calculate_composite_return(
    portfolio_returns: &[PortfolioReturn],
    method: CompositeMethod,
) -> TenorResult<ComputationOutput<CompositeOutput>> {
    let start = Instant::now();

    if portfolio_returns.is_empty() {
        return Err(TenorError::InsufficientData(
            "At least one portfolio return required for composite calculation".into(),
        ));
    }

    let composite_return = match method {
        CompositeMethod::AssetWeighted => {
            let total_weight: Decimal = portfolio_returns.iter().map(|p| p.weight).sum();
            if (total_weight - Decimal::ONE).abs() > WEIGHT_TOLERANCE {
                return Err(TenorError::InvalidInput {
                    field: "portfolio_returns".into(),
                    reason: format!("Weights must sum to 1.0, got {total_weight}"),
                });
            }
            portfolio_returns
                .iter()
                .map(|p| p.value * p.weight)
                .sum::<Decimal>()
                / total_weight
        }
        CompositeMethod::EqualWeighted => {
            portfolio_returns.iter().map(|p| p.value).sum::<Decimal>()
                / Decimal::from(portfolio_returns.len() as i64)
        }
    };

    let output = CompositeOutput {
        composite_return,
        method,
        portfolio_count: portfolio_returns.len(),
    };

    Ok(with_metadata(
        "Composite return blending across constituent portfolios",
        &json!({ "method": method }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        "decimal",
        output,
    ))
}
