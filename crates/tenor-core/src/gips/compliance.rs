use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

use crate::gips::returns::{
    calculate_money_weighted_return, calculate_time_weighted_return,
};
use crate::types::{with_metadata, CashFlow, ComputationOutput, Money, PortfolioValuation, Rate};
use crate::TenorResult;

const DEFAULT_MAX_ITERATIONS: u32 = 100;
const DEFAULT_IRR_TOLERANCE: Decimal = dec!(0.000001);

/// GIPS-recognised return calculation methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCalculationMethod {
    TimeWeighted,
    MoneyWeighted,
    ModifiedDietz,
    TrueTimeWeighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceLevel {
    FullCompliance,
    PartialCompliance,
    NonCompliant,
}

/// Assembled performance result for one composite and period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GipsCalculationResult {
    pub time_weighted_return: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub money_weighted_return: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_return: Option<Rate>,
    pub calculation_method: ReturnCalculationMethod,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub number_of_portfolios: usize,
    pub total_assets: Money,
    pub compliance_level: ComplianceLevel,
    pub validation_notes: Vec<String>,
}

/// Classify a calculation result against the GIPS checklist.
///
/// Pure rule evaluation over the result and the warnings its calculations
/// produced. Only a non-time-weighted method counts as a hard compliance
/// issue; a thin composite (< 5 portfolios) or a short period (< 365 days)
/// merely appends an advisory note. Full compliance requires zero issues
/// and zero calculation warnings; up to two issues is partial.
pub fn validate_gips_compliance(
    result: &GipsCalculationResult,
    calculation_warnings: &[String],
) -> (ComplianceLevel, Vec<String>) {
    let mut validation_notes = Vec::new();
    let mut compliance_issues = 0;

    if !matches!(
        result.calculation_method,
        ReturnCalculationMethod::TimeWeighted | ReturnCalculationMethod::TrueTimeWeighted
    ) {
        validation_notes.push("GIPS requires time-weighted returns for most composites".into());
        compliance_issues += 1;
    }

    if result.number_of_portfolios < 5 {
        validation_notes.push(
            "Composite should include at least 5 portfolios for statistical significance".into(),
        );
    }

    for warning in calculation_warnings {
        validation_notes.push(format!("Calculation warning: {warning}"));
    }

    let period_days = (result.period_end - result.period_start).num_days();
    if period_days < 365 {
        validation_notes.push("GIPS recommends at least one year of performance history".into());
    }

    let level = if compliance_issues == 0 && calculation_warnings.is_empty() {
        ComplianceLevel::FullCompliance
    } else if compliance_issues <= 2 {
        ComplianceLevel::PartialCompliance
    } else {
        ComplianceLevel::NonCompliant
    };

    (level, validation_notes)
}

/// One-shot portfolio analysis: TWR and MWR from the same valuation and
/// flow history, assembled into a classified [`GipsCalculationResult`].
///
/// The result is built once and never mutated afterwards; warnings from
/// both return calculations feed the classification and surface in the
/// output envelope.
pub fn analyze_portfolio(
    valuations: &[PortfolioValuation],
    cash_flows: &[CashFlow],
    number_of_portfolios: usize,
) -> TenorResult<ComputationOutput<GipsCalculationResult>> {
    let start = Instant::now();

    let twr = calculate_time_weighted_return(valuations, cash_flows)?;
    let mwr = calculate_money_weighted_return(
        valuations,
        cash_flows,
        DEFAULT_MAX_ITERATIONS,
        DEFAULT_IRR_TOLERANCE,
    )?;

    let mut warnings = twr.warnings.clone();
    warnings.extend(mwr.warnings.iter().cloned());

    let total_assets = valuations
        .iter()
        .max_by_key(|v| v.date)
        .map(|v| v.market_value)
        .unwrap_or(Decimal::ZERO);

    let mut result = GipsCalculationResult {
        time_weighted_return: twr.result.time_weighted_return,
        money_weighted_return: Some(mwr.result.money_weighted_return),
        composite_return: None,
        calculation_method: ReturnCalculationMethod::TimeWeighted,
        period_start: twr.result.period_start,
        period_end: twr.result.period_end,
        number_of_portfolios,
        total_assets,
        compliance_level: ComplianceLevel::NonCompliant,
        validation_notes: Vec::new(),
    };

    let (level, notes) = validate_gips_compliance(&result, &warnings);
    result.compliance_level = level;
    result.validation_notes = notes;

    Ok(with_metadata(
        "GIPS portfolio analysis: chain-linked TWR, Newton-Raphson MWR, rule-based compliance",
        &json!({
            "max_iterations": DEFAULT_MAX_ITERATIONS,
            "tolerance": DEFAULT_IRR_TOLERANCE,
            "number_of_portfolios": number_of_portfolios,
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        "decimal",
        result,
    ))
}

/// Presentation-ready GIPS report with percent-formatted figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GipsReport {
    pub firm_name: String,
    pub composite_name: String,
    pub period_start: String,
    pub period_end: String,
    pub time_weighted_return: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub money_weighted_return: Option<String>,
    pub number_of_portfolios: usize,
    pub total_assets: String,
    pub calculation_method: ReturnCalculationMethod,
    pub compliance_level: ComplianceLevel,
    pub validation_notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark_return: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excess_return: Option<String>,
    pub compliance_statement: String,
}

/// Assemble a presentation report from a classified result.
pub fn generate_gips_report(
    result: &GipsCalculationResult,
    firm_name: &str,
    composite_name: &str,
    benchmark: Option<(&str, Rate)>,
) -> GipsReport {
    let compliance_statement = if result.compliance_level == ComplianceLevel::FullCompliance {
        format!(
            "{firm_name} claims compliance with the Global Investment Performance \
             Standards (GIPS®) and has prepared and presented this report in \
             compliance with the GIPS standards."
        )
    } else {
        "This report does not fully comply with GIPS standards. \
         See validation notes for details."
            .to_string()
    };

    GipsReport {
        firm_name: firm_name.to_string(),
        composite_name: composite_name.to_string(),
        period_start: result.period_start.format("%Y-%m-%d").to_string(),
        period_end: result.period_end.format("%Y-%m-%d").to_string(),
        time_weighted_return: format_percent(result.time_weighted_return),
        money_weighted_return: result.money_weighted_return.map(format_percent),
        number_of_portfolios: result.number_of_portfolios,
        total_assets: format_money(result.total_assets),
        calculation_method: result.calculation_method,
        compliance_level: result.compliance_level,
        validation_notes: result.validation_notes.clone(),
        benchmark_name: benchmark.map(|(name, _)| name.to_string()),
        benchmark_return: benchmark.map(|(_, r)| format_percent(r)),
        excess_return: benchmark.map(|(_, r)| format_percent(result.time_weighted_return - r)),
        compliance_statement,
    }
}

fn format_percent(rate: Rate) -> String {
    let pct = (rate * dec!(100)).to_f64().unwrap_or(f64::NAN);
    format!("{pct:.2}%")
}

/// `$1,234,567` style, rounded to whole currency units.
fn format_money(value: Money) -> String {
    let rounded = value.round();
    let digits = rounded.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FlowType;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_result(
        method: ReturnCalculationMethod,
        portfolios: usize,
        days: i64,
    ) -> GipsCalculationResult {
        let period_start = date(2020, 1, 1);
        GipsCalculationResult {
            time_weighted_return: dec!(0.10),
            money_weighted_return: None,
            composite_return: None,
            calculation_method: method,
            period_start,
            period_end: period_start + chrono::Duration::days(days),
            number_of_portfolios: portfolios,
            total_assets: dec!(1000000),
            compliance_level: ComplianceLevel::NonCompliant,
            validation_notes: Vec::new(),
        }
    }

    #[test]
    fn test_full_compliance() {
        let result = sample_result(ReturnCalculationMethod::TimeWeighted, 10, 400);
        let (level, notes) = validate_gips_compliance(&result, &[]);
        assert_eq!(level, ComplianceLevel::FullCompliance);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_wrong_method_is_partial() {
        let result = sample_result(ReturnCalculationMethod::ModifiedDietz, 10, 400);
        let (level, notes) = validate_gips_compliance(&result, &[]);
        assert_eq!(level, ComplianceLevel::PartialCompliance);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_warnings_block_full_compliance_but_stay_partial() {
        let result = sample_result(ReturnCalculationMethod::TimeWeighted, 10, 400);
        let warnings = vec!["IRR calculation may be unstable".to_string()];
        let (level, notes) = validate_gips_compliance(&result, &warnings);
        assert_eq!(level, ComplianceLevel::PartialCompliance);
        assert_eq!(notes, vec!["Calculation warning: IRR calculation may be unstable"]);
    }

    #[test]
    fn test_advisory_notes_do_not_block_full_compliance() {
        // Thin composite over a short period: two notes, still full.
        let result = sample_result(ReturnCalculationMethod::TimeWeighted, 1, 100);
        let (level, notes) = validate_gips_compliance(&result, &[]);
        assert_eq!(level, ComplianceLevel::FullCompliance);
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn test_analyze_portfolio_lifecycle() {
        let valuations = vec![
            PortfolioValuation {
                date: date(2020, 1, 1),
                market_value: dec!(1000000),
                accrued_income: Decimal::ZERO,
                cash_balance: Decimal::ZERO,
            },
            PortfolioValuation {
                date: date(2020, 7, 1),
                market_value: dec!(1050000),
                accrued_income: Decimal::ZERO,
                cash_balance: Decimal::ZERO,
            },
            PortfolioValuation {
                date: date(2021, 1, 1),
                market_value: dec!(1120000),
                accrued_income: Decimal::ZERO,
                cash_balance: Decimal::ZERO,
            },
        ];
        let flows = vec![
            CashFlow {
                date: date(2020, 4, 1),
                amount: dec!(50000),
                flow_type: FlowType::Contribution,
                description: None,
            },
            CashFlow {
                date: date(2020, 10, 1),
                amount: dec!(-25000),
                flow_type: FlowType::Withdrawal,
                description: None,
            },
        ];

        let output = analyze_portfolio(&valuations, &flows, 1).unwrap();
        let result = &output.result;
        assert_eq!(result.calculation_method, ReturnCalculationMethod::TimeWeighted);
        assert_eq!(result.compliance_level, ComplianceLevel::FullCompliance);
        assert_eq!(result.total_assets, dec!(1120000));
        assert!(result.money_weighted_return.is_some());
        // Thin composite note only; the period spans a full year.
        assert_eq!(result.validation_notes.len(), 1);

        // TWR strips flow timing; MWR prices it. Sub-periods: 0% then
        // 95,000 / 1,050,000.
        let twr = result.time_weighted_return;
        let mwr = result.money_weighted_return.unwrap();
        assert!((twr - dec!(0.0904761904)).abs() < dec!(0.0000001));
        assert!((twr - mwr).abs() > dec!(0.01));
    }

    #[test]
    fn test_report_formatting() {
        let mut result = sample_result(ReturnCalculationMethod::TimeWeighted, 10, 400);
        result.compliance_level = ComplianceLevel::FullCompliance;
        result.money_weighted_return = Some(dec!(0.085));

        let report = generate_gips_report(&result, "Acme Capital", "Core Equity", None);
        assert_eq!(report.time_weighted_return, "10.00%");
        assert_eq!(report.money_weighted_return.as_deref(), Some("8.50%"));
        assert_eq!(report.total_assets, "$1,000,000");
        assert!(report.compliance_statement.contains("claims compliance"));
        assert!(report.benchmark_name.is_none());
    }

    #[test]
    fn test_report_benchmark_excess() {
        let mut result = sample_result(ReturnCalculationMethod::TimeWeighted, 10, 400);
        result.compliance_level = ComplianceLevel::PartialCompliance;

        let report =
            generate_gips_report(&result, "Acme Capital", "Core Equity", Some(("S&P 500", dec!(0.08))));
        assert_eq!(report.benchmark_return.as_deref(), Some("8.00%"));
        assert_eq!(report.excess_return.as_deref(), Some("2.00%"));
        assert!(report.compliance_statement.contains("does not fully comply"));
    }
}
