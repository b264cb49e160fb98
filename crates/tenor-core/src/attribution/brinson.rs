use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

use crate::error::TenorError;
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::TenorResult;

const WEIGHT_TOLERANCE: Decimal = dec!(0.01);

/// One sector's weight and return in the portfolio and its benchmark.
/// A sector held on only one side carries zero weight on the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorExposure {
    pub sector: String,
    pub portfolio_weight: Decimal,
    pub portfolio_return: Rate,
    pub benchmark_weight: Decimal,
    pub benchmark_return: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorAttribution {
    pub sector: String,
    pub allocation_effect: Decimal,
    pub selection_effect: Decimal,
    pub interaction_effect: Decimal,
    pub total_effect: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrinsonOutput {
    pub portfolio_return: Rate,
    pub benchmark_return: Rate,
    pub active_return: Rate,
    pub allocation_effect: Decimal,
    pub selection_effect: Decimal,
    pub interaction_effect: Decimal,
    pub total_attribution: Decimal,
    pub sector_attribution: Vec<SectorAttribution>,
}

fn validate_weights(
    sectors: &[SectorExposure],
    which: &str,
    warnings: &mut Vec<String>,
) -> TenorResult<()> {
    let sum: Decimal = match which {
        "portfolio" => sectors.iter().map(|s| s.portfolio_weight).sum(),
        _ => sectors.iter().map(|s| s.benchmark_weight).sum(),
    };
    if (sum - Decimal::ONE).abs() > WEIGHT_TOLERANCE {
        return Err(TenorError::InvalidInput {
            field: format!("{which}_weights"),
            reason: format!("{which} weights sum to {sum} (must be within 0.01 of 1.0)"),
        });
    }

    for s in sectors {
        let w = if which == "portfolio" {
            s.portfolio_weight
        } else {
            s.benchmark_weight
        };
        if w < Decimal::ZERO {
            warnings.push(format!(
                "Negative {which} weight in sector '{}': {w} (short position)",
                s.sector
            ));
        }
    }
    Ok(())
}

/// Brinson-Hood-Beebower attribution.
///
/// Decomposes the active return into allocation `(wp − wb)·rb`, selection
/// `wb·(rp − rb)` and interaction `(wp − wb)·(rp − rb)` per sector; the
/// three totals sum to the total attribution figure. Both weight columns
/// must sum to 1 within [`WEIGHT_TOLERANCE`].
pub fn brinson_attribution(
    sectors: &[SectorExposure],
) -> TenorResult<ComputationOutput<BrinsonOutput>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    if sectors.is_empty() {
        return Err(TenorError::InvalidInput {
            field: "sectors".into(),
            reason: "At least one sector is required".into(),
        });
    }
    validate_weights(sectors, "portfolio", &mut warnings)?;
    validate_weights(sectors, "benchmark", &mut warnings)?;

    let portfolio_return: Rate = sectors
        .iter()
        .map(|s| s.portfolio_weight * s.portfolio_return)
        .sum();
    let benchmark_return: Rate = sectors
        .iter()
        .map(|s| s.benchmark_weight * s.benchmark_return)
        .sum();

    let mut allocation_effect = Decimal::ZERO;
    let mut selection_effect = Decimal::ZERO;
    let mut interaction_effect = Decimal::ZERO;
    let mut sector_attribution = Vec::with_capacity(sectors.len());

    for s in sectors {
        let allocation = (s.portfolio_weight - s.benchmark_weight) * s.benchmark_return;
        let selection = s.benchmark_weight * (s.portfolio_return - s.benchmark_return);
        let interaction =
            (s.portfolio_weight - s.benchmark_weight) * (s.portfolio_return - s.benchmark_return);

        allocation_effect += allocation;
        selection_effect += selection;
        interaction_effect += interaction;

        sector_attribution.push(SectorAttribution {
            sector: s.sector.clone(),
            allocation_effect: allocation,
            selection_effect: selection,
            interaction_effect: interaction,
            total_effect: allocation + selection + interaction,
        });
    }

    let output = BrinsonOutput {
        portfolio_return,
        benchmark_return,
        active_return: portfolio_return - benchmark_return,
        allocation_effect,
        selection_effect,
        interaction_effect,
        total_attribution: allocation_effect + selection_effect + interaction_effect,
        sector_attribution,
    };

    Ok(with_metadata(
        "Brinson-Hood-Beebower single-period sector attribution",
        &json!({
            "model": "Brinson-Hood-Beebower",
            "weight_tolerance": WEIGHT_TOLERANCE,
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        "decimal",
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sector(name: &str, pw: Decimal, pr: Decimal, bw: Decimal, br: Decimal) -> SectorExposure {
        SectorExposure {
            sector: name.into(),
            portfolio_weight: pw,
            portfolio_return: pr,
            benchmark_weight: bw,
            benchmark_return: br,
        }
    }

    fn three_sector_input() -> Vec<SectorExposure> {
        vec![
            sector("Equity", dec!(0.60), dec!(0.10), dec!(0.50), dec!(0.08)),
            sector("Bonds", dec!(0.30), dec!(0.04), dec!(0.40), dec!(0.05)),
            sector("Cash", dec!(0.10), dec!(0.02), dec!(0.10), dec!(0.02)),
        ]
    }

    #[test]
    fn test_returns_and_active() {
        let out = brinson_attribution(&three_sector_input()).unwrap();
        assert_eq!(out.result.portfolio_return, dec!(0.074));
        assert_eq!(out.result.benchmark_return, dec!(0.062));
        assert_eq!(out.result.active_return, dec!(0.012));
    }

    #[test]
    fn test_effects_sum_to_total_attribution() {
        let out = brinson_attribution(&three_sector_input()).unwrap();
        let r = &out.result;
        assert_eq!(
            r.total_attribution,
            r.allocation_effect + r.selection_effect + r.interaction_effect
        );
        let sector_sum: Decimal = r.sector_attribution.iter().map(|s| s.total_effect).sum();
        assert_eq!(sector_sum, r.total_attribution);
    }

    #[test]
    fn test_bhb_allocation_uses_sector_benchmark_return() {
        // Overweight equity by 0.10 with benchmark return 0.08:
        // allocation = 0.10 * 0.08 = 0.008.
        let out = brinson_attribution(&three_sector_input()).unwrap();
        let equity = &out.result.sector_attribution[0];
        assert_eq!(equity.allocation_effect, dec!(0.008));
        assert_eq!(equity.selection_effect, dec!(0.01));
    }

    #[test]
    fn test_identical_exposures_attribute_nothing() {
        let sectors = vec![
            sector("A", dec!(0.60), dec!(0.08), dec!(0.60), dec!(0.08)),
            sector("B", dec!(0.40), dec!(0.05), dec!(0.40), dec!(0.05)),
        ];
        let out = brinson_attribution(&sectors).unwrap();
        assert_eq!(out.result.active_return, Decimal::ZERO);
        assert_eq!(out.result.total_attribution, Decimal::ZERO);
    }

    #[test]
    fn test_one_sided_sector_zero_weight() {
        // Sector absent from the benchmark carries zero benchmark weight.
        let sectors = vec![
            sector("InBoth", dec!(0.70), dec!(0.10), dec!(1.0), dec!(0.08)),
            sector("OnlyPortfolio", dec!(0.30), dec!(0.05), dec!(0.0), dec!(0.03)),
        ];
        let out = brinson_attribution(&sectors).unwrap();
        let only = &out.result.sector_attribution[1];
        assert_eq!(only.selection_effect, Decimal::ZERO);
        assert_eq!(only.allocation_effect, dec!(0.30) * dec!(0.03));
    }

    #[test]
    fn test_bad_weights_rejected() {
        let sectors = vec![
            sector("A", dec!(0.30), dec!(0.10), dec!(0.50), dec!(0.08)),
            sector("B", dec!(0.30), dec!(0.05), dec!(0.50), dec!(0.04)),
        ];
        let result = brinson_attribution(&sectors);
        assert!(result.is_err());
        let message = format!("{}", result.unwrap_err());
        assert!(message.contains("portfolio"));
    }

    #[test]
    fn test_empty_sectors_rejected() {
        assert!(brinson_attribution(&[]).is_err());
    }

    #[test]
    fn test_short_position_warns() {
        let sectors = vec![
            sector("Long", dec!(1.20), dec!(0.10), dec!(1.0), dec!(0.08)),
            sector("Short", dec!(-0.20), dec!(0.05), dec!(0.0), dec!(0.02)),
        ];
        let out = brinson_attribution(&sectors).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("short position")));
    }
}
