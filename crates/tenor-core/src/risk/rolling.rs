use serde::{Deserialize, Serialize};

use crate::risk::metrics::{RiskMetricsBundle, RiskMetricsCalculator};
use crate::{TenorError, TenorResult};

/// Risk metric bundle for one rolling window position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingRiskMetrics {
    #[serde(flatten)]
    pub metrics: RiskMetricsBundle,
    pub window_start_index: usize,
    pub window_end_index: usize,
}

/// Full metric bundle at every `window_size` position across `returns`,
/// slicing the rate series alongside when one is given. A series shorter
/// than the window yields no positions.
pub fn rolling_risk_metrics(
    returns: &[f64],
    window_size: usize,
    risk_free_rates: Option<&[f64]>,
) -> TenorResult<Vec<RollingRiskMetrics>> {
    if let Some(rates) = risk_free_rates {
        if rates.len() != returns.len() {
            return Err(TenorError::InvalidInput {
                field: "risk_free_rates".to_string(),
                reason: format!(
                    "expected {} rates to match returns, got {}",
                    returns.len(),
                    rates.len()
                ),
            });
        }
    }

    let mut results = Vec::new();
    if window_size == 0 || returns.len() < window_size {
        return Ok(results);
    }

    for i in 0..=(returns.len() - window_size) {
        let window_returns = returns[i..i + window_size].to_vec();
        let window_rates = risk_free_rates.map(|rates| rates[i..i + window_size].to_vec());
        let calculator = RiskMetricsCalculator::new(window_returns, window_rates)?;
        results.push(RollingRiskMetrics {
            metrics: calculator.all_metrics(),
            window_start_index: i,
            window_end_index: i + window_size - 1,
        });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_positions() {
        let returns = vec![0.10, -0.05, 0.15, 0.08, -0.12];
        let results = rolling_risk_metrics(&returns, 3, None).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].window_start_index, 0);
        assert_eq!(results[0].window_end_index, 2);
        assert_eq!(results[2].window_start_index, 2);
        assert_eq!(results[2].window_end_index, 4);
    }

    #[test]
    fn test_series_shorter_than_window_is_empty() {
        let returns = vec![0.10, -0.05];
        assert!(rolling_risk_metrics(&returns, 3, None).unwrap().is_empty());
    }

    #[test]
    fn test_parallel_rates_sliced_in_lockstep() {
        let returns = vec![0.10, -0.05, 0.15, 0.08];
        let rates = vec![0.02, 0.02, 0.03, 0.03];
        let results = rolling_risk_metrics(&returns, 2, Some(&rates)).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_rate_length_mismatch_rejected() {
        let returns = vec![0.10, -0.05, 0.15, 0.08];
        let rates = vec![0.02, 0.02];
        assert!(rolling_risk_metrics(&returns, 2, Some(&rates)).is_err());
    }

    #[test]
    fn test_flattened_serialization() {
        let returns = vec![0.10, -0.05, 0.15];
        let results = rolling_risk_metrics(&returns, 3, None).unwrap();
        let json = serde_json::to_value(&results[0]).unwrap();
        assert!(json.get("sharpe_ratio").is_some());
        assert_eq!(json["window_start_index"], 0);
    }
}
