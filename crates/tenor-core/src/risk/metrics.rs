use serde::{Deserialize, Serialize};

use crate::error::TenorError;
use crate::TenorResult;

/// Constant risk-free rate assumed when no rate series is supplied.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Historical VaR/CVaR need a minimum sample to say anything meaningful.
const MIN_TAIL_OBSERVATIONS: usize = 10;

/// Maximum drawdown and the indices framing it.
///
/// `recovery_index` is `None` when the cumulative value never regains the
/// pre-drawdown peak. All three indices are `None` for series too short to
/// have a drawdown at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownInfo {
    pub max_drawdown: f64,
    pub peak_index: Option<usize>,
    pub trough_index: Option<usize>,
    pub recovery_index: Option<usize>,
}

/// Flat record of every risk figure, paired 95%/99% tail measures included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMetricsBundle {
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub volatility: f64,
    pub max_drawdown: f64,
    pub var_95: f64,
    pub cvar_95: f64,
    pub var_99: f64,
    pub cvar_99: f64,
}

/// Risk metrics over an annual return vector.
///
/// Degenerate inputs (too few observations, zero dispersion, empty tails)
/// produce NaN rather than errors, so a metric sweep over many series never
/// aborts mid-run. Sortino is the one exception: a series with no negative
/// excess returns has no downside risk and reports `+∞`.
#[derive(Debug, Clone)]
pub struct RiskMetricsCalculator {
    returns: Vec<f64>,
    excess_returns: Vec<f64>,
}

impl RiskMetricsCalculator {
    /// `risk_free_rates`, when given, must be parallel to `returns`; when
    /// absent every year is charged [`DEFAULT_RISK_FREE_RATE`].
    pub fn new(returns: Vec<f64>, risk_free_rates: Option<Vec<f64>>) -> TenorResult<Self> {
        let excess_returns = match &risk_free_rates {
            Some(rates) => {
                if rates.len() != returns.len() {
                    return Err(TenorError::InvalidInput {
                        field: "risk_free_rates".into(),
                        reason: format!(
                            "Expected {} rates to match returns, got {}",
                            returns.len(),
                            rates.len()
                        ),
                    });
                }
                returns.iter().zip(rates).map(|(r, rf)| r - rf).collect()
            }
            None => returns.iter().map(|r| r - DEFAULT_RISK_FREE_RATE).collect(),
        };
        Ok(Self {
            returns,
            excess_returns,
        })
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Mean excess return over its sample standard deviation.
    pub fn sharpe_ratio(&self) -> f64 {
        if self.excess_returns.len() < 2 {
            return f64::NAN;
        }
        let std = sample_std(&self.excess_returns);
        if std == 0.0 {
            return f64::NAN;
        }
        mean(&self.excess_returns) / std
    }

    /// Mean excess return over downside deviation, where the denominator is
    /// the root-mean-square of negative excess returns only.
    pub fn sortino_ratio(&self) -> f64 {
        if self.excess_returns.len() < 2 {
            return f64::NAN;
        }
        let downside: Vec<f64> = self
            .excess_returns
            .iter()
            .copied()
            .filter(|r| *r < 0.0)
            .collect();
        if downside.is_empty() {
            return f64::INFINITY;
        }
        let downside_deviation =
            (downside.iter().map(|r| r * r).sum::<f64>() / downside.len() as f64).sqrt();
        if downside_deviation == 0.0 {
            return f64::NAN;
        }
        mean(&self.excess_returns) / downside_deviation
    }

    /// Peak-to-trough decline of the cumulative growth path, reported as a
    /// positive fraction.
    pub fn maximum_drawdown(&self) -> DrawdownInfo {
        if self.returns.len() < 2 {
            return DrawdownInfo {
                max_drawdown: f64::NAN,
                peak_index: None,
                trough_index: None,
                recovery_index: None,
            };
        }

        let mut cumulative = Vec::with_capacity(self.returns.len());
        let mut acc = 1.0;
        for r in &self.returns {
            acc *= 1.0 + r;
            cumulative.push(acc);
        }

        let mut running_max = Vec::with_capacity(cumulative.len());
        let mut peak = f64::NEG_INFINITY;
        for &v in &cumulative {
            if v > peak {
                peak = v;
            }
            running_max.push(peak);
        }

        let mut trough_index = 0;
        let mut max_drawdown = 0.0;
        for (i, (&cum, &run)) in cumulative.iter().zip(&running_max).enumerate() {
            let drawdown = (cum - run) / run;
            if drawdown < max_drawdown {
                max_drawdown = drawdown;
                trough_index = i;
            }
        }

        // First index attaining the peak in force at the trough.
        let mut peak_index = 0;
        for (i, &run) in running_max[..=trough_index].iter().enumerate() {
            if run > running_max[peak_index] {
                peak_index = i;
            }
        }

        let peak_value = running_max[trough_index];
        let recovery_index = cumulative[trough_index + 1..]
            .iter()
            .position(|&v| v >= peak_value)
            .map(|offset| trough_index + 1 + offset);

        DrawdownInfo {
            max_drawdown: max_drawdown.abs(),
            peak_index: Some(peak_index),
            trough_index: Some(trough_index),
            recovery_index,
        }
    }

    /// Whole-series CAGR over maximum drawdown.
    pub fn calmar_ratio(&self) -> f64 {
        if self.returns.len() < 2 {
            return f64::NAN;
        }
        let total_growth: f64 = self.returns.iter().map(|r| 1.0 + r).product();
        let cagr = total_growth.powf(1.0 / self.returns.len() as f64) - 1.0;

        let max_drawdown = self.maximum_drawdown().max_drawdown;
        if max_drawdown.is_nan() || max_drawdown == 0.0 {
            return f64::NAN;
        }
        cagr / max_drawdown
    }

    /// Sample standard deviation of the raw return vector.
    pub fn volatility(&self) -> f64 {
        if self.returns.len() < 2 {
            return f64::NAN;
        }
        sample_std(&self.returns)
    }

    /// Historical Value at Risk. `confidence_level` is the tail probability:
    /// 0.05 gives the 95% VaR. Losses are reported as positive numbers.
    pub fn var_historical(&self, confidence_level: f64) -> f64 {
        if self.returns.len() < MIN_TAIL_OBSERVATIONS {
            return f64::NAN;
        }
        -percentile(&self.returns, confidence_level * 100.0)
    }

    /// Historical Conditional Value at Risk (expected shortfall): mean of
    /// all returns at or below the VaR threshold, as a positive loss.
    pub fn cvar_historical(&self, confidence_level: f64) -> f64 {
        if self.returns.len() < MIN_TAIL_OBSERVATIONS {
            return f64::NAN;
        }
        let var_threshold = -self.var_historical(confidence_level);
        let tail: Vec<f64> = self
            .returns
            .iter()
            .copied()
            .filter(|r| *r <= var_threshold)
            .collect();
        if tail.is_empty() {
            return f64::NAN;
        }
        -mean(&tail)
    }

    pub fn all_metrics(&self) -> RiskMetricsBundle {
        RiskMetricsBundle {
            sharpe_ratio: self.sharpe_ratio(),
            sortino_ratio: self.sortino_ratio(),
            calmar_ratio: self.calmar_ratio(),
            volatility: self.volatility(),
            max_drawdown: self.maximum_drawdown().max_drawdown,
            var_95: self.var_historical(0.05),
            cvar_95: self.cvar_historical(0.05),
            var_99: self.var_historical(0.01),
            cvar_99: self.cvar_historical(0.01),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with one delta degree of freedom.
fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Percentile with linear interpolation between closest ranks.
pub(crate) fn percentile(values: &[f64], pct: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (sorted.len() - 1) as f64 * pct / 100.0;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = rank - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_returns() -> Vec<f64> {
        vec![
            0.10, -0.05, 0.15, 0.08, -0.12, 0.20, 0.03, -0.08, 0.11, 0.06, -0.15, 0.18,
        ]
    }

    #[test]
    fn test_rate_length_mismatch_rejected() {
        let result = RiskMetricsCalculator::new(vec![0.1, 0.2], Some(vec![0.02]));
        assert!(result.is_err());
    }

    #[test]
    fn test_sharpe_constant_series_is_nan() {
        let calc = RiskMetricsCalculator::new(vec![0.05; 6], None).unwrap();
        assert!(calc.sharpe_ratio().is_nan());
    }

    #[test]
    fn test_sharpe_too_few_observations_is_nan() {
        let calc = RiskMetricsCalculator::new(vec![0.05], None).unwrap();
        assert!(calc.sharpe_ratio().is_nan());
        assert!(calc.volatility().is_nan());
    }

    #[test]
    fn test_sortino_no_downside_is_infinite() {
        let calc = RiskMetricsCalculator::new(vec![0.10, 0.12, 0.08, 0.15], None).unwrap();
        assert_eq!(calc.sortino_ratio(), f64::INFINITY);
    }

    #[test]
    fn test_sortino_finite_with_downside() {
        let calc = RiskMetricsCalculator::new(sample_returns(), None).unwrap();
        let sortino = calc.sortino_ratio();
        assert!(sortino.is_finite());
    }

    #[test]
    fn test_drawdown_indices() {
        // Cumulative path: 1.10, 0.88, 0.924, 1.2012. Trough at 1, peak at 0,
        // recovered by index 3.
        let calc = RiskMetricsCalculator::new(vec![0.10, -0.20, 0.05, 0.30], None).unwrap();
        let dd = calc.maximum_drawdown();
        assert!((dd.max_drawdown - 0.20).abs() < 1e-12);
        assert_eq!(dd.peak_index, Some(0));
        assert_eq!(dd.trough_index, Some(1));
        assert_eq!(dd.recovery_index, Some(3));
    }

    #[test]
    fn test_drawdown_no_recovery() {
        let calc = RiskMetricsCalculator::new(vec![0.10, -0.30, 0.02], None).unwrap();
        let dd = calc.maximum_drawdown();
        assert_eq!(dd.recovery_index, None);
    }

    #[test]
    fn test_calmar_nan_without_drawdown() {
        let calc = RiskMetricsCalculator::new(vec![0.05, 0.06, 0.07], None).unwrap();
        assert!(calc.calmar_ratio().is_nan());
    }

    #[test]
    fn test_var_requires_ten_observations() {
        let calc = RiskMetricsCalculator::new(vec![0.05; 9], None).unwrap();
        assert!(calc.var_historical(0.05).is_nan());
        assert!(calc.cvar_historical(0.05).is_nan());
    }

    #[test]
    fn test_var_ordering() {
        let calc = RiskMetricsCalculator::new(sample_returns(), None).unwrap();
        let var_95 = calc.var_historical(0.05);
        let var_99 = calc.var_historical(0.01);
        let cvar_95 = calc.cvar_historical(0.05);
        assert!(var_99 >= var_95);
        assert!(cvar_95 >= var_95);
    }

    #[test]
    fn test_percentile_interpolation() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&values, 50.0) - 2.5).abs() < 1e-12);
        assert!((percentile(&values, 0.0) - 1.0).abs() < 1e-12);
        assert!((percentile(&values, 100.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_metrics_bundle_consistency() {
        let calc = RiskMetricsCalculator::new(sample_returns(), None).unwrap();
        let bundle = calc.all_metrics();
        assert_eq!(bundle.sharpe_ratio, calc.sharpe_ratio());
        assert_eq!(bundle.max_drawdown, calc.maximum_drawdown().max_drawdown);
        assert_eq!(bundle.var_95, calc.var_historical(0.05));
    }
}
