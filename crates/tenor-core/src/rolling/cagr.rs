use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{ReturnSeries, DEFAULT_WINDOWS, FLOATING_TOLERANCE};

/// One rolling window result: the window's final year and its CAGR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingCagr {
    pub end_year: i32,
    pub cagr: f64,
}

/// Compute the CAGR of every `window_size`-year window anchored at or after
/// `start_year`.
///
/// Total growth is accumulated in log space (`exp(Σ ln(1+r))`) instead of
/// naive repeated multiplication, and results within [`FLOATING_TOLERANCE`]
/// of zero are snapped to exactly zero. A missing `start_year` or a series
/// too short for even one window yields an empty vector; infeasible
/// combinations are expected outcomes, not errors.
pub fn compute_rolling_cagr(
    series: &ReturnSeries,
    window_size: usize,
    start_year: i32,
) -> Vec<RollingCagr> {
    let mut results = Vec::new();
    if window_size == 0 {
        return results;
    }
    let Some(start_idx) = series.index_of_year(start_year) else {
        return results;
    };
    let n = series.len();
    if start_idx + window_size > n {
        return results;
    }

    let years = series.years();
    let returns = series.returns();
    for i in start_idx..=(n - window_size) {
        let log_sum: f64 = returns[i..i + window_size]
            .iter()
            .map(|r| (1.0 + r).ln())
            .sum();
        let total_growth = log_sum.exp();
        let mut cagr = total_growth.powf(1.0 / window_size as f64) - 1.0;
        if cagr.abs() < FLOATING_TOLERANCE {
            cagr = 0.0;
        }
        results.push(RollingCagr {
            end_year: years[i + window_size - 1],
            cagr,
        });
    }
    results
}

/// Rolling CAGRs for every default window length, keyed by window size.
/// Window lengths with no feasible data map to empty vectors.
pub fn compute_all_rolling_cagrs(
    series: &ReturnSeries,
    start_year: i32,
) -> BTreeMap<usize, Vec<RollingCagr>> {
    DEFAULT_WINDOWS
        .iter()
        .map(|&w| (w, compute_rolling_cagr(series, w, start_year)))
        .collect()
}

/// Best/worst/average CAGR summary for one window length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowStatistics {
    pub window_size: usize,
    pub best_window: Option<String>,
    pub best_cagr: f64,
    pub worst_window: Option<String>,
    pub worst_cagr: f64,
    pub avg_cagr: f64,
    pub count: usize,
}

/// Summary statistics for every default window length from `start_year`.
/// Infeasible window lengths report `None` labels and NaN figures.
pub fn compute_window_statistics(series: &ReturnSeries, start_year: i32) -> Vec<WindowStatistics> {
    DEFAULT_WINDOWS
        .iter()
        .map(|&window_size| {
            let cagrs = compute_rolling_cagr(series, window_size, start_year);
            match series.index_of_year(start_year) {
                Some(start_idx) if !cagrs.is_empty() => {
                    let values: Vec<f64> = cagrs.iter().map(|c| c.cagr).collect();
                    let (best_idx, worst_idx) = extremes(&values);
                    WindowStatistics {
                        window_size,
                        best_window: Some(window_label(series, start_idx, best_idx, &cagrs)),
                        best_cagr: values[best_idx],
                        worst_window: Some(window_label(series, start_idx, worst_idx, &cagrs)),
                        worst_cagr: values[worst_idx],
                        avg_cagr: values.iter().sum::<f64>() / values.len() as f64,
                        count: cagrs.len(),
                    }
                }
                _ => WindowStatistics {
                    window_size,
                    best_window: None,
                    best_cagr: f64::NAN,
                    worst_window: None,
                    worst_cagr: f64::NAN,
                    avg_cagr: f64::NAN,
                    count: 0,
                },
            }
        })
        .collect()
}

/// Indices of the first maximum and first minimum value.
pub(crate) fn extremes(values: &[f64]) -> (usize, usize) {
    let mut best = 0;
    let mut worst = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
        if *v < values[worst] {
            worst = i;
        }
    }
    (best, worst)
}

/// `"{startYear}-{endYear}"` label for the window at `offset` anchors past
/// `start_idx`.
pub(crate) fn window_label(
    series: &ReturnSeries,
    start_idx: usize,
    offset: usize,
    cagrs: &[RollingCagr],
) -> String {
    format!(
        "{}-{}",
        series.years()[start_idx + offset],
        cagrs[offset].end_year
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReturnSeries;

    fn sample_series() -> ReturnSeries {
        ReturnSeries::from_pairs(&[
            (2000, 0.10),
            (2001, 0.20),
            (2002, -0.10),
            (2003, 0.05),
            (2004, 0.15),
        ])
        .unwrap()
    }

    #[test]
    fn test_single_year_window_equals_return() {
        let series = sample_series();
        let results = compute_rolling_cagr(&series, 1, 2000);
        assert_eq!(results.len(), 5);
        for (result, expected) in results.iter().zip(series.returns()) {
            assert!((result.cagr - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_chain_link_identity() {
        let series = sample_series();
        for result in compute_rolling_cagr(&series, 3, 2000) {
            let start_idx = series.index_of_year(result.end_year - 2).unwrap();
            let product: f64 = series.returns()[start_idx..start_idx + 3]
                .iter()
                .map(|r| 1.0 + r)
                .product();
            assert!(((1.0 + result.cagr).powi(3) - product).abs() < 1e-9);
        }
    }

    #[test]
    fn test_three_year_window_from_2000() {
        let series = sample_series();
        let results = compute_rolling_cagr(&series, 3, 2000);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].end_year, 2002);
        // (1.10 * 1.20 * 0.90)^(1/3) - 1
        let expected = 1.188f64.powf(1.0 / 3.0) - 1.0;
        assert!((results[0].cagr - expected).abs() < 1e-12);
    }

    #[test]
    fn test_missing_start_year_is_empty() {
        let series = sample_series();
        assert!(compute_rolling_cagr(&series, 2, 1990).is_empty());
    }

    #[test]
    fn test_insufficient_data_is_empty() {
        let series = sample_series();
        assert!(compute_rolling_cagr(&series, 6, 2000).is_empty());
        assert!(compute_rolling_cagr(&series, 2, 2004).is_empty());
    }

    #[test]
    fn test_zero_snap() {
        let series = ReturnSeries::from_pairs(&[(2000, 0.10), (2001, -1.0 + 1.0 / 1.1)]).unwrap();
        let results = compute_rolling_cagr(&series, 2, 2000);
        // Growth of 1.1 then back to 1.0: CAGR should snap to exactly zero.
        assert_eq!(results[0].cagr, 0.0);
    }

    #[test]
    fn test_all_windows_keyed_by_size() {
        let series = sample_series();
        let all = compute_all_rolling_cagrs(&series, 2000);
        assert_eq!(all.len(), DEFAULT_WINDOWS.len());
        assert_eq!(all[&5].len(), 1);
        assert!(all[&10].is_empty());
    }

    #[test]
    fn test_window_statistics() {
        let series = sample_series();
        let stats = compute_window_statistics(&series, 2000);
        let five = stats.iter().find(|s| s.window_size == 5).unwrap();
        assert_eq!(five.count, 1);
        assert_eq!(five.best_window.as_deref(), Some("2000-2004"));
        assert!((five.best_cagr - five.worst_cagr).abs() < 1e-12);

        let ten = stats.iter().find(|s| s.window_size == 10).unwrap();
        assert_eq!(ten.count, 0);
        assert!(ten.best_window.is_none());
        assert!(ten.avg_cagr.is_nan());
    }
}
