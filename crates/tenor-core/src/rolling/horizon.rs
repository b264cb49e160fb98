use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::rolling::cagr::{compute_rolling_cagr, extremes, window_label};
use crate::types::ReturnSeries;

const CONDITION_NOT_MET: &str = "Condition not met - max feasible horizon used";
const THRESHOLD_NOT_MET: &str = "Threshold not met - max feasible horizon used";
const NO_FEASIBLE_WINDOWS: &str = "No feasible windows";

/// Window statistics at the holding period selected by a no-loss search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoLossStats {
    pub start_year: i32,
    pub min_holding_years: usize,
    pub worst_window: String,
    pub worst_cagr: f64,
    pub best_window: String,
    pub best_cagr: f64,
    pub average_cagr: f64,
    pub num_windows_checked: usize,
}

/// Outcome of [`find_min_no_loss_horizon`].
///
/// `Satisfied` carries the first holding period whose windows all have a
/// non-negative CAGR. `MaxFeasible` means no holding period qualified and
/// the statistics describe the longest computable one instead. `Infeasible`
/// means not a single window was computable for any length.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NoLossHorizon {
    Satisfied(NoLossStats),
    MaxFeasible(NoLossStats),
    Infeasible { start_year: i32 },
}

impl NoLossHorizon {
    pub fn stats(&self) -> Option<&NoLossStats> {
        match self {
            NoLossHorizon::Satisfied(s) | NoLossHorizon::MaxFeasible(s) => Some(s),
            NoLossHorizon::Infeasible { .. } => None,
        }
    }

    /// Annotation carried by fallback outcomes; `None` when the condition
    /// was genuinely satisfied.
    pub fn note(&self) -> Option<&'static str> {
        match self {
            NoLossHorizon::Satisfied(_) => None,
            NoLossHorizon::MaxFeasible(_) => Some(CONDITION_NOT_MET),
            NoLossHorizon::Infeasible { .. } => Some(NO_FEASIBLE_WINDOWS),
        }
    }

    /// Flat summary-table record. NaN figures and absent labels render as
    /// `"N/A"`, matching the shape batch exports expect.
    pub fn to_record(&self) -> Value {
        match self {
            NoLossHorizon::Satisfied(s) | NoLossHorizon::MaxFeasible(s) => {
                let mut record = json!({
                    "start_year_series": s.start_year,
                    "min_holding_years": s.min_holding_years,
                    "worst_window": s.worst_window,
                    "worst_cagr": s.worst_cagr,
                    "best_window": s.best_window,
                    "best_cagr": s.best_cagr,
                    "average_cagr": s.average_cagr,
                    "num_windows_checked": s.num_windows_checked,
                });
                if let Some(note) = self.note() {
                    record["note"] = json!(note);
                }
                record
            }
            NoLossHorizon::Infeasible { start_year } => json!({
                "start_year_series": start_year,
                "min_holding_years": "N/A",
                "worst_window": "N/A",
                "worst_cagr": Value::Null,
                "best_window": "N/A",
                "best_cagr": Value::Null,
                "average_cagr": Value::Null,
                "num_windows_checked": 0,
                "note": NO_FEASIBLE_WINDOWS,
            }),
        }
    }
}

/// Window statistics at the holding period selected by a spread search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadStats {
    pub start_year: i32,
    pub threshold: f64,
    pub min_holding_years: usize,
    pub best_window: String,
    pub best_cagr: f64,
    pub worst_window: String,
    pub worst_cagr: f64,
    pub spread: f64,
    pub num_windows_checked: usize,
}

/// Outcome of [`find_min_spread_horizon`], with the same three-way shape
/// as [`NoLossHorizon`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpreadHorizon {
    Satisfied(SpreadStats),
    MaxFeasible(SpreadStats),
    Infeasible { start_year: i32, threshold: f64 },
}

impl SpreadHorizon {
    pub fn stats(&self) -> Option<&SpreadStats> {
        match self {
            SpreadHorizon::Satisfied(s) | SpreadHorizon::MaxFeasible(s) => Some(s),
            SpreadHorizon::Infeasible { .. } => None,
        }
    }

    pub fn note(&self) -> Option<&'static str> {
        match self {
            SpreadHorizon::Satisfied(_) => None,
            SpreadHorizon::MaxFeasible(_) => Some(THRESHOLD_NOT_MET),
            SpreadHorizon::Infeasible { .. } => Some(NO_FEASIBLE_WINDOWS),
        }
    }

    pub fn to_record(&self) -> Value {
        match self {
            SpreadHorizon::Satisfied(s) | SpreadHorizon::MaxFeasible(s) => {
                let mut record = json!({
                    "start_year_series": s.start_year,
                    "threshold": s.threshold,
                    "min_holding_years": s.min_holding_years,
                    "best_window": s.best_window,
                    "best_cagr": s.best_cagr,
                    "worst_window": s.worst_window,
                    "worst_cagr": s.worst_cagr,
                    "spread": s.spread,
                    "num_windows_checked": s.num_windows_checked,
                });
                if let Some(note) = self.note() {
                    record["note"] = json!(note);
                }
                record
            }
            SpreadHorizon::Infeasible {
                start_year,
                threshold,
            } => json!({
                "start_year_series": start_year,
                "threshold": threshold,
                "min_holding_years": "N/A",
                "best_window": "N/A",
                "best_cagr": Value::Null,
                "worst_window": "N/A",
                "worst_cagr": Value::Null,
                "spread": Value::Null,
                "num_windows_checked": 0,
                "note": NO_FEASIBLE_WINDOWS,
            }),
        }
    }
}

/// Minimum holding period from `start_year` such that every window of that
/// length has non-negative CAGR.
///
/// Linear scan over increasing window lengths, accepting the first
/// qualifying length. The scan assumes longer holding periods do not
/// reintroduce losses and does not verify the condition beyond the first
/// hit.
pub fn find_min_no_loss_horizon(series: &ReturnSeries, start_year: i32) -> NoLossHorizon {
    let Some(start_idx) = series.index_of_year(start_year) else {
        return NoLossHorizon::Infeasible { start_year };
    };
    let max_feasible = series.len() - start_idx;

    for n in 1..=max_feasible {
        let cagrs = compute_rolling_cagr(series, n, start_year);
        if cagrs.is_empty() {
            continue;
        }
        if cagrs.iter().all(|c| c.cagr >= 0.0) {
            return NoLossHorizon::Satisfied(no_loss_stats(series, start_idx, start_year, n, &cagrs));
        }
    }

    let cagrs = compute_rolling_cagr(series, max_feasible, start_year);
    if cagrs.is_empty() {
        return NoLossHorizon::Infeasible { start_year };
    }
    NoLossHorizon::MaxFeasible(no_loss_stats(
        series,
        start_idx,
        start_year,
        max_feasible,
        &cagrs,
    ))
}

/// Minimum holding period from `start_year` such that the spread between
/// the best and worst window CAGR is at most `threshold`. Same linear
/// first-hit scan as [`find_min_no_loss_horizon`].
pub fn find_min_spread_horizon(
    series: &ReturnSeries,
    start_year: i32,
    threshold: f64,
) -> SpreadHorizon {
    let Some(start_idx) = series.index_of_year(start_year) else {
        return SpreadHorizon::Infeasible {
            start_year,
            threshold,
        };
    };
    let max_feasible = series.len() - start_idx;

    for n in 1..=max_feasible {
        let cagrs = compute_rolling_cagr(series, n, start_year);
        if cagrs.is_empty() {
            continue;
        }
        let stats = spread_stats(series, start_idx, start_year, threshold, n, &cagrs);
        if stats.spread <= threshold {
            return SpreadHorizon::Satisfied(stats);
        }
    }

    let cagrs = compute_rolling_cagr(series, max_feasible, start_year);
    if cagrs.is_empty() {
        return SpreadHorizon::Infeasible {
            start_year,
            threshold,
        };
    }
    SpreadHorizon::MaxFeasible(spread_stats(
        series,
        start_idx,
        start_year,
        threshold,
        max_feasible,
        &cagrs,
    ))
}

fn no_loss_stats(
    series: &ReturnSeries,
    start_idx: usize,
    start_year: i32,
    n: usize,
    cagrs: &[crate::rolling::cagr::RollingCagr],
) -> NoLossStats {
    let values: Vec<f64> = cagrs.iter().map(|c| c.cagr).collect();
    let (best_idx, worst_idx) = extremes(&values);
    NoLossStats {
        start_year,
        min_holding_years: n,
        worst_window: window_label(series, start_idx, worst_idx, cagrs),
        worst_cagr: values[worst_idx],
        best_window: window_label(series, start_idx, best_idx, cagrs),
        best_cagr: values[best_idx],
        average_cagr: values.iter().sum::<f64>() / values.len() as f64,
        num_windows_checked: cagrs.len(),
    }
}

fn spread_stats(
    series: &ReturnSeries,
    start_idx: usize,
    start_year: i32,
    threshold: f64,
    n: usize,
    cagrs: &[crate::rolling::cagr::RollingCagr],
) -> SpreadStats {
    let values: Vec<f64> = cagrs.iter().map(|c| c.cagr).collect();
    let (best_idx, worst_idx) = extremes(&values);
    SpreadStats {
        start_year,
        threshold,
        min_holding_years: n,
        best_window: window_label(series, start_idx, best_idx, cagrs),
        best_cagr: values[best_idx],
        worst_window: window_label(series, start_idx, worst_idx, cagrs),
        worst_cagr: values[worst_idx],
        spread: values[best_idx] - values[worst_idx],
        num_windows_checked: cagrs.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rolling::cagr::compute_rolling_cagr;
    use crate::types::ReturnSeries;

    fn sample_series() -> ReturnSeries {
        ReturnSeries::from_pairs(&[
            (2000, 0.10),
            (2001, -0.20),
            (2002, 0.30),
            (2003, 0.05),
            (2004, 0.15),
        ])
        .unwrap()
    }

    #[test]
    fn test_no_loss_minimality() {
        let series = sample_series();
        let result = find_min_no_loss_horizon(&series, 2000);
        let stats = result.stats().unwrap();
        assert!(result.note().is_none());
        let n = stats.min_holding_years;

        // Every window of the returned length is non-negative.
        assert!(compute_rolling_cagr(&series, n, 2000)
            .iter()
            .all(|c| c.cagr >= 0.0));
        // And every shorter length has at least one losing window.
        for shorter in 1..n {
            let cagrs = compute_rolling_cagr(&series, shorter, 2000);
            assert!(cagrs.iter().any(|c| c.cagr < 0.0));
        }
    }

    #[test]
    fn test_no_loss_all_positive_returns_horizon_one() {
        let series = ReturnSeries::from_pairs(&[(2000, 0.05), (2001, 0.08)]).unwrap();
        let result = find_min_no_loss_horizon(&series, 2000);
        assert_eq!(result.stats().unwrap().min_holding_years, 1);
        assert_eq!(result.stats().unwrap().num_windows_checked, 2);
    }

    #[test]
    fn test_no_loss_missing_start_year_infeasible() {
        let series = sample_series();
        let result = find_min_no_loss_horizon(&series, 1980);
        assert!(matches!(result, NoLossHorizon::Infeasible { .. }));
        assert_eq!(result.note(), Some("No feasible windows"));
        let record = result.to_record();
        assert_eq!(record["min_holding_years"], "N/A");
        assert_eq!(record["num_windows_checked"], 0);
    }

    #[test]
    fn test_spread_satisfied_is_within_threshold() {
        let series = sample_series();
        let result = find_min_spread_horizon(&series, 2000, 0.25);
        let stats = result.stats().unwrap();
        assert!(result.note().is_none());
        assert!(stats.spread <= 0.25);
        assert!((stats.spread - (stats.best_cagr - stats.worst_cagr)).abs() < 1e-12);
    }

    #[test]
    fn test_spread_impossible_threshold_falls_back_to_max_feasible() {
        let series = sample_series();
        let result = find_min_spread_horizon(&series, 2000, -1.0);
        assert!(matches!(result, SpreadHorizon::MaxFeasible(_)));
        assert_eq!(
            result.note(),
            Some("Threshold not met - max feasible horizon used")
        );
        let stats = result.stats().unwrap();
        // The longest window is the whole series: a single window, zero spread.
        assert_eq!(stats.min_holding_years, 5);
        assert_eq!(stats.num_windows_checked, 1);
        assert_eq!(stats.spread, 0.0);
    }

    #[test]
    fn test_record_includes_note_only_on_fallback() {
        let series = sample_series();
        let satisfied = find_min_spread_horizon(&series, 2000, 1.0).to_record();
        assert!(satisfied.get("note").is_none());

        let fallback = find_min_spread_horizon(&series, 2000, -1.0).to_record();
        assert_eq!(
            fallback["note"],
            "Threshold not met - max feasible horizon used"
        );
    }
}
