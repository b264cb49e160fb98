//! Risk metrics over raw return vectors: Sharpe, Sortino, Calmar,
//! drawdown analysis, volatility and historical VaR/CVaR.

pub mod metrics;
pub mod rates;
pub mod rolling;

pub use metrics::{DrawdownInfo, RiskMetricsBundle, RiskMetricsCalculator, DEFAULT_RISK_FREE_RATE};
pub use rates::historical_risk_free_rates;
pub use rolling::{rolling_risk_metrics, RollingRiskMetrics};
