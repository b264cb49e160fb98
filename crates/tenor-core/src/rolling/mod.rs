//! Rolling-window CAGR computation and holding-horizon searches.

pub mod cagr;
pub mod horizon;

pub use cagr::{
    compute_all_rolling_cagrs, compute_rolling_cagr, compute_window_statistics, RollingCagr,
    WindowStatistics,
};
pub use horizon::{
    find_min_no_loss_horizon, find_min_spread_horizon, NoLossHorizon, NoLossStats, SpreadHorizon,
    SpreadStats,
};
