//! Quantitative performance analytics for long-horizon equity return series.
//!
//! The engine answers three families of questions over a caller-supplied
//! annual return history:
//!
//! - rolling-window compound annual growth rates for any holding window
//!   (`rolling::cagr`), and the shortest holding period that guarantees no
//!   loss or keeps the best/worst spread within a threshold
//!   (`rolling::horizon`);
//! - standardized risk figures over a raw returns vector: Sharpe, Sortino,
//!   Calmar, drawdown, volatility and historical VaR/CVaR (`risk`);
//! - regulator-style time-weighted and money-weighted returns from
//!   irregular cash-flow histories, Modified Dietz, composite blending and
//!   GIPS compliance classification (`gips`).
//!
//! Every public operation is a deterministic function of its explicit
//! inputs. There is no I/O, no persistent storage and no shared mutable
//! state: calculations that can degrade (unstable IRR, near-zero
//! denominators) return their warnings inside a [`types::ComputationOutput`]
//! envelope rather than accumulating them on the calculator.

pub mod error;
pub mod types;

#[cfg(feature = "rolling")]
pub mod rolling;

#[cfg(feature = "risk")]
pub mod risk;

#[cfg(feature = "gips")]
pub mod gips;

#[cfg(feature = "attribution")]
pub mod attribution;

pub use error::TenorError;
pub use types::*;

/// Standard result type for all tenor operations
pub type TenorResult<T> = Result<T, TenorError>;
