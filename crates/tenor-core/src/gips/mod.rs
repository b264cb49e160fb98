//! GIPS-style performance measurement: time-weighted and money-weighted
//! returns, Modified Dietz, composite blending, compliance classification
//! and report assembly.

pub mod compliance;
pub mod returns;

pub use compliance::{
    analyze_portfolio, generate_gips_report, validate_gips_compliance, ComplianceLevel,
    GipsCalculationResult, GipsReport, ReturnCalculationMethod,
};
pub use returns::{
    calculate_composite_return, calculate_modified_dietz_return, calculate_money_weighted_return,
    calculate_time_weighted_return, CompositeMethod, CompositeOutput, DietzOutput, MwrOutput,
    PortfolioReturn, TwrOutput,
};
