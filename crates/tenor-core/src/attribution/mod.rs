//! Brinson-Hood-Beebower sector attribution.

pub mod brinson;

pub use brinson::{brinson_attribution, BrinsonOutput, SectorAttribution, SectorExposure};
