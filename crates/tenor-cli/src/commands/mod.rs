pub mod attribution;
pub mod gips;
pub mod risk;
pub mod rolling;
