pub mod breakdown;
pub mod config_validation;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod report;
pub mod rounding;
pub mod trade;
