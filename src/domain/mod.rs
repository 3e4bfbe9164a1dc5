//! Trade model and the analytics computed over it.

pub mod analytics;
pub mod breakdown;
pub mod coaching;
pub mod error;
pub mod filter;
pub mod goals;
pub mod mock;
pub mod pnl_series;
pub mod r_multiple;
pub mod rolling;
pub mod settings;
pub mod time_performance;
pub mod trade;
