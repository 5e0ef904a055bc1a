pub mod config;
pub mod performance;

pub use config::ConfigClient;
pub use performance::{PerformanceClient, report_base_from_start};
