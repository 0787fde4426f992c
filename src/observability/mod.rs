//! Observability module
//!
//! Logging and metrics for the markdown transform and the map
//! initializer.

pub mod logging;
pub mod metrics;

pub use logging::{LogFormat, LogSettings, init_logging};
pub use metrics::init_metrics;
