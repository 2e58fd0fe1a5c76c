//! # Observability
//!
//! - `logging`: tracing subscriber setup
//! - `metrics`: Prometheus counters for generated configuration

pub mod logging;
pub mod metrics;

use crate::config::Settings;

/// Install logging and, when `ENABLE_METRICS` is on, register metrics
///
/// Call once per process; registering metrics a second time fails.
pub fn init(settings: &Settings) -> anyhow::Result<()> {
    logging::init(settings);
    if settings.enable_metrics {
        metrics::register_metrics()?;
    }
    Ok(())
}
