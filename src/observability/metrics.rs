//! # Metrics
//!
//! Prometheus metrics describing what a configuration run generated.
//!
//! ## Metrics Exposed
//!
//! - `render_db_connection_scripts_generated_total` - Shell functions generated, by function name
//! - `render_db_connection_dependency_edges_total` - Deploy-after edges added
//! - `render_db_connection_security_groups_attached_total` - Security groups attached, by backend
//! - `render_db_connection_diagnostics_total` - Annotations recorded, by severity
//! - `render_db_connection_script_asset_cache_hits_total` - Certificate download asset reuses

use anyhow::Result;
use prometheus::{Encoder, IntCounter, IntCounterVec, Registry, TextEncoder};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static SCRIPTS_GENERATED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "render_db_connection_scripts_generated_total",
            "Total number of shell functions generated by function name",
        ),
        &["function"],
    )
    .expect("Failed to create SCRIPTS_GENERATED_TOTAL metric - this should never happen")
});

static DEPENDENCY_EDGES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "render_db_connection_dependency_edges_total",
        "Total number of deploy-after dependency edges added",
    )
    .expect("Failed to create DEPENDENCY_EDGES_TOTAL metric - this should never happen")
});

static SECURITY_GROUPS_ATTACHED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "render_db_connection_security_groups_attached_total",
            "Total number of security groups attached by database backend",
        ),
        &["backend"],
    )
    .expect("Failed to create SECURITY_GROUPS_ATTACHED_TOTAL metric - this should never happen")
});

static DIAGNOSTICS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "render_db_connection_diagnostics_total",
            "Total number of annotations recorded by severity",
        ),
        &["severity"],
    )
    .expect("Failed to create DIAGNOSTICS_TOTAL metric - this should never happen")
});

static SCRIPT_ASSET_CACHE_HITS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "render_db_connection_script_asset_cache_hits_total",
        "Total number of times a cached certificate download asset was reused",
    )
    .expect("Failed to create SCRIPT_ASSET_CACHE_HITS_TOTAL metric - this should never happen")
});

/// Register every metric with the crate registry
///
/// Fails if called twice.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(SCRIPTS_GENERATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DEPENDENCY_EDGES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SECURITY_GROUPS_ATTACHED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(DIAGNOSTICS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SCRIPT_ASSET_CACHE_HITS_TOTAL.clone()))?;
    Ok(())
}

/// Text exposition of everything in the crate registry
pub fn gather_metrics() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn increment_scripts_generated(function: &str) {
    SCRIPTS_GENERATED_TOTAL.with_label_values(&[function]).inc();
}

pub fn increment_dependency_edges() {
    DEPENDENCY_EDGES_TOTAL.inc();
}

pub fn increment_security_groups_attached(backend: &str, count: usize) {
    SECURITY_GROUPS_ATTACHED_TOTAL
        .with_label_values(&[backend])
        .inc_by(u64::try_from(count).unwrap_or(u64::MAX));
}

pub fn increment_diagnostics(severity: &str) {
    DIAGNOSTICS_TOTAL.with_label_values(&[severity]).inc();
}

pub fn increment_script_asset_cache_hits() {
    SCRIPT_ASSET_CACHE_HITS_TOTAL.inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increase() {
        let before = DEPENDENCY_EDGES_TOTAL.get();
        increment_dependency_edges();
        assert!(DEPENDENCY_EDGES_TOTAL.get() > before);

        let before = SCRIPTS_GENERATED_TOTAL
            .with_label_values(&["configure_deadline_database"])
            .get();
        increment_scripts_generated("configure_deadline_database");
        assert!(
            SCRIPTS_GENERATED_TOTAL
                .with_label_values(&["configure_deadline_database"])
                .get()
                > before
        );
    }

    #[test]
    fn test_register_and_gather() {
        // A second registration from another test would fail; tolerate it
        let _ = register_metrics();
        increment_script_asset_cache_hits();
        let text = gather_metrics().unwrap();
        assert!(text.contains("render_db_connection_script_asset_cache_hits_total"));
    }
}
