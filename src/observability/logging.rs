//! # Logging
//!
//! Installs the `tracing` subscriber used by every module of the crate.

use crate::config::Settings;
use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber filtered by `RUST_LOG`, falling back to
/// `LOG_LEVEL` from `settings`
///
/// Returns `false` when a global subscriber was already installed.
pub fn init(settings: &Settings) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| settings.log_filter().into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(settings.log_enable_color)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let settings = Settings::default();
        init(&settings);
        assert!(!init(&settings));
    }
}
