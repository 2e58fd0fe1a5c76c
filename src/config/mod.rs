//! # Configuration
//!
//! Process-level settings for script generation and observability.

mod settings;

pub use settings::Settings;
