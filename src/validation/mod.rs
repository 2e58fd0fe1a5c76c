//! # Validation
//!
//! Validates identifiers and versions before they reach the graph or the
//! generated shell text.

mod aws;
mod engine;

pub use aws::{parse_secret_arn, validate_aws_region, ParsedSecretArn};
pub use engine::is_supported_docdb_version;
