//! # Engine Version Validation

use crate::constants::SUPPORTED_DOCDB_VERSIONS;

/// Whether a DocumentDB engine version is one the render manager supports
///
/// Accepts a supported `major.minor`, optionally followed by a numeric patch
/// (`3.6`, `3.6.0`, `4.0.12`). `3.60` or `5.0-beta` do not match.
#[must_use]
pub fn is_supported_docdb_version(version: &str) -> bool {
    let version = version.trim();
    SUPPORTED_DOCDB_VERSIONS.iter().any(|supported| {
        version
            .strip_prefix(supported)
            .is_some_and(|rest| match rest.strip_prefix('.') {
                None => rest.is_empty(),
                Some(patch) => !patch.is_empty() && patch.chars().all(|c| c.is_ascii_digit()),
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_versions() {
        for version in ["3.6", "3.6.0", "4.0", "4.0.0", "4.0.12", "5.0.0"] {
            assert!(is_supported_docdb_version(version), "{version} should be supported");
        }
    }

    #[test]
    fn test_unsupported_versions() {
        for version in ["", "3", "3.5.0", "3.60", "3.6.", "3.6.x", "6.0.0", "5.0-beta", "10.0"] {
            assert!(
                !is_supported_docdb_version(version),
                "{version} should not be supported"
            );
        }
    }
}
