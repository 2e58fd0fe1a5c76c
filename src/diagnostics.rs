//! # Diagnostics
//!
//! Non-fatal findings attached to graph resources.
//!
//! An annotation never stops graph construction. Warnings mark configurations
//! that deploy but are degraded, such as an unsupported engine version or
//! security groups that could not be attached.

use crate::observability::metrics;
use serde::Serialize;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
}

impl Severity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic attached to the resource at `path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

/// Annotations collected during one configuration run
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    annotations: Vec<Annotation>,
}

impl Diagnostics {
    pub fn add_warning(&mut self, path: &str, message: impl Into<String>) {
        let message = message.into();
        let severity = Severity::Warning;
        warn!(resource.path = %path, "{}", message);
        metrics::increment_diagnostics(severity.as_str());
        self.annotations.push(Annotation {
            severity,
            path: path.to_string(),
            message,
        });
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(|a| a.severity == Severity::Warning)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_recorded_in_order() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.add_warning("Stack/Db", "degraded");
        diagnostics.add_warning("Stack/Other", "no security groups");

        assert_eq!(diagnostics.len(), 2);
        let warnings: Vec<_> = diagnostics.warnings().collect();
        assert_eq!(warnings[0].path, "Stack/Db");
        assert_eq!(warnings[0].severity, Severity::Warning);
        assert_eq!(warnings[1].message, "no security groups");
    }
}
