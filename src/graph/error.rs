//! # Graph Errors

use thiserror::Error;

/// Failure of a query or mutation against the resource graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// No resource with this id was ever added to the graph
    #[error("unknown resource id {0}")]
    UnknownResource(usize),

    /// A lookup by conventional child name found nothing
    #[error("no child named '{role}' under '{parent}'")]
    NotFound { parent: String, role: String },

    /// A child with the same name already exists under the parent
    #[error("'{parent}' already has a child named '{name}'")]
    DuplicateChild { parent: String, name: String },

    /// The resource exists but is not of the kind the caller relies on
    #[error("resource '{path}' is a {found}, expected a {expected}")]
    UnexpectedKind {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}
