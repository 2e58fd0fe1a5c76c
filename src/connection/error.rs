//! # Connection Errors

use crate::graph::GraphError;
use crate::host::OsKind;
use thiserror::Error;

/// Fatal, caller-visible failure of a connection operation
///
/// Non-fatal findings are annotations, see [`crate::diagnostics`].
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The operation only generates bash and the host is not Linux
    #[error("{operation} is only supported on Linux hosts, not {os}")]
    UnsupportedHostOs {
        operation: &'static str,
        os: OsKind,
    },

    /// An ordering guarantee cannot be honoured because a construct no longer
    /// has the children it used to
    #[error("The internal structure of '{construct}' has changed ({detail}). Update to a release of render-db-connection that supports it.")]
    InternalStructureChanged { construct: String, detail: String },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Invalid database manifest: {0:#}")]
    InvalidManifest(#[from] anyhow::Error),
}
