//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ## Usage
//!
//! ```rust
//! use render_db_connection::prelude::*;
//! ```
//!
//! This brings into scope:
//! - The connection trait and both backends
//! - Build context and settings
//! - Graph handles (resources, secrets, principals, security groups)
//! - Host types and the database manifest

// Connection contract - most commonly used
pub use crate::connection::{
    ConnectionError, ConnectionOptions, DatabaseConnection, DatabaseConnector, DocDbConnection,
    DocDbConnectionOptions, MongoDbInstanceConnection, MongoDbInstanceConnectionOptions,
};

// Build state
pub use crate::config::Settings;
pub use crate::context::{BuildContext, Synthesis};
pub use crate::diagnostics::{Annotation, Diagnostics, Severity};

// Database constructs
pub use crate::database::{DocDbClusterProps, DocDbClusterRef, MongoDbInstanceRef};

// Graph handles
pub use crate::graph::{
    CertificateRef, Endpoint, GraphError, Principal, ResourceGraph, ResourceId, ResourceKind,
    SecretRef, SecurityGroupRef,
};

// Hosts
pub use crate::host::{Host, OsKind, ScriptAsset};

// Declarative input
pub use crate::manifest::DatabaseManifest;
