//! Render Farm Database Connection Library
//!
//! Wires a render manager to its database at configuration time. Two
//! backends are supported: a managed DocumentDB cluster and a self-managed
//! MongoDB instance with client certificate authentication. Each backend
//! generates the boot shell functions hosts use to fetch credentials, and
//! records dependency edges, ingress rules, read grants and security groups
//! in an in-memory resource graph.
//!
//! ## Quick Start
//!
//! ```rust
//! use render_db_connection::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific imports,
//! use the individual modules.

pub mod config;
pub mod connection;
pub mod constants;
pub mod context;
pub mod database;
pub mod diagnostics;
pub mod graph;
pub mod host;
pub mod manifest;
pub mod observability;
pub mod prelude;
pub mod script;
pub mod validation;
