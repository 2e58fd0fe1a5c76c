//! # Database Backends
//!
//! How each backend appears in the resource graph, either provisioned by this
//! configuration run or imported by reference.
//!
//! - `docdb.rs` - Managed DocumentDB cluster
//! - `mongo.rs` - Self-managed MongoDB instance on an autoscaling group

mod docdb;
mod mongo;

pub use docdb::{DocDbClusterProps, DocDbClusterRef};
pub use mongo::MongoDbInstanceRef;
