//! # Database Connection
//!
//! The contract every call site uses to wire the render manager to its
//! database, independent of which backend was chosen.
//!
//! Each backend implements [`DatabaseConnector`]; [`DatabaseConnection`] is the
//! closed set of backends and dispatches to whichever one was selected.

mod docdb;
mod error;
mod mongo;

pub use docdb::{DocDbConnection, DocDbConnectionOptions};
pub use error::ConnectionError;
pub use mongo::{MongoDbInstanceConnection, MongoDbInstanceConnectionOptions};

use crate::context::BuildContext;
use crate::graph::{Principal, ResourceId, SecurityGroupRef};
use crate::host::{Host, OsKind};
use std::collections::BTreeMap;

/// Operations shared by every database backend
pub trait DatabaseConnector {
    /// Environment variables a service container needs to reach the database
    fn container_environment(&self) -> &BTreeMap<String, String>;

    /// Construct owning the database, absent when it was imported
    fn database_construct(&self) -> Option<ResourceId>;

    /// Allow `peer` to reach the database port
    fn allow_connections_from(
        &self,
        ctx: &mut BuildContext,
        peer: ResourceId,
    ) -> Result<(), ConnectionError>;

    /// Commands defining `configure_database_installation_args` on `host`
    fn installer_db_args_script(
        &self,
        ctx: &mut BuildContext,
        host: &Host,
    ) -> Result<Vec<String>, ConnectionError>;

    /// Commands defining `configure_deadline_database` on `host`
    fn connection_db_args_script(
        &self,
        ctx: &mut BuildContext,
        host: &Host,
    ) -> Result<Vec<String>, ConnectionError>;

    /// Grant `principal` read access to every secret this backend uses
    fn grant_read(&self, ctx: &mut BuildContext, principal: &Principal);

    /// Make `resource` deploy after the resource that actually serves data
    fn add_child_dependency(
        &self,
        ctx: &mut BuildContext,
        resource: ResourceId,
    ) -> Result<(), ConnectionError>;

    /// Attach security groups to the database
    fn add_security_group(
        &self,
        ctx: &mut BuildContext,
        groups: &[SecurityGroupRef],
    ) -> Result<(), ConnectionError>;

    /// Append the installer function to the host's user data
    fn add_installer_db_args(
        &self,
        ctx: &mut BuildContext,
        host: &mut Host,
    ) -> Result<(), ConnectionError> {
        let commands = self.installer_db_args_script(ctx, host)?;
        host.user_data_mut().add_commands(commands);
        Ok(())
    }

    /// Append the runtime connection function to the host's user data
    fn add_connection_db_args(
        &self,
        ctx: &mut BuildContext,
        host: &mut Host,
    ) -> Result<(), ConnectionError> {
        let commands = self.connection_db_args_script(ctx, host)?;
        host.user_data_mut().add_commands(commands);
        Ok(())
    }
}

/// Input to [`DatabaseConnection::new`]
#[derive(Debug, Clone)]
pub enum ConnectionOptions {
    DocDb(DocDbConnectionOptions),
    MongoDbInstance(MongoDbInstanceConnectionOptions),
}

/// A connection to whichever backend was selected
#[derive(Debug, Clone)]
pub enum DatabaseConnection {
    DocDb(DocDbConnection),
    MongoDbInstance(MongoDbInstanceConnection),
}

impl DatabaseConnection {
    /// Select the backend from `options`
    pub fn new(ctx: &mut BuildContext, options: ConnectionOptions) -> Self {
        match options {
            ConnectionOptions::DocDb(options) => Self::for_doc_db(ctx, options),
            ConnectionOptions::MongoDbInstance(options) => Self::for_mongo_db_instance(options),
        }
    }

    /// Connection backed by a DocumentDB cluster
    pub fn for_doc_db(ctx: &mut BuildContext, options: DocDbConnectionOptions) -> Self {
        Self::DocDb(DocDbConnection::new(ctx, options))
    }

    /// Connection backed by a self-managed MongoDB instance
    #[must_use]
    pub fn for_mongo_db_instance(options: MongoDbInstanceConnectionOptions) -> Self {
        Self::MongoDbInstance(MongoDbInstanceConnection::new(options))
    }

    /// Backend label used in logs and metrics
    #[must_use]
    pub fn backend(&self) -> &'static str {
        match self {
            DatabaseConnection::DocDb(_) => "docdb",
            DatabaseConnection::MongoDbInstance(_) => "mongodb",
        }
    }

    fn inner(&self) -> &dyn DatabaseConnector {
        match self {
            DatabaseConnection::DocDb(connection) => connection,
            DatabaseConnection::MongoDbInstance(connection) => connection,
        }
    }
}

impl DatabaseConnector for DatabaseConnection {
    fn container_environment(&self) -> &BTreeMap<String, String> {
        self.inner().container_environment()
    }

    fn database_construct(&self) -> Option<ResourceId> {
        self.inner().database_construct()
    }

    fn allow_connections_from(
        &self,
        ctx: &mut BuildContext,
        peer: ResourceId,
    ) -> Result<(), ConnectionError> {
        self.inner().allow_connections_from(ctx, peer)
    }

    fn installer_db_args_script(
        &self,
        ctx: &mut BuildContext,
        host: &Host,
    ) -> Result<Vec<String>, ConnectionError> {
        self.inner().installer_db_args_script(ctx, host)
    }

    fn connection_db_args_script(
        &self,
        ctx: &mut BuildContext,
        host: &Host,
    ) -> Result<Vec<String>, ConnectionError> {
        self.inner().connection_db_args_script(ctx, host)
    }

    fn grant_read(&self, ctx: &mut BuildContext, principal: &Principal) {
        self.inner().grant_read(ctx, principal);
    }

    fn add_child_dependency(
        &self,
        ctx: &mut BuildContext,
        resource: ResourceId,
    ) -> Result<(), ConnectionError> {
        self.inner().add_child_dependency(ctx, resource)
    }

    fn add_security_group(
        &self,
        ctx: &mut BuildContext,
        groups: &[SecurityGroupRef],
    ) -> Result<(), ConnectionError> {
        self.inner().add_security_group(ctx, groups)
    }
}

/// Fail unless `host` runs Linux
///
/// Called before anything is generated, so a rejected host gets no commands.
pub(crate) fn require_linux(host: &Host, operation: &'static str) -> Result<(), ConnectionError> {
    if host.os == OsKind::Linux {
        Ok(())
    } else {
        Err(ConnectionError::UnsupportedHostOs {
            operation,
            os: host.os,
        })
    }
}

pub(crate) const INSTALL_OPERATION: &str = "Installing the render manager";
pub(crate) const CONNECT_OPERATION: &str = "Connecting to the render manager database";
