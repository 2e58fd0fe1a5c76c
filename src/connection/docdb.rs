//! # DocumentDB Connection
//!
//! Connects the render manager to a managed DocumentDB cluster using a
//! username/password login secret.

use super::{require_linux, ConnectionError, DatabaseConnector, CONNECT_OPERATION, INSTALL_OPERATION};
use crate::constants::{
    CONNECTION_ARGS_FUNCTION, ENV_DB_CREDENTIALS_URI, INSTALLER_ARGS_ARRAY,
    INSTALLER_ARGS_FUNCTION, SUPPORTED_DOCDB_VERSIONS,
};
use crate::context::BuildContext;
use crate::database::DocDbClusterRef;
use crate::graph::{
    find_resource_by_role, GrantTarget, GraphError, IngressRule, Port, Principal, ResourceId,
    ResourceKind, SecretRef, SecurityGroupRef,
};
use crate::host::Host;
use crate::observability::metrics;
use crate::script::{associative_array_assignment, shell_quote, SecureFunction};
use crate::validation::is_supported_docdb_version;
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct DocDbConnectionOptions {
    pub database: DocDbClusterRef,
    /// JSON `{"username": ..., "password": ...}`
    pub login: SecretRef,
}

#[derive(Debug, Clone)]
pub struct DocDbConnection {
    options: DocDbConnectionOptions,
    container_environment: BTreeMap<String, String>,
}

impl DocDbConnection {
    /// Build the connection, annotating the cluster if its engine version is unsupported
    pub fn new(ctx: &mut BuildContext, options: DocDbConnectionOptions) -> Self {
        let container_environment = BTreeMap::from([(
            ENV_DB_CREDENTIALS_URI.to_string(),
            options.login.arn.clone(),
        )]);
        let connection = Self {
            options,
            container_environment,
        };

        if !connection.is_compatible_docdb_version(ctx) {
            let path = ctx.graph().path(connection.options.database.construct).to_string();
            ctx.diagnostics_mut().add_warning(
                &path,
                format!(
                    "engineVersion must be one of {}.x to be compatible with the render manager",
                    SUPPORTED_DOCDB_VERSIONS.join(".x, ")
                ),
            );
        }
        connection
    }

    #[must_use]
    pub fn options(&self) -> &DocDbConnectionOptions {
        &self.options
    }

    /// Whether the cluster runs a supported engine version
    ///
    /// Imported clusters cannot be inspected and are assumed compatible. A
    /// provisioned cluster with no explicit version is not.
    #[must_use]
    pub fn is_compatible_docdb_version(&self, ctx: &BuildContext) -> bool {
        let graph = ctx.graph();
        let Some(resource) = self.options.database.underlying_resource(graph) else {
            return true;
        };
        match graph.get(resource).map(|node| &node.kind) {
            Ok(ResourceKind::DocDbCluster {
                engine_version: Some(version),
                ..
            }) => is_supported_docdb_version(version),
            _ => false,
        }
    }

    fn secure_function<'a>(&self, ctx: &'a BuildContext, name: &'static str) -> SecureFunction<'a> {
        SecureFunction::new(name, ctx.settings())
            .fetch_secret_string("SECRET_STRING", &self.options.login, true)
            .extract_field("DB_USERNAME", "SECRET_STRING", "username")
            .extract_field("DB_PASSWORD", "SECRET_STRING", "password")
            .unset(&["SECRET_STRING"])
    }

    fn attach_security_groups(
        &self,
        ctx: &mut BuildContext,
        groups: &[SecurityGroupRef],
    ) -> Result<(), String> {
        if self.options.database.imported {
            return Err(
                "The database was imported by reference rather than provisioned here, so its underlying cluster is not accessible."
                    .to_string(),
            );
        }
        let graph = ctx.graph_mut();
        let resource = self
            .options
            .database
            .underlying_resource(graph)
            .ok_or_else(|| "The internal structure of the DocumentDB cluster has changed (no underlying resource).".to_string())?;
        let node = graph.get_mut(resource).map_err(|e| e.to_string())?;
        match &mut node.kind {
            ResourceKind::DocDbCluster {
                vpc_security_group_ids,
                ..
            } => {
                vpc_security_group_ids
                    .get_or_insert_with(Vec::new)
                    .extend(groups.iter().map(|g| g.group_id.clone()));
                Ok(())
            }
            other => Err(format!(
                "The internal structure of the DocumentDB cluster has changed (underlying resource is a {}).",
                other.kind_name()
            )),
        }
    }
}

impl DatabaseConnector for DocDbConnection {
    fn container_environment(&self) -> &BTreeMap<String, String> {
        &self.container_environment
    }

    fn database_construct(&self) -> Option<ResourceId> {
        (!self.options.database.imported).then_some(self.options.database.construct)
    }

    fn allow_connections_from(
        &self,
        ctx: &mut BuildContext,
        peer: ResourceId,
    ) -> Result<(), ConnectionError> {
        ctx.graph_mut().add_ingress_rule(IngressRule {
            source: peer,
            target: self.options.database.construct,
            port: Port::tcp(self.options.database.endpoint.port),
        })?;
        Ok(())
    }

    fn installer_db_args_script(
        &self,
        ctx: &mut BuildContext,
        host: &Host,
    ) -> Result<Vec<String>, ConnectionError> {
        require_linux(host, INSTALL_OPERATION)?;
        let endpoint = &self.options.database.endpoint;
        let args = associative_array_assignment(
            INSTALLER_ARGS_ARRAY,
            &[
                ("--dbuser", "$DB_USERNAME".to_string()),
                ("--dbpassword", "$DB_PASSWORD".to_string()),
                ("--dbhost", shell_quote(&endpoint.hostname)),
                ("--dbport", endpoint.port.to_string()),
                ("--dbtype", "DocumentDB".to_string()),
            ],
        );
        Ok(self
            .secure_function(ctx, INSTALLER_ARGS_FUNCTION)
            .command(args)
            .unset(&["DB_USERNAME", "DB_PASSWORD"])
            .build())
    }

    fn connection_db_args_script(
        &self,
        ctx: &mut BuildContext,
        host: &Host,
    ) -> Result<Vec<String>, ConnectionError> {
        require_linux(host, CONNECT_OPERATION)?;
        let store_credentials = format!(
            "sudo -u {} \"${{deadlinecommand}}\" -StoreDatabasecredentials \"${{DB_USERNAME}}\" \"${{DB_PASSWORD}}\"",
            ctx.settings().deadline_service_user
        );
        Ok(self
            .secure_function(ctx, CONNECTION_ARGS_FUNCTION)
            .command(store_credentials)
            .unset(&["DB_USERNAME", "DB_PASSWORD"])
            .build())
    }

    fn grant_read(&self, ctx: &mut BuildContext, principal: &Principal) {
        ctx.graph_mut().grant_read(
            principal,
            GrantTarget::Secret {
                arn: self.options.login.arn.clone(),
            },
        );
    }

    fn add_child_dependency(
        &self,
        ctx: &mut BuildContext,
        resource: ResourceId,
    ) -> Result<(), ConnectionError> {
        // The cluster itself does not serve data; its instances do.
        let cluster = &self.options.database;
        let graph = ctx.graph_mut();
        match find_resource_by_role(graph, cluster.construct, DocDbClusterRef::first_instance_role())
        {
            Ok(instance) => {
                if graph.add_dependency(resource, instance)? {
                    metrics::increment_dependency_edges();
                    info!(
                        dependent = %graph.path(resource),
                        dependency = %graph.path(instance),
                        "Added dependency on DocumentDB instance"
                    );
                }
                Ok(())
            }
            Err(GraphError::NotFound { parent, role }) => {
                if cluster.underlying_resource(graph).is_some() {
                    Err(ConnectionError::InternalStructureChanged {
                        construct: parent,
                        detail: format!("no child named '{role}'"),
                    })
                } else {
                    debug!(
                        cluster = %parent,
                        "DocumentDB cluster was imported, no instance to depend on"
                    );
                    Ok(())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn add_security_group(
        &self,
        ctx: &mut BuildContext,
        groups: &[SecurityGroupRef],
    ) -> Result<(), ConnectionError> {
        match self.attach_security_groups(ctx, groups) {
            Ok(()) => {
                metrics::increment_security_groups_attached("docdb", groups.len());
            }
            Err(reason) => {
                let path = ctx.graph().path(self.options.database.construct).to_string();
                let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
                ctx.diagnostics_mut().add_warning(
                    &path,
                    format!(
                        "Failed to add the following security groups to {path}: {}. {reason}",
                        names.join(", ")
                    ),
                );
            }
        }
        Ok(())
    }
}
