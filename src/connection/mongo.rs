//! # MongoDB Instance Connection
//!
//! Connects the render manager to a self-managed MongoDB instance over TLS
//! with client certificate authentication.

use super::{require_linux, ConnectionError, DatabaseConnector, CONNECT_OPERATION, INSTALL_OPERATION};
use crate::constants::{
    CONNECTION_ARGS_FUNCTION, DB_CERT_FILE_VAR, DB_CERT_PASSWORD_VAR,
    ENV_DB_TLS_CLIENT_CERT_PASSWORD_URI, ENV_DB_TLS_CLIENT_CERT_URI, INSTALLER_ARGS_ARRAY,
    INSTALLER_ARGS_FUNCTION, MONGO_CERT_LOCATION,
};
use crate::context::BuildContext;
use crate::database::MongoDbInstanceRef;
use crate::graph::{
    CertificateRef, GrantTarget, GraphError, IngressRule, Port, Principal, ResourceId,
    SecurityGroupRef,
};
use crate::host::Host;
use crate::observability::metrics;
use crate::script::{associative_array_assignment, shell_quote, SecureFunction};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct MongoDbInstanceConnectionOptions {
    pub database: MongoDbInstanceRef,
    pub client_certificate: CertificateRef,
}

#[derive(Debug, Clone)]
pub struct MongoDbInstanceConnection {
    options: MongoDbInstanceConnectionOptions,
    container_environment: BTreeMap<String, String>,
}

impl MongoDbInstanceConnection {
    #[must_use]
    pub fn new(options: MongoDbInstanceConnectionOptions) -> Self {
        let container_environment = BTreeMap::from([
            (
                ENV_DB_TLS_CLIENT_CERT_URI.to_string(),
                options.client_certificate.cert.arn.clone(),
            ),
            (
                ENV_DB_TLS_CLIENT_CERT_PASSWORD_URI.to_string(),
                options.client_certificate.passphrase.arn.clone(),
            ),
        ]);
        Self {
            options,
            container_environment,
        }
    }

    #[must_use]
    pub fn options(&self) -> &MongoDbInstanceConnectionOptions {
        &self.options
    }

    /// Commands that write the client certificate to [`MONGO_CERT_LOCATION`]
    fn download_certificate(
        &self,
        ctx: &mut BuildContext,
        host: &Host,
    ) -> Result<Vec<String>, ConnectionError> {
        let asset = ctx.get_secret_to_file_asset(host.os)?;
        let settings = ctx.settings().clone();
        Ok(asset.execute_on(
            ctx.graph_mut(),
            &settings,
            host,
            &[
                self.options.client_certificate.cert.arn.as_str(),
                MONGO_CERT_LOCATION,
            ],
        ))
    }
}

impl DatabaseConnector for MongoDbInstanceConnection {
    fn container_environment(&self) -> &BTreeMap<String, String> {
        &self.container_environment
    }

    fn database_construct(&self) -> Option<ResourceId> {
        self.options
            .database
            .server
            .map(|_| self.options.database.construct)
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
        let mut lines = self.download_certificate(ctx, host)?;

        let endpoint = &self.options.database.endpoint;
        let args = associative_array_assignment(
            INSTALLER_ARGS_ARRAY,
            &[
                ("--dbssl", "true".to_string()),
                ("--dbauth", "true".to_string()),
                ("--dbsslauth", "true".to_string()),
                ("--dbhost", shell_quote(&endpoint.hostname)),
                ("--dbport", endpoint.port.to_string()),
                ("--dbclientcert", shell_quote(MONGO_CERT_LOCATION)),
                ("--dbcertpass", "$CERT_PASSWORD".to_string()),
            ],
        );
        lines.extend(
            SecureFunction::new(INSTALLER_ARGS_FUNCTION, ctx.settings())
                .fetch_secret_string("CERT_PASSWORD", &self.options.client_certificate.passphrase, false)
                .command(args)
                .unset(&["CERT_PASSWORD"])
                .build(),
        );
        Ok(lines)
    }

    fn connection_db_args_script(
        &self,
        ctx: &mut BuildContext,
        host: &Host,
    ) -> Result<Vec<String>, ConnectionError> {
        require_linux(host, CONNECT_OPERATION)?;
        let mut lines = self.download_certificate(ctx, host)?;

        // DB_CERT_PASSWORD stays exported for the render manager to read later
        lines.extend(
            SecureFunction::new(CONNECTION_ARGS_FUNCTION, ctx.settings())
                .command(format!(
                    "export {DB_CERT_FILE_VAR}={}",
                    shell_quote(MONGO_CERT_LOCATION)
                ))
                .fetch_secret_string(
                    DB_CERT_PASSWORD_VAR,
                    &self.options.client_certificate.passphrase,
                    true,
                )
                .build(),
        );
        Ok(lines)
    }

    fn grant_read(&self, ctx: &mut BuildContext, principal: &Principal) {
        let certificate = &self.options.client_certificate;
        for secret in [&certificate.cert, &certificate.passphrase] {
            ctx.graph_mut().grant_read(
                principal,
                GrantTarget::Secret {
                    arn: secret.arn.clone(),
                },
            );
        }
    }

    fn add_child_dependency(
        &self,
        ctx: &mut BuildContext,
        resource: ResourceId,
    ) -> Result<(), ConnectionError> {
        let graph = ctx.graph_mut();
        let compute = self
            .options
            .database
            .compute_resource(graph)
            .map_err(structure_changed)?;

        match compute {
            Some(asg) => {
                if graph.add_dependency(resource, asg)? {
                    metrics::increment_dependency_edges();
                    info!(
                        dependent = %graph.path(resource),
                        dependency = %graph.path(asg),
                        "Added dependency on MongoDB server"
                    );
                }
            }
            None => debug!(
                instance = %graph.path(self.options.database.construct),
                "MongoDB instance was imported, no server to depend on"
            ),
        }
        Ok(())
    }

    fn add_security_group(
        &self,
        ctx: &mut BuildContext,
        groups: &[SecurityGroupRef],
    ) -> Result<(), ConnectionError> {
        let (graph, diagnostics) = ctx.graph_and_diagnostics();
        self.options
            .database
            .add_security_group(graph, diagnostics, groups)
            .map_err(structure_changed)?;
        if self.options.database.server.is_some() {
            metrics::increment_security_groups_attached("mongodb", groups.len());
        }
        Ok(())
    }
}

/// A missing server child means the instance construct was rearranged
fn structure_changed(err: GraphError) -> ConnectionError {
    match err {
        GraphError::NotFound { parent, role } => ConnectionError::InternalStructureChanged {
            construct: parent,
            detail: format!("no child named '{role}'"),
        },
        other => other.into(),
    }
}
