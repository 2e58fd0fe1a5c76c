//! # Database Manifest
//!
//! Declarative YAML or JSON description of the render manager database.
//!
//! ```yaml
//! type: mongoDbInstance   # optional
//! mongoDbInstance:
//!   name: Mongo
//!   endpoint:
//!     hostname: mongo.renderfarm.local
//!   clientCertificate:
//!     cert:
//!       arn: arn:aws:secretsmanager:us-west-2:123456789012:secret:cert-AbCdEf
//!     passphrase:
//!       arn: arn:aws:secretsmanager:us-west-2:123456789012:secret:pass-AbCdEf
//! ```

mod types;

pub use types::{
    CertificateManifest, DatabaseManifest, DocDbManifest, EndpointManifest,
    MongoDbInstanceManifest, SecretManifest,
};

use crate::connection::{
    ConnectionError, DatabaseConnection, DocDbConnectionOptions, MongoDbInstanceConnectionOptions,
};
use crate::constants::MAX_DOCDB_INSTANCES;
use crate::context::BuildContext;
use crate::database::{DocDbClusterProps, DocDbClusterRef, MongoDbInstanceRef};
use crate::graph::{CertificateRef, Endpoint, ResourceId, SecretRef};
use crate::validation::{parse_secret_arn, validate_aws_region};
use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Parse a manifest from YAML (JSON is accepted as a YAML subset)
pub fn from_yaml_str(content: &str) -> Result<DatabaseManifest> {
    let manifest: DatabaseManifest =
        serde_yaml::from_str(content).context("Failed to parse database manifest")?;
    manifest.validate()?;
    Ok(manifest)
}

/// Read and parse a manifest file
pub fn from_path(path: &Path) -> Result<DatabaseManifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read database manifest {}", path.display()))?;
    from_yaml_str(&content).with_context(|| format!("Invalid manifest {}", path.display()))
}

/// JSON schema of [`DatabaseManifest`]
#[must_use]
pub fn json_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(DatabaseManifest))
        .unwrap_or_else(|_| serde_json::json!({}))
}

impl DatabaseManifest {
    /// Check everything serde cannot: ARN shapes, regions, endpoint and counts
    pub fn validate(&self) -> Result<()> {
        match self {
            DatabaseManifest::DocDb(docdb) => {
                validate_name(&docdb.name)?;
                validate_endpoint(&docdb.endpoint)?;
                validate_secret(&docdb.login).context("docDb.login")?;
                if docdb.instances == 0 {
                    bail!("docDb.instances must be at least 1");
                }
                if docdb.instances > MAX_DOCDB_INSTANCES {
                    bail!(
                        "docDb.instances must be at most {MAX_DOCDB_INSTANCES}, got {}",
                        docdb.instances
                    );
                }
                if docdb.import && docdb.engine_version.is_some() {
                    warn!(
                        cluster = %docdb.name,
                        "engineVersion is ignored for an imported cluster"
                    );
                }
            }
            DatabaseManifest::MongoDbInstance(mongo) => {
                validate_name(&mongo.name)?;
                validate_endpoint(&mongo.endpoint)?;
                validate_secret(&mongo.client_certificate.cert)
                    .context("mongoDbInstance.clientCertificate.cert")?;
                validate_secret(&mongo.client_certificate.passphrase)
                    .context("mongoDbInstance.clientCertificate.passphrase")?;
            }
        }
        Ok(())
    }
}

impl SecretManifest {
    /// Resolve to a [`SecretRef`], taking the region from the ARN when unset
    pub fn to_secret_ref(&self) -> Result<SecretRef> {
        match &self.region {
            Some(region) => SecretRef::new(self.arn.as_str(), region.as_str()),
            None => SecretRef::from_arn(self.arn.as_str()),
        }
    }
}

impl EndpointManifest {
    fn to_endpoint(&self, default_port: u16) -> Endpoint {
        Endpoint::new(self.hostname.as_str(), self.port.unwrap_or(default_port))
    }
}

impl BuildContext {
    /// Provision or import the database described by `manifest` under `parent`
    /// and return a connection to it
    pub fn declare_database(
        &mut self,
        parent: Option<ResourceId>,
        manifest: &DatabaseManifest,
    ) -> Result<DatabaseConnection, ConnectionError> {
        manifest.validate()?;

        let connection = match manifest {
            DatabaseManifest::DocDb(docdb) => {
                let login = docdb.login.to_secret_ref()?;
                let endpoint = docdb.endpoint.to_endpoint(docdb.port());
                let database = if docdb.import {
                    DocDbClusterRef::import(self.graph_mut(), parent, &docdb.name, endpoint)?
                } else {
                    let props = DocDbClusterProps {
                        endpoint,
                        engine_version: docdb.engine_version.clone(),
                        instances: docdb.instances,
                        instance_class: docdb.instance_class.clone(),
                    };
                    DocDbClusterRef::provision(self.graph_mut(), parent, &docdb.name, &props)?
                };
                DatabaseConnection::for_doc_db(self, DocDbConnectionOptions { database, login })
            }
            DatabaseManifest::MongoDbInstance(mongo) => {
                let client_certificate = CertificateRef {
                    cert: mongo.client_certificate.cert.to_secret_ref()?,
                    passphrase: mongo.client_certificate.passphrase.to_secret_ref()?,
                };
                let endpoint = mongo.endpoint.to_endpoint(mongo.port());
                let database = if mongo.import {
                    MongoDbInstanceRef::import(self.graph_mut(), parent, &mongo.name, endpoint)?
                } else {
                    MongoDbInstanceRef::provision(self.graph_mut(), parent, &mongo.name, endpoint)?
                };
                DatabaseConnection::for_mongo_db_instance(MongoDbInstanceConnectionOptions {
                    database,
                    client_certificate,
                })
            }
        };

        info!(
            database = %manifest.name(),
            backend = connection.backend(),
            "Declared render manager database"
        );
        Ok(connection)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("name cannot be empty");
    }
    if name.contains('/') {
        bail!("name '{name}' cannot contain '/'");
    }
    Ok(())
}

fn validate_endpoint(endpoint: &EndpointManifest) -> Result<()> {
    if endpoint.hostname.trim().is_empty() {
        bail!("endpoint.hostname cannot be empty");
    }
    if endpoint.port == Some(0) {
        bail!("endpoint.port cannot be 0");
    }
    Ok(())
}

fn validate_secret(secret: &SecretManifest) -> Result<()> {
    parse_secret_arn(&secret.arn)?;
    if let Some(region) = &secret.region {
        validate_aws_region(region)?;
    }
    Ok(())
}
