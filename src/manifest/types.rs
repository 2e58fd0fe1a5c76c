//! # Manifest Types
//!
//! Serde and JSON schema types for a database manifest.

use crate::constants::{DEFAULT_DOCDB_PORT, DEFAULT_MONGO_PORT};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Database backend description
///
/// Accepts `{"type": "docDb", "docDb": {...}}` as well as `{"docDb": {...}}`.
/// The backend is chosen by which key is present; "type" is allowed for
/// readability and ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DatabaseManifest {
    /// Managed DocumentDB cluster
    #[serde(rename = "docDb")]
    DocDb(DocDbManifest),
    /// Self-managed MongoDB instance
    #[serde(rename = "mongoDbInstance")]
    MongoDbInstance(MongoDbInstanceManifest),
}

impl DatabaseManifest {
    /// Name of the construct the manifest declares
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            DatabaseManifest::DocDb(docdb) => &docdb.name,
            DatabaseManifest::MongoDbInstance(mongo) => &mongo.name,
        }
    }
}

impl JsonSchema for DatabaseManifest {
    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("DatabaseManifest")
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let docdb_schema = DocDbManifest::json_schema(gen);
        let mongo_schema = MongoDbInstanceManifest::json_schema(gen);

        let docdb_json =
            serde_json::to_value(&docdb_schema).unwrap_or_else(|_| serde_json::json!({}));
        let mongo_json =
            serde_json::to_value(&mongo_schema).unwrap_or_else(|_| serde_json::json!({}));

        let schema_value = serde_json::json!({
            "type": "object",
            "description": "Render manager database - a DocumentDB cluster or a self-managed MongoDB instance",
            "properties": {
                "type": {
                    "type": "string",
                    "enum": ["docDb", "mongoDbInstance"],
                    "description": "Backend type (optional, ignored during deserialization - use docDb/mongoDbInstance fields instead)"
                },
                "docDb": docdb_json,
                "mongoDbInstance": mongo_json
            },
            "oneOf": [
                {"required": ["docDb"]},
                {"required": ["mongoDbInstance"]}
            ]
        });
        Schema::try_from(schema_value).unwrap_or_else(|_| Schema::from(true))
    }
}

impl<'de> Deserialize<'de> for DatabaseManifest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, IgnoredAny, MapAccess, Visitor};
        use std::fmt;

        struct DatabaseManifestVisitor;

        impl<'de> Visitor<'de> for DatabaseManifestVisitor {
            type Value = DatabaseManifest;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a database manifest with a docDb or mongoDbInstance field")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut docdb: Option<DocDbManifest> = None;
                let mut mongo: Option<MongoDbInstanceManifest> = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "docDb" => {
                            if docdb.is_some() {
                                return Err(de::Error::duplicate_field("docDb"));
                            }
                            docdb = Some(map.next_value().map_err(|e| {
                                de::Error::custom(format!("Failed to deserialize docDb: {e}"))
                            })?);
                        }
                        "mongoDbInstance" => {
                            if mongo.is_some() {
                                return Err(de::Error::duplicate_field("mongoDbInstance"));
                            }
                            mongo = Some(map.next_value().map_err(|e| {
                                de::Error::custom(format!(
                                    "Failed to deserialize mongoDbInstance: {e}"
                                ))
                            })?);
                        }
                        _ => {
                            let _: IgnoredAny = map.next_value()?;
                        }
                    }
                }

                match (docdb, mongo) {
                    (Some(docdb), None) => Ok(DatabaseManifest::DocDb(docdb)),
                    (None, Some(mongo)) => Ok(DatabaseManifest::MongoDbInstance(mongo)),
                    (None, None) => Err(de::Error::missing_field("docDb or mongoDbInstance")),
                    (Some(_), Some(_)) => Err(de::Error::custom(
                        "both docDb and mongoDbInstance specified, choose one",
                    )),
                }
            }
        }

        deserializer.deserialize_map(DatabaseManifestVisitor)
    }
}

/// A secret in AWS Secrets Manager
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretManifest {
    /// Full secret ARN
    pub arn: String,
    /// Region to read the secret from. Defaults to the region in the ARN.
    #[serde(default)]
    pub region: Option<String>,
}

/// Where clients reach the database
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EndpointManifest {
    pub hostname: String,
    /// Defaults to 27017
    #[serde(default)]
    pub port: Option<u16>,
}

/// DocumentDB cluster description
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocDbManifest {
    /// Construct name in the resource graph
    pub name: String,
    pub endpoint: EndpointManifest,
    /// JSON secret holding `username` and `password`
    pub login: SecretManifest,
    /// Reference an existing cluster instead of provisioning one
    #[serde(default)]
    pub import: bool,
    /// Engine version of a provisioned cluster (e.g. "3.6.0")
    #[serde(default)]
    pub engine_version: Option<String>,
    /// Number of instances in a provisioned cluster
    #[serde(default = "default_instances")]
    pub instances: u32,
    #[serde(default = "default_instance_class")]
    pub instance_class: String,
}

impl DocDbManifest {
    #[must_use]
    pub fn port(&self) -> u16 {
        self.endpoint.port.unwrap_or(DEFAULT_DOCDB_PORT)
    }
}

/// Self-managed MongoDB instance description
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MongoDbInstanceManifest {
    /// Construct name in the resource graph
    pub name: String,
    pub endpoint: EndpointManifest,
    pub client_certificate: CertificateManifest,
    /// Reference an existing instance instead of provisioning one
    #[serde(default)]
    pub import: bool,
}

impl MongoDbInstanceManifest {
    #[must_use]
    pub fn port(&self) -> u16 {
        self.endpoint.port.unwrap_or(DEFAULT_MONGO_PORT)
    }
}

/// PKCS#12 client certificate and its passphrase
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateManifest {
    pub cert: SecretManifest,
    pub passphrase: SecretManifest,
}

fn default_instances() -> u32 {
    1
}

fn default_instance_class() -> String {
    "db.r5.large".to_string()
}
