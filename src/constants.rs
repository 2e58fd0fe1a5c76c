//! # Constants
//!
//! Shared constants used throughout the crate.
//!
//! Names in the generated shell contract (function names, variable names, the
//! certificate path) are consumed by the host agent and the render manager
//! installer, so they are fixed rather than configurable.

/// Exported shell function that fills `INSTALLER_DB_ARGS` at install time
pub const INSTALLER_ARGS_FUNCTION: &str = "configure_database_installation_args";

/// Exported shell function that hands credentials to the render manager at runtime
pub const CONNECTION_ARGS_FUNCTION: &str = "configure_deadline_database";

/// Associative array populated by [`INSTALLER_ARGS_FUNCTION`]
pub const INSTALLER_ARGS_ARRAY: &str = "INSTALLER_DB_ARGS";

/// Environment variable holding the client certificate path (MongoDB)
pub const DB_CERT_FILE_VAR: &str = "DB_CERT_FILE";

/// Environment variable holding the client certificate passphrase (MongoDB)
pub const DB_CERT_PASSWORD_VAR: &str = "DB_CERT_PASSWORD";

/// Where the MongoDB client certificate is written on the host
pub const MONGO_CERT_LOCATION: &str = "/opt/Thinkbox/certs/mongo_client.pfx";

/// Default MongoDB port
pub const DEFAULT_MONGO_PORT: u16 = 27017;

/// Default DocumentDB port
pub const DEFAULT_DOCDB_PORT: u16 = 27017;

/// Container environment: login secret for DocumentDB
pub const ENV_DB_CREDENTIALS_URI: &str = "DB_CREDENTIALS_URI";

/// Container environment: client certificate secret for MongoDB
pub const ENV_DB_TLS_CLIENT_CERT_URI: &str = "DB_TLS_CLIENT_CERT_URI";

/// Container environment: client certificate passphrase secret for MongoDB
pub const ENV_DB_TLS_CLIENT_CERT_PASSWORD_URI: &str = "DB_TLS_CLIENT_CERT_PASSWORD_URI";

/// Child name of the first data-serving instance inside a provisioned DocumentDB cluster
pub const DOCDB_FIRST_INSTANCE_ID: &str = "Instance1";

/// Child names treated as the default (underlying) resource of a construct
pub const DEFAULT_CHILD_IDS: [&str; 2] = ["Resource", "Default"];

/// Child name of the compute construct inside a provisioned MongoDB instance
pub const MONGO_SERVER_ID: &str = "Server";

/// Base name of the certificate download script asset
pub const GET_SECRET_TO_FILE_BASE_NAME: &str = "getSecretToFile";

/// Fixed suffix mixed into the certificate download asset id, so the id is
/// stable across runs and does not collide with user-chosen names
pub const GET_SECRET_TO_FILE_UUID: &str = "e8125dd2-ab2c-4861-8ee4-998c26b30ee0";

/// Most instances a DocumentDB cluster can have
pub const MAX_DOCDB_INSTANCES: u32 = 16;

/// Supported DocumentDB engine versions (major.minor)
pub const SUPPORTED_DOCDB_VERSIONS: [&str; 3] = ["3.6", "4.0", "5.0"];
