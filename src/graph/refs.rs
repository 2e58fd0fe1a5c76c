//! # References
//!
//! Handles to things this crate does not own: secrets, certificates,
//! principals, security groups, network endpoints.

use crate::validation::{parse_secret_arn, validate_aws_region};
use anyhow::Result;
use serde::Serialize;
use std::fmt;

/// Handle to a JSON credential blob in the secret store
///
/// Only the address is held here. The value is resolved on the host at boot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub arn: String,
    pub region: String,
}

impl SecretRef {
    /// Build a reference with an explicit region
    ///
    /// The region is stored trimmed and lowercased, the form the AWS CLI expects.
    pub fn new(arn: impl Into<String>, region: impl Into<String>) -> Result<Self> {
        let arn = arn.into();
        let region = region.into().trim().to_lowercase();
        parse_secret_arn(&arn)?;
        validate_aws_region(&region)?;
        Ok(Self { arn, region })
    }

    /// Build a reference whose region is the one embedded in the ARN
    pub fn from_arn(arn: impl Into<String>) -> Result<Self> {
        let arn = arn.into();
        let parsed = parse_secret_arn(&arn)?;
        let region = parsed.region.to_lowercase();
        validate_aws_region(&region)?;
        Ok(Self { arn, region })
    }

    /// Secret name segment of the ARN (falls back to the whole ARN)
    #[must_use]
    pub fn name(&self) -> &str {
        parse_secret_arn(&self.arn).map_or(self.arn.as_str(), |parsed| parsed.name)
    }
}

/// Client certificate stored as two secrets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRef {
    /// Binary PKCS#12 blob
    pub cert: SecretRef,
    /// Passphrase protecting `cert`
    pub passphrase: SecretRef,
}

/// Execution identity that can be granted permissions
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Principal(pub String);

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Network rule group reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupRef {
    /// Local name, used in diagnostics
    pub name: String,
    /// Provider identifier (`sg-...`)
    pub group_id: String,
}

impl SecurityGroupRef {
    pub fn new(name: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group_id: group_id.into(),
        }
    }
}

/// Network port opened by an ingress rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "protocol", content = "port")]
pub enum Port {
    Tcp(u16),
}

impl Port {
    #[must_use]
    pub fn tcp(port: u16) -> Self {
        Self::Tcp(port)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Tcp(port) => write!(f, "tcp/{port}"),
        }
    }
}

/// Host name and port a database listens on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub hostname: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARN: &str = "arn:aws:secretsmanager:us-west-2:123456789012:secret:db-login-AbCdEf";

    #[test]
    fn test_secret_ref_region_from_arn() {
        let secret = SecretRef::from_arn(ARN).expect("valid ARN");
        assert_eq!(secret.region, "us-west-2");
        assert_eq!(secret.name(), "db-login-AbCdEf");
    }

    #[test]
    fn test_secret_ref_explicit_region_overrides() {
        let secret = SecretRef::new(ARN, "eu-west-1").expect("valid ARN and region");
        assert_eq!(secret.region, "eu-west-1");
    }

    #[test]
    fn test_secret_ref_region_normalized() {
        let secret = SecretRef::new(ARN, " US-WEST-2 ").expect("valid ARN and region");
        assert_eq!(secret.region, "us-west-2");
    }

    #[test]
    fn test_secret_ref_rejects_bad_input() {
        assert!(SecretRef::from_arn("not-an-arn").is_err());
        assert!(SecretRef::new(ARN, "moon-base-1").is_err());
    }

    #[test]
    fn test_port_display() {
        assert_eq!(Port::tcp(27017).to_string(), "tcp/27017");
    }
}
