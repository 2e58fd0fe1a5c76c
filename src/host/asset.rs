//! # Script Assets
//!
//! Scripts staged in the asset bucket and executed on hosts at boot.

use super::{execute_file_commands, s3_download_commands, Host, OsKind};
use crate::config::Settings;
use crate::constants::{GET_SECRET_TO_FILE_BASE_NAME, GET_SECRET_TO_FILE_UUID};
use crate::graph::{GrantTarget, GraphError, ResourceGraph, ResourceId, ResourceKind};
use sha2::{Digest, Sha256};
use tracing::info;

/// Writes a binary secret to a file: `<secret-arn> <output-file>`
const GET_SECRET_TO_FILE_SCRIPT: &str = include_str!("../../scripts/get_secret_to_file.sh");

/// Handle to a script asset resource in the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptAsset {
    pub resource: ResourceId,
    pub os: OsKind,
    pub bucket: String,
    pub object_key: String,
}

impl ScriptAsset {
    /// Graph id of the certificate download asset for `os`
    ///
    /// Derived only from the OS kind, so every caller targeting the same OS
    /// resolves to the same resource.
    #[must_use]
    pub fn get_secret_to_file_id(os: OsKind) -> String {
        format!(
            "GetSecretToFile{os}{}",
            GET_SECRET_TO_FILE_UUID.replace('-', "")
        )
    }

    /// Add the certificate download asset for `os` to the graph
    pub(crate) fn create_get_secret_to_file(
        graph: &mut ResourceGraph,
        settings: &Settings,
        os: OsKind,
    ) -> Result<Self, GraphError> {
        let digest = Sha256::digest(GET_SECRET_TO_FILE_SCRIPT.as_bytes());
        let object_key = format!("{GET_SECRET_TO_FILE_BASE_NAME}/{digest:x}.sh");
        let name = Self::get_secret_to_file_id(os);
        let resource = graph.add_root(
            &name,
            ResourceKind::ScriptAsset {
                os,
                bucket: settings.asset_bucket.clone(),
                object_key: object_key.clone(),
                content: GET_SECRET_TO_FILE_SCRIPT.to_string(),
            },
        )?;
        info!(asset = %name, object_key = %object_key, "Created script asset");

        Ok(Self {
            resource,
            os,
            bucket: settings.asset_bucket.clone(),
            object_key,
        })
    }

    /// Commands that download and run this script on `host`
    ///
    /// Also grants the host's principal read access to the staged object.
    pub fn execute_on(
        &self,
        graph: &mut ResourceGraph,
        settings: &Settings,
        host: &Host,
        args: &[&str],
    ) -> Vec<String> {
        graph.grant_read(
            &host.principal,
            GrantTarget::Object {
                bucket: self.bucket.clone(),
                key: self.object_key.clone(),
            },
        );

        let local_path = format!(
            "{}/{}",
            settings.script_staging_dir.trim_end_matches('/'),
            self.object_key
        );
        let mut commands =
            s3_download_commands(&settings.aws_cli, &self.bucket, &self.object_key, &local_path);
        commands.extend(execute_file_commands(&local_path, args));
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Principal;

    #[test]
    fn test_asset_id_is_stable_per_os() {
        assert_eq!(
            ScriptAsset::get_secret_to_file_id(OsKind::Linux),
            "GetSecretToFileLinuxe8125dd2ab2c48618ee4998c26b30ee0"
        );
        assert_ne!(
            ScriptAsset::get_secret_to_file_id(OsKind::Linux),
            ScriptAsset::get_secret_to_file_id(OsKind::Windows)
        );
    }

    #[test]
    fn test_execute_on_grants_and_downloads() {
        let settings = Settings::default();
        let mut graph = ResourceGraph::new();
        let asset =
            ScriptAsset::create_get_secret_to_file(&mut graph, &settings, OsKind::Linux).unwrap();
        let worker = graph.add_root("Worker", ResourceKind::Workload).unwrap();
        let host = Host::new(worker, OsKind::Linux, Principal::new("WorkerRole"));

        let commands = asset.execute_on(&mut graph, &settings, &host, &["arg1", "arg2"]);

        let local_path = format!("/tmp/{}", asset.object_key);
        assert_eq!(commands.len(), 5);
        assert!(commands[1].contains(&format!("s3://{}/{}", asset.bucket, asset.object_key)));
        assert_eq!(commands[4], format!("'{local_path}' arg1 arg2"));
        assert!(graph.grants().iter().any(|grant| matches!(
            &grant.target,
            GrantTarget::Object { key, .. } if key == &asset.object_key
        )));
    }
}
