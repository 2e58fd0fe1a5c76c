//! # Hosts
//!
//! The machine that runs the generated boot script, and the ordered list of
//! commands it accumulates.

mod asset;

pub use asset::ScriptAsset;

use crate::graph::{Principal, ResourceId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system family of a host
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum OsKind {
    Linux,
    Windows,
    Unknown,
}

impl OsKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OsKind::Linux => "Linux",
            OsKind::Windows => "Windows",
            OsKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered boot-time commands for one host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserData {
    commands: Vec<String>,
}

impl UserData {
    pub fn add_commands<I, S>(&mut self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.extend(commands.into_iter().map(Into::into));
    }

    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Render as a bash script
    #[must_use]
    pub fn render(&self) -> String {
        let mut script = String::from("#!/bin/bash\n");
        for command in &self.commands {
            script.push_str(command);
            script.push('\n');
        }
        script
    }
}

/// Commands that copy an object from the asset bucket to `local_path`
#[must_use]
pub fn s3_download_commands(
    aws_cli: &str,
    bucket: &str,
    key: &str,
    local_path: &str,
) -> Vec<String> {
    vec![
        format!("mkdir -p $(dirname '{local_path}')"),
        format!("{aws_cli} s3 cp 's3://{bucket}/{key}' '{local_path}'"),
    ]
}

/// Commands that mark `file_path` executable and run it with `arguments`
#[must_use]
pub fn execute_file_commands(file_path: &str, arguments: &[&str]) -> Vec<String> {
    let invocation = format!("'{file_path}' {}", arguments.join(" "));
    vec![
        "set -e".to_string(),
        format!("chmod +x '{file_path}'"),
        invocation.trim_end().to_string(),
    ]
}

/// A host that boots with generated user data
#[derive(Debug, Clone)]
pub struct Host {
    /// Graph resource the host is provisioned as
    pub resource: ResourceId,
    pub os: OsKind,
    /// Identity the host's boot commands run under
    pub principal: Principal,
    user_data: UserData,
}

impl Host {
    #[must_use]
    pub fn new(resource: ResourceId, os: OsKind, principal: Principal) -> Self {
        Self {
            resource,
            os,
            principal,
            user_data: UserData::default(),
        }
    }

    #[must_use]
    pub fn user_data(&self) -> &UserData {
        &self.user_data
    }

    pub fn user_data_mut(&mut self) -> &mut UserData {
        &mut self.user_data
    }
}
