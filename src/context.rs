//! # Build Context
//!
//! State shared by every operation of one configuration run: the resource
//! graph, collected diagnostics, settings, and the per-OS cache of the
//! certificate download asset.
//!
//! Everything runs synchronously on one thread; operations take the context
//! by `&mut`.

use crate::config::Settings;
use crate::connection::ConnectionError;
use crate::diagnostics::{Annotation, Diagnostics};
use crate::graph::{DependencyEdge, Grant, IngressRule, Resource, ResourceGraph};
use crate::host::{OsKind, ScriptAsset};
use crate::observability::metrics;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct BuildContext {
    settings: Settings,
    graph: ResourceGraph,
    diagnostics: Diagnostics,
    get_secret_to_file_assets: HashMap<OsKind, ScriptAsset>,
}

impl BuildContext {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ResourceGraph {
        &mut self.graph
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Split borrow for operations that read the graph while annotating
    pub fn graph_and_diagnostics(&mut self) -> (&mut ResourceGraph, &mut Diagnostics) {
        (&mut self.graph, &mut self.diagnostics)
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Certificate download asset for `os`, created on first use
    ///
    /// Later calls for the same OS return the cached asset instead of adding
    /// a second resource to the graph.
    pub fn get_secret_to_file_asset(&mut self, os: OsKind) -> Result<ScriptAsset, ConnectionError> {
        if let Some(asset) = self.get_secret_to_file_assets.get(&os) {
            debug!(os = %os, "Reusing certificate download asset");
            metrics::increment_script_asset_cache_hits();
            return Ok(asset.clone());
        }
        if os != OsKind::Linux {
            return Err(ConnectionError::UnsupportedHostOs {
                operation: "Downloading the database client certificate",
                os,
            });
        }

        let asset = ScriptAsset::create_get_secret_to_file(&mut self.graph, &self.settings, os)?;
        self.get_secret_to_file_assets.insert(os, asset.clone());
        Ok(asset)
    }

    /// Snapshot of the whole graph for serialisation
    #[must_use]
    pub fn synthesize(&self) -> Synthesis<'_> {
        Synthesis {
            resources: self.graph.resources().collect(),
            dependencies: self.graph.dependency_edges().copied().collect(),
            ingress_rules: self.graph.ingress_rules(),
            grants: self.graph.grants(),
            annotations: self.diagnostics.annotations(),
        }
    }
}

/// Serialisable view of a configuration run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Synthesis<'a> {
    pub resources: Vec<&'a Resource>,
    pub dependencies: Vec<DependencyEdge>,
    pub ingress_rules: &'a [IngressRule],
    pub grants: &'a [Grant],
    pub annotations: &'a [Annotation],
}

impl Synthesis<'_> {
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize synthesis: {e}"))
    }
}
