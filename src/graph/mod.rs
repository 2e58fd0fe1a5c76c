//! # Resource Graph
//!
//! In-memory model of the infrastructure graph the connection wires into.
//!
//! Resources form a tree (every resource has a local name unique among its
//! siblings and a `/`-joined path). On top of the tree the graph records
//! deploy-after edges, ingress rules and read grants. The graph only
//! describes what should be deployed; nothing here talks to a cloud API.
//!
//! ## Module Structure
//!
//! - `refs.rs` - Handles to externally owned things (secrets, principals, ports)
//! - `query.rs` - Typed lookups into a construct's children
//! - `error.rs` - `GraphError`

mod error;
mod query;
pub mod refs;

pub use error::GraphError;
pub use query::{default_child, find_resource_by_role};
pub use refs::{CertificateRef, Endpoint, Port, Principal, SecretRef, SecurityGroupRef};

use crate::host::OsKind;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Index of a resource inside a [`ResourceGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(usize);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a resource is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ResourceKind {
    /// Grouping node with no deployable counterpart of its own
    Construct,
    /// Underlying DocumentDB cluster resource
    #[serde(rename_all = "camelCase")]
    DocDbCluster {
        engine_version: Option<String>,
        vpc_security_group_ids: Option<Vec<String>>,
    },
    /// Data-serving DocumentDB instance
    #[serde(rename_all = "camelCase")]
    DocDbInstance { instance_class: String },
    /// Underlying autoscaling group resource
    #[serde(rename_all = "camelCase")]
    AutoScalingGroup { security_group_ids: Vec<String> },
    /// Compute instance or service consuming the database
    Workload,
    /// Script staged in the asset bucket and executed on hosts
    #[serde(rename_all = "camelCase")]
    ScriptAsset {
        os: OsKind,
        bucket: String,
        object_key: String,
        content: String,
    },
}

impl ResourceKind {
    /// Short name used in error messages
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            ResourceKind::Construct => "construct",
            ResourceKind::DocDbCluster { .. } => "DocumentDB cluster",
            ResourceKind::DocDbInstance { .. } => "DocumentDB instance",
            ResourceKind::AutoScalingGroup { .. } => "autoscaling group",
            ResourceKind::Workload => "workload",
            ResourceKind::ScriptAsset { .. } => "script asset",
        }
    }
}

/// One node of the graph
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub path: String,
    pub parent: Option<ResourceId>,
    pub kind: ResourceKind,
    #[serde(skip)]
    children: Vec<ResourceId>,
}

impl Resource {
    /// Children in insertion order
    #[must_use]
    pub fn children(&self) -> &[ResourceId] {
        &self.children
    }
}

/// Traffic allowed from one resource to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    pub source: ResourceId,
    pub target: ResourceId,
    pub port: Port,
}

/// What a grant gives access to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum GrantTarget {
    Secret { arn: String },
    Object { bucket: String, key: String },
}

/// Read permission for a principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    pub principal: Principal,
    pub target: GrantTarget,
}

/// Deploy-after relationship: `dependent` is deployed after `dependency`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    pub dependent: ResourceId,
    pub dependency: ResourceId,
}

/// The resource graph
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    resources: Vec<Resource>,
    edges: BTreeSet<DependencyEdge>,
    ingress_rules: Vec<IngressRule>,
    grants: Vec<Grant>,
}

impl ResourceGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level resource
    pub fn add_root(&mut self, name: &str, kind: ResourceKind) -> Result<ResourceId, GraphError> {
        if self
            .resources
            .iter()
            .any(|r| r.parent.is_none() && r.name == name)
        {
            return Err(GraphError::DuplicateChild {
                parent: String::new(),
                name: name.to_string(),
            });
        }
        Ok(self.push(None, name.to_string(), name.to_string(), kind))
    }

    /// Add a named child under `parent`
    pub fn add_child(
        &mut self,
        parent: ResourceId,
        name: &str,
        kind: ResourceKind,
    ) -> Result<ResourceId, GraphError> {
        let parent_path = self.get(parent)?.path.clone();
        if self.try_find_child(parent, name).is_some() {
            return Err(GraphError::DuplicateChild {
                parent: parent_path,
                name: name.to_string(),
            });
        }
        let path = format!("{parent_path}/{name}");
        let id = self.push(Some(parent), name.to_string(), path, kind);
        self.resources[parent.0].children.push(id);
        Ok(id)
    }

    fn push(
        &mut self,
        parent: Option<ResourceId>,
        name: String,
        path: String,
        kind: ResourceKind,
    ) -> ResourceId {
        let id = ResourceId(self.resources.len());
        tracing::trace!(resource.path = %path, resource.kind = kind.kind_name(), "Adding resource");
        self.resources.push(Resource {
            id,
            name,
            path,
            parent,
            kind,
            children: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: ResourceId) -> Result<&Resource, GraphError> {
        self.resources
            .get(id.0)
            .ok_or(GraphError::UnknownResource(id.0))
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Result<&mut Resource, GraphError> {
        self.resources
            .get_mut(id.0)
            .ok_or(GraphError::UnknownResource(id.0))
    }

    /// Path of a resource, or `<unknown>` for a dangling id
    #[must_use]
    pub fn path(&self, id: ResourceId) -> &str {
        self.resources
            .get(id.0)
            .map_or("<unknown>", |r| r.path.as_str())
    }

    /// Child of `parent` with the given local name
    #[must_use]
    pub fn try_find_child(&self, parent: ResourceId, name: &str) -> Option<ResourceId> {
        let parent = self.resources.get(parent.0)?;
        parent
            .children
            .iter()
            .copied()
            .find(|child| self.resources[child.0].name == name)
    }

    /// All resources in insertion order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Record that `dependent` deploys after `dependency`
    ///
    /// Returns `false` when the edge already existed.
    pub fn add_dependency(
        &mut self,
        dependent: ResourceId,
        dependency: ResourceId,
    ) -> Result<bool, GraphError> {
        self.get(dependent)?;
        self.get(dependency)?;
        Ok(self.edges.insert(DependencyEdge {
            dependent,
            dependency,
        }))
    }

    /// All deploy-after edges, ordered by (dependent, dependency)
    pub fn dependency_edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter()
    }

    pub fn add_ingress_rule(&mut self, rule: IngressRule) -> Result<(), GraphError> {
        self.get(rule.source)?;
        self.get(rule.target)?;
        self.ingress_rules.push(rule);
        Ok(())
    }

    #[must_use]
    pub fn ingress_rules(&self) -> &[IngressRule] {
        &self.ingress_rules
    }

    /// Grant read access; duplicate grants are collapsed
    pub fn grant_read(&mut self, principal: &Principal, target: GrantTarget) {
        let grant = Grant {
            principal: principal.clone(),
            target,
        };
        if !self.grants.contains(&grant) {
            self.grants.push(grant);
        }
    }

    #[must_use]
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    /// Secret ARNs `principal` may read
    #[must_use]
    pub fn readable_secrets(&self, principal: &Principal) -> Vec<&str> {
        self.grants
            .iter()
            .filter(|grant| &grant.principal == principal)
            .filter_map(|grant| match &grant.target {
                GrantTarget::Secret { arn } => Some(arn.as_str()),
                GrantTarget::Object { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_get_paths() {
        let mut graph = ResourceGraph::new();
        let stack = graph.add_root("Stack", ResourceKind::Construct).unwrap();
        let db = graph.add_child(stack, "Database", ResourceKind::Construct).unwrap();
        assert_eq!(graph.path(db), "Stack/Database");
        assert_eq!(graph.try_find_child(stack, "Database"), Some(db));
        assert_eq!(graph.try_find_child(stack, "Missing"), None);
    }

    #[test]
    fn test_duplicate_child_rejected() {
        let mut graph = ResourceGraph::new();
        let stack = graph.add_root("Stack", ResourceKind::Construct).unwrap();
        graph.add_child(stack, "A", ResourceKind::Workload).unwrap();
        let err = graph.add_child(stack, "A", ResourceKind::Workload).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateChild { .. }));
    }

    #[test]
    fn test_dependency_added_once() {
        let mut graph = ResourceGraph::new();
        let a = graph.add_root("A", ResourceKind::Workload).unwrap();
        let b = graph.add_root("B", ResourceKind::Workload).unwrap();
        assert!(graph.add_dependency(a, b).unwrap());
        assert!(!graph.add_dependency(a, b).unwrap());
        assert_eq!(graph.dependency_edges().count(), 1);
        let edge = graph.dependency_edges().next().unwrap();
        assert_eq!((edge.dependent, edge.dependency), (a, b));
    }

    #[test]
    fn test_unknown_resource() {
        let mut graph = ResourceGraph::new();
        let a = graph.add_root("A", ResourceKind::Workload).unwrap();
        let err = graph.add_dependency(a, ResourceId(42)).unwrap_err();
        assert_eq!(err, GraphError::UnknownResource(42));
    }

    #[test]
    fn test_grants_collapse_duplicates() {
        let mut graph = ResourceGraph::new();
        let role = Principal::new("WorkerRole");
        let target = GrantTarget::Secret {
            arn: "arn:aws:secretsmanager:us-east-1:1:secret:x".to_string(),
        };
        graph.grant_read(&role, target.clone());
        graph.grant_read(&role, target);
        assert_eq!(graph.readable_secrets(&role).len(), 1);
    }
}
