//! # Graph Queries
//!
//! Lookups that reach past a construct's public surface into its children.
//!
//! Higher-level constructs do not expose every underlying resource, so the
//! connection variants find them by conventional child name. A missing child
//! is an explicit `GraphError::NotFound`; callers decide whether that means
//! "imported, nothing to do" or "internal structure changed".

use super::{GraphError, ResourceGraph, ResourceId};
use crate::constants::DEFAULT_CHILD_IDS;

/// Find the child of `parent` playing `role` (its conventional local name)
pub fn find_resource_by_role(
    graph: &ResourceGraph,
    parent: ResourceId,
    role: &str,
) -> Result<ResourceId, GraphError> {
    let parent_resource = graph.get(parent)?;
    graph
        .try_find_child(parent, role)
        .ok_or_else(|| GraphError::NotFound {
            parent: parent_resource.path.clone(),
            role: role.to_string(),
        })
}

/// The underlying resource of a construct (child named `Resource` or `Default`)
///
/// Imported constructs have none.
#[must_use]
pub fn default_child(graph: &ResourceGraph, parent: ResourceId) -> Option<ResourceId> {
    DEFAULT_CHILD_IDS
        .iter()
        .find_map(|name| graph.try_find_child(parent, name))
}
