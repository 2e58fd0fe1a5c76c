//! # DocumentDB Cluster

use crate::constants::{DOCDB_FIRST_INSTANCE_ID, MAX_DOCDB_INSTANCES};
use crate::graph::{default_child, Endpoint, GraphError, ResourceGraph, ResourceId, ResourceKind};
use tracing::{info, warn};

/// Settings for a cluster provisioned by this configuration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocDbClusterProps {
    pub endpoint: Endpoint,
    /// Engine version; `None` leaves it to the service default
    pub engine_version: Option<String>,
    /// Number of data-serving instances (`Instance1`..`InstanceN`)
    pub instances: u32,
    pub instance_class: String,
}

/// A DocumentDB cluster as seen from the graph
///
/// A provisioned cluster is a construct with an underlying `Resource` child
/// and one child per instance. An imported cluster is a bare construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocDbClusterRef {
    pub construct: ResourceId,
    pub endpoint: Endpoint,
    pub imported: bool,
}

impl DocDbClusterRef {
    /// Declare a new cluster under `parent`
    pub fn provision(
        graph: &mut ResourceGraph,
        parent: Option<ResourceId>,
        name: &str,
        props: &DocDbClusterProps,
    ) -> Result<Self, GraphError> {
        let construct = add_node(graph, parent, name, ResourceKind::Construct)?;
        graph.add_child(
            construct,
            "Resource",
            ResourceKind::DocDbCluster {
                engine_version: props.engine_version.clone(),
                vpc_security_group_ids: None,
            },
        )?;
        let instances = props.instances.clamp(1, MAX_DOCDB_INSTANCES);
        if instances != props.instances {
            warn!(
                cluster = name,
                requested = props.instances,
                instances,
                "Instance count out of range, clamped"
            );
        }
        for index in 1..=instances {
            graph.add_child(
                construct,
                &format!("Instance{index}"),
                ResourceKind::DocDbInstance {
                    instance_class: props.instance_class.clone(),
                },
            )?;
        }
        info!(
            cluster = %graph.path(construct),
            instances,
            "Provisioned DocumentDB cluster"
        );

        Ok(Self {
            construct,
            endpoint: props.endpoint.clone(),
            imported: false,
        })
    }

    /// Reference a cluster that already exists outside this graph
    pub fn import(
        graph: &mut ResourceGraph,
        parent: Option<ResourceId>,
        name: &str,
        endpoint: Endpoint,
    ) -> Result<Self, GraphError> {
        let construct = add_node(graph, parent, name, ResourceKind::Construct)?;
        info!(cluster = %graph.path(construct), "Imported DocumentDB cluster");
        Ok(Self {
            construct,
            endpoint,
            imported: true,
        })
    }

    /// Underlying cluster resource, if the cluster was provisioned here
    #[must_use]
    pub fn underlying_resource(&self, graph: &ResourceGraph) -> Option<ResourceId> {
        default_child(graph, self.construct)
    }

    /// Conventional name of the first data-serving instance
    #[must_use]
    pub fn first_instance_role() -> &'static str {
        DOCDB_FIRST_INSTANCE_ID
    }
}

pub(crate) fn add_node(
    graph: &mut ResourceGraph,
    parent: Option<ResourceId>,
    name: &str,
    kind: ResourceKind,
) -> Result<ResourceId, GraphError> {
    match parent {
        Some(parent) => graph.add_child(parent, name, kind),
        None => graph.add_root(name, kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(instances: u32) -> DocDbClusterProps {
        DocDbClusterProps {
            endpoint: Endpoint::new("db.cluster.local", 27017),
            engine_version: Some("3.6.0".to_string()),
            instances,
            instance_class: "db.r5.large".to_string(),
        }
    }

    #[test]
    fn test_provision_creates_resource_and_instances() {
        let mut graph = ResourceGraph::new();
        let cluster = DocDbClusterRef::provision(&mut graph, None, "Db", &props(2)).unwrap();

        assert!(!cluster.imported);
        assert!(cluster.underlying_resource(&graph).is_some());
        assert!(graph.try_find_child(cluster.construct, "Instance1").is_some());
        assert!(graph.try_find_child(cluster.construct, "Instance2").is_some());
        assert!(graph.try_find_child(cluster.construct, "Instance3").is_none());
    }

    #[test]
    fn test_provision_at_least_one_instance() {
        let mut graph = ResourceGraph::new();
        let cluster = DocDbClusterRef::provision(&mut graph, None, "Db", &props(0)).unwrap();
        assert!(graph.try_find_child(cluster.construct, "Instance1").is_some());
    }

    #[test]
    fn test_provision_caps_instance_count() {
        let mut graph = ResourceGraph::new();
        let cluster =
            DocDbClusterRef::provision(&mut graph, None, "Db", &props(u32::MAX)).unwrap();
        let children = graph.get(cluster.construct).unwrap().children().len();
        // Resource plus the maximum number of instances
        assert_eq!(children, 1 + MAX_DOCDB_INSTANCES as usize);
    }

    #[test]
    fn test_import_has_no_children() {
        let mut graph = ResourceGraph::new();
        let cluster = DocDbClusterRef::import(
            &mut graph,
            None,
            "Db",
            Endpoint::new("db.cluster.local", 27017),
        )
        .unwrap();
        assert!(cluster.imported);
        assert_eq!(cluster.underlying_resource(&graph), None);
        assert!(graph.get(cluster.construct).unwrap().children().is_empty());
    }
}
