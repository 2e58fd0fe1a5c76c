//! # Self-managed MongoDB Instance

use super::docdb::add_node;
use crate::constants::MONGO_SERVER_ID;
use crate::diagnostics::Diagnostics;
use crate::graph::{
    default_child, Endpoint, GraphError, ResourceGraph, ResourceId, ResourceKind,
    SecurityGroupRef,
};
use tracing::info;

/// A MongoDB instance as seen from the graph
///
/// A provisioned instance owns a `Server` construct whose default child is the
/// autoscaling group that actually runs `mongod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoDbInstanceRef {
    pub construct: ResourceId,
    /// Fully qualified host name and port the server listens on
    pub endpoint: Endpoint,
    /// Compute construct, absent when imported
    pub server: Option<ResourceId>,
}

impl MongoDbInstanceRef {
    pub fn provision(
        graph: &mut ResourceGraph,
        parent: Option<ResourceId>,
        name: &str,
        endpoint: Endpoint,
    ) -> Result<Self, GraphError> {
        let construct = add_node(graph, parent, name, ResourceKind::Construct)?;
        let server = graph.add_child(construct, MONGO_SERVER_ID, ResourceKind::Construct)?;
        graph.add_child(
            server,
            "Resource",
            ResourceKind::AutoScalingGroup {
                security_group_ids: Vec::new(),
            },
        )?;
        info!(instance = %graph.path(construct), "Provisioned MongoDB instance");

        Ok(Self {
            construct,
            endpoint,
            server: Some(server),
        })
    }

    pub fn import(
        graph: &mut ResourceGraph,
        parent: Option<ResourceId>,
        name: &str,
        endpoint: Endpoint,
    ) -> Result<Self, GraphError> {
        let construct = add_node(graph, parent, name, ResourceKind::Construct)?;
        info!(instance = %graph.path(construct), "Imported MongoDB instance");
        Ok(Self {
            construct,
            endpoint,
            server: None,
        })
    }

    /// The autoscaling group resource behind the server
    ///
    /// `Ok(None)` for an imported instance.
    pub fn compute_resource(&self, graph: &ResourceGraph) -> Result<Option<ResourceId>, GraphError> {
        let Some(server) = self.server else {
            return Ok(None);
        };
        let resource = default_child(graph, server).ok_or_else(|| GraphError::NotFound {
            parent: graph.path(server).to_string(),
            role: "Resource".to_string(),
        })?;
        Ok(Some(resource))
    }

    /// Attach security groups to the server
    ///
    /// An imported instance has nothing to attach to; that is reported as a
    /// warning and the call succeeds.
    pub fn add_security_group(
        &self,
        graph: &mut ResourceGraph,
        diagnostics: &mut Diagnostics,
        groups: &[SecurityGroupRef],
    ) -> Result<(), GraphError> {
        let Some(resource) = self.compute_resource(graph)? else {
            let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
            diagnostics.add_warning(
                graph.path(self.construct),
                format!(
                    "Failed to add the following security groups to {}: {}. The instance was imported and has no server to attach them to.",
                    graph.path(self.construct),
                    names.join(", ")
                ),
            );
            return Ok(());
        };

        let node = graph.get_mut(resource)?;
        match &mut node.kind {
            ResourceKind::AutoScalingGroup { security_group_ids } => {
                security_group_ids.extend(groups.iter().map(|g| g.group_id.clone()));
                Ok(())
            }
            other => Err(GraphError::UnexpectedKind {
                path: node.path.clone(),
                expected: "autoscaling group",
                found: other.kind_name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioned_instance_exposes_compute() {
        let mut graph = ResourceGraph::new();
        let mongo =
            MongoDbInstanceRef::provision(&mut graph, None, "Mongo", Endpoint::new("mongo.farm", 27017))
                .unwrap();
        let asg = mongo.compute_resource(&graph).unwrap().unwrap();
        assert_eq!(graph.path(asg), "Mongo/Server/Resource");
    }

    #[test]
    fn test_security_groups_appended() {
        let mut graph = ResourceGraph::new();
        let mut diagnostics = Diagnostics::default();
        let mongo =
            MongoDbInstanceRef::provision(&mut graph, None, "Mongo", Endpoint::new("mongo.farm", 27017))
                .unwrap();

        mongo
            .add_security_group(&mut graph, &mut diagnostics, &[SecurityGroupRef::new("A", "sg-a")])
            .unwrap();
        mongo
            .add_security_group(&mut graph, &mut diagnostics, &[SecurityGroupRef::new("B", "sg-b")])
            .unwrap();

        let asg = mongo.compute_resource(&graph).unwrap().unwrap();
        assert_eq!(
            graph.get(asg).unwrap().kind,
            ResourceKind::AutoScalingGroup {
                security_group_ids: vec!["sg-a".to_string(), "sg-b".to_string()],
            }
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_imported_instance_warns_on_security_group() {
        let mut graph = ResourceGraph::new();
        let mut diagnostics = Diagnostics::default();
        let mongo =
            MongoDbInstanceRef::import(&mut graph, None, "Mongo", Endpoint::new("mongo.farm", 27017))
                .unwrap();

        assert_eq!(mongo.compute_resource(&graph).unwrap(), None);
        mongo
            .add_security_group(&mut graph, &mut diagnostics, &[SecurityGroupRef::new("A", "sg-a")])
            .unwrap();
        assert_eq!(diagnostics.warnings().count(), 1);
    }
}
