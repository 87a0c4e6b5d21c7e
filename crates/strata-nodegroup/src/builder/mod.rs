//! Managed node group synthesis
//!
//! Turns a validated node group into a [`ResourceGraph`]. The only awaits
//! are the collaborator calls: subnet resolution, and either the launch
//! template fetch or bootstrap data generation. Any failure aborts the call
//! and no partial graph is returned.

mod iam;
mod launch_template;
mod tags;
mod taints;

pub use iam::normalize_arn;
pub use launch_template::validate_launch_template;
pub use tags::merge_tags;
pub use taints::map_taints;

use tracing::{debug, info};

use strata_common::model::{ClusterContext, NodeGroupSpec};
use strata_common::{Error, Result, CREATED_BY};

use crate::resource::{
    CapacityType, NodeRepairConfig, NodegroupProperties, NodegroupResource, NodegroupShape,
    NodegroupUpdateConfig, ResourceGraph, ScalingConfig,
};
use crate::validate::ValidatedNodeGroup;
use crate::Collaborators;

/// Synthesizes managed node group resources for one cluster
///
/// Holds no per-call state; one builder can synthesize many node groups,
/// concurrently if the collaborators allow it.
#[derive(Clone, Debug)]
pub struct ManagedNodeGroupBuilder<'a> {
    cluster: &'a ClusterContext,
    collaborators: Collaborators,
    force_add_cni_policy: bool,
}

impl<'a> ManagedNodeGroupBuilder<'a> {
    /// Create a builder for node groups of `cluster`
    pub fn new(cluster: &'a ClusterContext, collaborators: Collaborators) -> Self {
        Self {
            cluster,
            collaborators,
            force_add_cni_policy: false,
        }
    }

    /// Attach the CNI policy to synthesized node roles even with OIDC enabled
    pub fn force_add_cni_policy(mut self, force: bool) -> Self {
        self.force_add_cni_policy = force;
        self
    }

    /// Synthesize the resource graph for a validated managed node group
    pub async fn synthesize(&self, validated: &ValidatedNodeGroup<'_>) -> Result<ResourceGraph> {
        let ng = validated.spec();
        let name = ng.name.as_str();
        if !validated.kind().is_managed() {
            return Err(Error::synthesis_for(
                name,
                "only managed nodegroups can be synthesized",
            ));
        }

        let description = format!(
            "EKS Managed Nodes (SSH access: {}) {CREATED_BY}",
            ng.ssh_allowed()
        );

        let node_role = iam::resolve_node_role(&ng.iam, self.cluster, self.force_add_cni_policy)
            .map_err(|msg| Error::synthesis_for(name, msg))?;

        let subnets = self
            .collaborators
            .subnets
            .resolve(&ng.placement, self.cluster)
            .await?;

        let scaling_config = ScalingConfig {
            min_size: ng.min_size,
            max_size: ng.max_size,
            desired_size: ng.desired_capacity,
        };
        let tags = merge_tags(&self.cluster.tags, &ng.tags);
        let taints = map_taints(&ng.taints).map_err(|msg| Error::synthesis_for(name, msg))?;
        let capacity_type = capacity_type(ng);

        let template = launch_template::resolve_launch_template(
            ng,
            self.cluster,
            capacity_type == Some(CapacityType::CapacityBlock),
            &self.collaborators,
        )
        .await?;

        let shape = if self.cluster.is_custom_eks_endpoint() {
            NodegroupShape::CustomEndpoint
        } else {
            NodegroupShape::Standard
        };

        let properties = NodegroupProperties {
            cluster_name: self.cluster.name.clone(),
            nodegroup_name: ng.name.clone(),
            node_role: node_role.reference,
            subnets,
            scaling_config,
            labels: ng.labels.clone(),
            tags,
            taints,
            ami_type: template.ami_type,
            capacity_type,
            instance_types: template.instance_types,
            launch_template: template.specification,
            release_version: ng.release_version().map(str::to_string),
            update_config: ng.update_config.as_ref().map(|u| NodegroupUpdateConfig {
                max_unavailable: u.max_unavailable,
                max_unavailable_percentage: u.max_unavailable_percentage,
            }),
            node_repair_config: ng.node_repair_config.as_ref().map(|r| NodeRepairConfig {
                enabled: r.enabled,
            }),
        };

        debug!(
            nodegroup = %name,
            cluster = %self.cluster.name,
            ami_type = ?properties.ami_type,
            capacity_type = ?properties.capacity_type,
            subnets = properties.subnets.len(),
            "nodegroup resources assembled"
        );
        info!(nodegroup = %name, cluster = %self.cluster.name, "synthesized managed nodegroup");

        Ok(ResourceGraph::new(
            description,
            node_role.resource,
            template.binding,
            NodegroupResource { shape, properties },
        ))
    }
}

// Capacity blocks take precedence over spot
fn capacity_type(ng: &NodeGroupSpec) -> Option<CapacityType> {
    if ng.is_capacity_block() {
        Some(CapacityType::CapacityBlock)
    } else if ng.spot {
        Some(CapacityType::Spot)
    } else {
        None
    }
}
