//! Resource graph produced by synthesis
//!
//! A [`ResourceGraph`] holds at most three resources: the node instance role
//! (unless an existing role is used), the launch template (unless an
//! existing one is referenced), and the managed node group itself. It is
//! immutable once built and renders to a CloudFormation-style document.

mod iam;
mod intrinsic;
mod nodegroup;

pub use iam::{IamRoleResource, IAM_ROLE_TYPE};
pub use intrinsic::PropertyValue;
pub use nodegroup::{
    CapacityType, LaunchTemplateSpecification, NodeRepairConfig, NodegroupProperties,
    NodegroupResource, NodegroupShape, NodegroupUpdateConfig, ScalingConfig, Taint, TaintEffect,
    NODEGROUP_BETA_TYPE, NODEGROUP_TYPE,
};

use serde_json::{json, Map, Value};

use strata_common::model::LaunchTemplateData;
use strata_common::{Error, Result};

/// Logical name of the synthesized node role
pub const NODE_INSTANCE_ROLE: &str = "NodeInstanceRole";

/// Logical name of the generated launch template
pub const LAUNCH_TEMPLATE: &str = "LaunchTemplate";

/// Logical name of the managed node group
pub const MANAGED_NODE_GROUP: &str = "ManagedNodeGroup";

/// Resource type for EC2 launch templates
pub const LAUNCH_TEMPLATE_TYPE: &str = "AWS::EC2::LaunchTemplate";

/// Name given to generated launch templates
pub const STACK_NAME_SUB: &str = "${AWS::StackName}";

/// Capabilities a renderer must acknowledge to create the graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    /// The graph creates IAM resources
    Iam,
    /// The graph creates IAM resources with explicit names
    NamedIam,
}

impl Capability {
    /// Engine constant for this capability
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iam => "CAPABILITY_IAM",
            Self::NamedIam => "CAPABILITY_NAMED_IAM",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A launch template created alongside the node group
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedLaunchTemplate {
    /// Template name, derived from the stack name
    pub name: PropertyValue,
    /// Template contents
    pub data: LaunchTemplateData,
}

impl GeneratedLaunchTemplate {
    /// Render the `Properties` block
    pub fn render_properties(&self) -> serde_json::Result<Value> {
        Ok(json!({
            "LaunchTemplateName": serde_json::to_value(&self.name)?,
            "LaunchTemplateData": serde_json::to_value(&self.data)?,
        }))
    }
}

/// Where the node group's launch template comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchTemplateBinding {
    /// An existing template referenced by id and optional version
    Explicit {
        /// Template id
        id: String,
        /// Template version; absent means the default version
        version: Option<String>,
        /// Instance type pinned for capacity blocks when the template has none
        instance_type: Option<String>,
    },
    /// A template created in the same graph
    Generated(GeneratedLaunchTemplate),
}

impl LaunchTemplateBinding {
    /// Instance type carried by the template side of the binding
    pub fn instance_type(&self) -> Option<&str> {
        match self {
            Self::Explicit { instance_type, .. } => instance_type.as_deref(),
            Self::Generated(template) => template.data.instance_type(),
        }
    }

    /// The generated template, if one is created
    pub fn generated(&self) -> Option<&GeneratedLaunchTemplate> {
        match self {
            Self::Explicit { .. } => None,
            Self::Generated(template) => Some(template),
        }
    }
}

/// Complete, self-consistent description of one managed node group
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceGraph {
    description: String,
    node_role: PropertyValue,
    role: Option<IamRoleResource>,
    launch_template: LaunchTemplateBinding,
    nodegroup: NodegroupResource,
}

impl ResourceGraph {
    pub(crate) fn new(
        description: String,
        role: Option<IamRoleResource>,
        launch_template: LaunchTemplateBinding,
        nodegroup: NodegroupResource,
    ) -> Self {
        Self {
            description,
            node_role: nodegroup.properties.node_role.clone(),
            role,
            launch_template,
            nodegroup,
        }
    }

    /// Human-readable description of the graph
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Node role reference used by the node group
    pub fn node_role(&self) -> &PropertyValue {
        &self.node_role
    }

    /// Synthesized role, absent when an existing role ARN is used
    pub fn role(&self) -> Option<&IamRoleResource> {
        self.role.as_ref()
    }

    /// Launch template binding
    pub fn launch_template(&self) -> &LaunchTemplateBinding {
        &self.launch_template
    }

    /// The node group resource
    pub fn nodegroup(&self) -> &NodegroupResource {
        &self.nodegroup
    }

    /// Node group properties
    pub fn properties(&self) -> &NodegroupProperties {
        &self.nodegroup.properties
    }

    /// Capabilities required to create this graph
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut capabilities = vec![Capability::Iam];
        if self.role.as_ref().is_some_and(|r| r.role_name.is_some()) {
            capabilities.push(Capability::NamedIam);
        }
        capabilities
    }

    /// Render every resource, keyed by logical name
    pub fn resources(&self) -> Result<Map<String, Value>> {
        let mut resources = Map::new();
        if let Some(role) = &self.role {
            let properties = role
                .render_properties()
                .map_err(|e| Error::serialization_for_kind(IAM_ROLE_TYPE, e.to_string()))?;
            resources.insert(
                NODE_INSTANCE_ROLE.to_string(),
                json!({ "Type": IAM_ROLE_TYPE, "Properties": properties }),
            );
        }
        if let Some(template) = self.launch_template.generated() {
            let properties = template
                .render_properties()
                .map_err(|e| Error::serialization_for_kind(LAUNCH_TEMPLATE_TYPE, e.to_string()))?;
            resources.insert(
                LAUNCH_TEMPLATE.to_string(),
                json!({ "Type": LAUNCH_TEMPLATE_TYPE, "Properties": properties }),
            );
        }

        let kind = self.nodegroup.resource_type();
        let properties = self
            .nodegroup
            .render_properties()
            .map_err(|e| Error::serialization_for_kind(kind, e.to_string()))?;
        resources.insert(
            MANAGED_NODE_GROUP.to_string(),
            json!({ "Type": kind, "Properties": properties }),
        );
        Ok(resources)
    }

    /// Render the graph as a document value
    pub fn to_value(&self) -> Result<Value> {
        Ok(json!({
            "Description": &self.description,
            "Resources": self.resources()?,
        }))
    }

    /// Render the graph as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_value()?)
            .map_err(|e| Error::serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn nodegroup(node_role: PropertyValue, template_id: PropertyValue) -> NodegroupResource {
        NodegroupResource {
            shape: NodegroupShape::Standard,
            properties: NodegroupProperties {
                cluster_name: "prod".to_string(),
                nodegroup_name: "workers".to_string(),
                node_role,
                subnets: vec!["subnet-a".to_string(), "subnet-b".to_string()],
                scaling_config: ScalingConfig::default(),
                labels: BTreeMap::new(),
                tags: BTreeMap::new(),
                taints: vec![],
                ami_type: None,
                capacity_type: None,
                instance_types: vec!["m5.large".to_string()],
                launch_template: LaunchTemplateSpecification {
                    id: template_id,
                    version: None,
                },
                release_version: None,
                update_config: None,
                node_repair_config: None,
            },
        }
    }

    fn role(name: Option<&str>) -> IamRoleResource {
        IamRoleResource {
            role_name: name.map(str::to_string),
            service_principal: "ec2.amazonaws.com".to_string(),
            managed_policy_arns: vec![],
            permissions_boundary: None,
        }
    }

    fn generated() -> LaunchTemplateBinding {
        LaunchTemplateBinding::Generated(GeneratedLaunchTemplate {
            name: PropertyValue::Sub(STACK_NAME_SUB.to_string()),
            data: LaunchTemplateData::default(),
        })
    }

    #[test]
    fn full_graph_renders_three_resources() {
        let graph = ResourceGraph::new(
            "EKS Managed Nodes (SSH access: false) [created by strata]".to_string(),
            Some(role(None)),
            generated(),
            nodegroup(
                PropertyValue::get_att(NODE_INSTANCE_ROLE, "Arn"),
                PropertyValue::reference(LAUNCH_TEMPLATE),
            ),
        );

        let doc = graph.to_value().expect("render");
        let resources = &doc["Resources"];
        assert_eq!(resources["NodeInstanceRole"]["Type"], "AWS::IAM::Role");
        assert_eq!(resources["LaunchTemplate"]["Type"], "AWS::EC2::LaunchTemplate");
        assert_eq!(
            resources["LaunchTemplate"]["Properties"]["LaunchTemplateName"],
            json!({ "Fn::Sub": "${AWS::StackName}" })
        );
        assert_eq!(
            resources["ManagedNodeGroup"]["Properties"]["LaunchTemplate"]["Id"],
            json!({ "Ref": "LaunchTemplate" })
        );
        assert_eq!(
            resources["ManagedNodeGroup"]["Properties"]["NodeRole"],
            json!({ "Fn::GetAtt": ["NodeInstanceRole", "Arn"] })
        );
        assert_eq!(doc["Description"], graph.description());
        assert_eq!(graph.capabilities(), vec![Capability::Iam]);
    }

    #[test]
    fn existing_role_and_template_render_only_the_nodegroup() {
        let graph = ResourceGraph::new(
            String::new(),
            None,
            LaunchTemplateBinding::Explicit {
                id: "lt-0abc".to_string(),
                version: Some("3".to_string()),
                instance_type: None,
            },
            nodegroup(
                PropertyValue::literal("arn:aws:iam::1:role/nodes"),
                PropertyValue::literal("lt-0abc"),
            ),
        );
        let resources = graph.resources().expect("render");
        assert_eq!(resources.len(), 1);
        assert!(resources.contains_key(MANAGED_NODE_GROUP));
        assert_eq!(graph.node_role().as_literal(), Some("arn:aws:iam::1:role/nodes"));
        assert!(graph.launch_template().generated().is_none());
    }

    #[test]
    fn named_role_requires_named_capability() {
        let graph = ResourceGraph::new(
            String::new(),
            Some(role(Some("gpu-nodes"))),
            generated(),
            nodegroup(
                PropertyValue::get_att(NODE_INSTANCE_ROLE, "Arn"),
                PropertyValue::reference(LAUNCH_TEMPLATE),
            ),
        );
        let capabilities: Vec<_> = graph.capabilities().iter().map(Capability::as_str).collect();
        assert_eq!(capabilities, vec!["CAPABILITY_IAM", "CAPABILITY_NAMED_IAM"]);
    }

    #[test]
    fn to_json_is_pretty_printed() {
        let graph = ResourceGraph::new(
            "d".to_string(),
            None,
            generated(),
            nodegroup(
                PropertyValue::literal("arn:aws:iam::1:role/nodes"),
                PropertyValue::reference(LAUNCH_TEMPLATE),
            ),
        );
        let text = graph.to_json().expect("render");
        assert!(text.contains('\n'));
        let parsed: Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(parsed["Description"], "d");
    }
}
