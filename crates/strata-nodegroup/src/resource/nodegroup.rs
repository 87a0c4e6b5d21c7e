//! Managed node group resource
//!
//! Field names follow the `AWS::EKS::Nodegroup` schema and must not change.

use std::collections::BTreeMap;

use serde::Serialize;

use strata_common::model::AmiType;

use super::PropertyValue;

/// Resource type for the standard EKS endpoint
pub const NODEGROUP_TYPE: &str = "AWS::EKS::Nodegroup";

/// Resource type for clusters on a custom EKS endpoint
pub const NODEGROUP_BETA_TYPE: &str = "AWS::EKSBeta::Nodegroup";

/// Capacity purchase option for node group instances
///
/// On-demand is the engine default and is expressed by omitting the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CapacityType {
    /// Spot instances
    #[serde(rename = "SPOT")]
    Spot,
    /// Reserved capacity blocks
    #[serde(rename = "CAPACITY_BLOCK")]
    CapacityBlock,
}

impl CapacityType {
    /// Engine constant for this capacity type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spot => "SPOT",
            Self::CapacityBlock => "CAPACITY_BLOCK",
        }
    }
}

/// Taint effects accepted by the node group schema
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaintEffect {
    /// Do not schedule new pods
    NoSchedule,
    /// Avoid scheduling new pods
    PreferNoSchedule,
    /// Evict running pods
    NoExecute,
}

impl TaintEffect {
    /// Kubernetes spelling of the effect
    pub fn kubernetes_name(&self) -> &'static str {
        match self {
            Self::NoSchedule => "NoSchedule",
            Self::PreferNoSchedule => "PreferNoSchedule",
            Self::NoExecute => "NoExecute",
        }
    }
}

impl std::str::FromStr for TaintEffect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NoSchedule" => Ok(Self::NoSchedule),
            "PreferNoSchedule" => Ok(Self::PreferNoSchedule),
            "NoExecute" => Ok(Self::NoExecute),
            other => Err(format!("unexpected taint effect: {other}")),
        }
    }
}

/// A taint as the node group schema expects it
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Taint {
    /// Taint key
    pub key: String,
    /// Taint value
    pub value: String,
    /// Mapped effect
    pub effect: TaintEffect,
}

/// Scaling bounds; unset bounds are omitted rather than zeroed
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScalingConfig {
    /// Minimum size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,
    /// Maximum size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,
    /// Desired size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_size: Option<u32>,
}

impl ScalingConfig {
    /// Returns true if no bound is set
    pub fn is_empty(&self) -> bool {
        self.min_size.is_none() && self.max_size.is_none() && self.desired_size.is_none()
    }
}

/// Launch template binding on the node group
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchTemplateSpecification {
    /// Template id, literal or a reference to a generated template
    pub id: PropertyValue,
    /// Template version; omitted means the template's default version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Rolling update settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodegroupUpdateConfig {
    /// Maximum unavailable nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<u32>,
    /// Maximum unavailable nodes as a percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_unavailable_percentage: Option<u32>,
}

/// Node auto repair settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeRepairConfig {
    /// Enable auto repair
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Properties of a managed node group resource
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodegroupProperties {
    /// Cluster the node group joins
    pub cluster_name: String,
    /// Node group name
    pub nodegroup_name: String,
    /// Node IAM role ARN
    pub node_role: PropertyValue,
    /// Subnet ids
    pub subnets: Vec<String>,
    /// Scaling bounds
    #[serde(skip_serializing_if = "ScalingConfig::is_empty")]
    pub scaling_config: ScalingConfig,
    /// Kubernetes labels
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Resource tags, cluster tags merged in
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    /// Kubernetes taints
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<Taint>,
    /// AMI type; omitted when the launch template carries an image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ami_type: Option<AmiType>,
    /// Capacity type; omitted for on-demand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_type: Option<CapacityType>,
    /// Instance types; omitted when the launch template carries one
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub instance_types: Vec<String>,
    /// Launch template binding
    pub launch_template: LaunchTemplateSpecification,
    /// AMI release version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_version: Option<String>,
    /// Rolling update settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_config: Option<NodegroupUpdateConfig>,
    /// Auto repair settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_repair_config: Option<NodeRepairConfig>,
}

/// Structural wrapping of the node group resource
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodegroupShape {
    /// `AWS::EKS::Nodegroup` with flat properties
    Standard,
    /// `AWS::EKSBeta::Nodegroup` with properties nested under `Nodegroup`
    CustomEndpoint,
}

/// The node group resource with its shape
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodegroupResource {
    /// Structural wrapping
    pub shape: NodegroupShape,
    /// Logical properties, identical for both shapes
    pub properties: NodegroupProperties,
}

impl NodegroupResource {
    /// Engine resource type for this shape
    pub fn resource_type(&self) -> &'static str {
        match self.shape {
            NodegroupShape::Standard => NODEGROUP_TYPE,
            NodegroupShape::CustomEndpoint => NODEGROUP_BETA_TYPE,
        }
    }

    /// Render the `Properties` block for this shape
    pub fn render_properties(&self) -> serde_json::Result<serde_json::Value> {
        let mut properties = serde_json::to_value(&self.properties)?;
        match self.shape {
            NodegroupShape::Standard => Ok(properties),
            NodegroupShape::CustomEndpoint => {
                if let Some(object) = properties.as_object_mut() {
                    object.remove("ClusterName");
                }
                Ok(serde_json::json!({
                    "ClusterName": &self.properties.cluster_name,
                    "Nodegroup": properties,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn properties() -> NodegroupProperties {
        NodegroupProperties {
            cluster_name: "prod".to_string(),
            nodegroup_name: "workers".to_string(),
            node_role: PropertyValue::literal("arn:aws:iam::123456789012:role/nodes"),
            subnets: vec!["subnet-a".to_string()],
            scaling_config: ScalingConfig {
                min_size: Some(1),
                ..Default::default()
            },
            labels: BTreeMap::new(),
            tags: BTreeMap::new(),
            taints: vec![Taint {
                key: "gpu".to_string(),
                value: "true".to_string(),
                effect: TaintEffect::PreferNoSchedule,
            }],
            ami_type: Some(AmiType::AL2023_x86_64_STANDARD),
            capacity_type: None,
            instance_types: vec![],
            launch_template: LaunchTemplateSpecification {
                id: PropertyValue::literal("lt-0abc"),
                version: None,
            },
            release_version: None,
            update_config: None,
            node_repair_config: None,
        }
    }

    #[test]
    fn standard_shape_is_flat() {
        let resource = NodegroupResource {
            shape: NodegroupShape::Standard,
            properties: properties(),
        };
        assert_eq!(resource.resource_type(), "AWS::EKS::Nodegroup");
        let rendered = resource.render_properties().expect("render");
        assert_eq!(rendered["ClusterName"], "prod");
        assert_eq!(rendered["ScalingConfig"], json!({ "MinSize": 1 }));
        assert_eq!(rendered["Taints"][0]["Effect"], "PREFER_NO_SCHEDULE");
        assert_eq!(rendered["LaunchTemplate"], json!({ "Id": "lt-0abc" }));
        assert!(rendered.get("CapacityType").is_none());
        assert!(rendered.get("InstanceTypes").is_none());
        assert!(rendered.get("Labels").is_none());
    }

    #[test]
    fn custom_endpoint_shape_nests_the_same_fields() {
        let standard = NodegroupResource {
            shape: NodegroupShape::Standard,
            properties: properties(),
        };
        let beta = NodegroupResource {
            shape: NodegroupShape::CustomEndpoint,
            properties: properties(),
        };
        assert_eq!(beta.resource_type(), "AWS::EKSBeta::Nodegroup");

        let flat = standard.render_properties().expect("render");
        let nested = beta.render_properties().expect("render");
        assert_eq!(nested["ClusterName"], "prod");
        assert!(nested["Nodegroup"].get("ClusterName").is_none());
        assert_eq!(nested["Nodegroup"]["NodegroupName"], flat["NodegroupName"]);
        assert_eq!(nested["Nodegroup"]["AmiType"], "AL2023_x86_64_STANDARD");
    }

    #[test]
    fn taint_effects_parse_from_kubernetes_names() {
        for effect in [
            TaintEffect::NoSchedule,
            TaintEffect::PreferNoSchedule,
            TaintEffect::NoExecute,
        ] {
            assert_eq!(effect.kubernetes_name().parse::<TaintEffect>(), Ok(effect));
        }
        assert_eq!(
            "NO_SCHEDULE".parse::<TaintEffect>(),
            Err("unexpected taint effect: NO_SCHEDULE".to_string())
        );
    }

    #[test]
    fn capacity_types_use_engine_constants() {
        assert_eq!(
            serde_json::to_value(CapacityType::CapacityBlock).expect("serialize"),
            json!("CAPACITY_BLOCK")
        );
        assert_eq!(CapacityType::Spot.as_str(), "SPOT");
    }
}
