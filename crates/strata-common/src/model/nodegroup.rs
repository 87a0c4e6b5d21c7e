//! Node group specification
//!
//! One struct describes both managed and unmanaged node groups; the
//! [`NodeGroupKind`] passed alongside it selects which compatibility rules
//! apply. Field names follow the camelCase configuration format.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ami::AmiFamily;
use super::instance::is_accelerated_instance_type;

/// Market type that reserves capacity blocks
pub const CAPACITY_BLOCK_MARKET_TYPE: &str = "capacity-block";

/// Whether the platform or the operator manages node lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeGroupKind {
    /// EKS managed node group
    Managed,
    /// Self-managed (unmanaged) node group
    Unmanaged,
}

impl NodeGroupKind {
    /// Returns true for managed node groups
    pub fn is_managed(&self) -> bool {
        matches!(self, Self::Managed)
    }

    /// Configuration key listing node groups of this kind
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::Managed => "managedNodeGroups",
            Self::Unmanaged => "nodeGroups",
        }
    }
}

impl std::fmt::Display for NodeGroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Managed => write!(f, "managed"),
            Self::Unmanaged => write!(f, "unmanaged"),
        }
    }
}

/// Declarative node group specification
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupSpec {
    /// Node group name
    pub name: String,

    /// Image family for node hosts (defaults to AmazonLinux2 when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ami_family: Option<AmiFamily>,

    /// Single instance type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,

    /// Ordered list of instance types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instance_types: Vec<String>,

    /// Criteria for letting the provisioner pick an instance type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_selector: Option<InstanceSelector>,

    /// Explicit custom image id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ami: Option<String>,

    /// Existing launch template to use instead of a generated one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_template: Option<LaunchTemplateRef>,

    /// Minimum number of nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,

    /// Maximum number of nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,

    /// Desired number of nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_capacity: Option<u32>,

    /// Rolling update settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_config: Option<UpdateConfig>,

    /// Automatic node repair settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_repair_config: Option<NodeRepairConfig>,

    /// Run on spot capacity
    #[serde(default)]
    pub spot: bool,

    /// Market options (e.g., capacity blocks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_market_options: Option<InstanceMarketOptions>,

    /// EKS-optimized AMI release version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_version: Option<String>,

    /// Kubernetes taints applied to every node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<NodeGroupTaint>,

    /// Kubernetes labels applied to every node
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// AWS resource tags
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    /// Node IAM role settings
    #[serde(default)]
    pub iam: NodeGroupIam,

    /// SSH access settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<NodeGroupSsh>,

    /// Placement constraints consumed by the subnet resolver
    #[serde(flatten)]
    pub placement: Placement,
}

impl NodeGroupSpec {
    /// Create a node group spec with the given name and defaults elsewhere
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Effective image family used for compatibility and AMI-type decisions
    pub fn effective_ami_family(&self) -> AmiFamily {
        self.ami_family.unwrap_or(AmiFamily::DEFAULT)
    }

    /// Explicit custom image id, treating an empty string as unset
    pub fn custom_ami(&self) -> Option<&str> {
        non_empty(self.ami.as_deref())
    }

    /// Release version, treating an empty string as unset
    pub fn release_version(&self) -> Option<&str> {
        non_empty(self.release_version.as_deref())
    }

    /// Single instance type, treating an empty string as unset
    pub fn instance_type(&self) -> Option<&str> {
        non_empty(self.instance_type.as_deref())
    }

    /// Instance types named explicitly by the operator
    ///
    /// The single `instanceType` comes first, then every entry of
    /// `instanceTypes`. Empty when the provisioner picks the type.
    pub fn explicit_instance_types(&self) -> Vec<&str> {
        self.instance_type()
            .into_iter()
            .chain(self.instance_types.iter().map(String::as_str))
            .collect()
    }

    /// Instance types for the node group resource
    ///
    /// `instanceTypes` when non-empty, otherwise the single `instanceType`.
    pub fn instance_type_list(&self) -> Vec<String> {
        if !self.instance_types.is_empty() {
            self.instance_types.clone()
        } else {
            self.instance_type().map(str::to_string).into_iter().collect()
        }
    }

    /// Representative instance type for AMI-type selection
    ///
    /// Prefers the first accelerator type in `instanceTypes`, so a mixed
    /// list selects the accelerator-capable image, then the first entry,
    /// then the single `instanceType`.
    pub fn representative_instance_type(&self) -> Option<&str> {
        if let Some(first) = self.instance_types.first() {
            let accelerated = self
                .instance_types
                .iter()
                .find(|it| is_accelerated_instance_type(it));
            return Some(accelerated.unwrap_or(first).as_str());
        }
        self.instance_type()
    }

    /// Returns true if the node group requests capacity-block capacity
    pub fn is_capacity_block(&self) -> bool {
        self.instance_market_options
            .as_ref()
            .is_some_and(InstanceMarketOptions::is_capacity_block)
    }

    /// Returns true if SSH access is allowed on the nodes
    pub fn ssh_allowed(&self) -> bool {
        self.ssh.as_ref().and_then(|s| s.allow).unwrap_or(false)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Instance selection criteria resolved by the provisioner
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct InstanceSelector {
    /// Number of vCPUs (0 or absent means unconstrained)
    #[serde(default, rename = "vCPUs", skip_serializing_if = "Option::is_none")]
    pub vcpus: Option<u32>,

    /// Memory, e.g. "16" or "16GiB"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,

    /// Number of GPUs (absent means unconstrained)
    #[serde(default, rename = "GPUs", skip_serializing_if = "Option::is_none")]
    pub gpus: Option<u32>,
}

impl InstanceSelector {
    /// Returns true if the selector can resolve to a GPU instance type
    ///
    /// That is the case when vCPU criteria are present and the GPU count is
    /// either unconstrained or non-zero.
    pub fn implies_gpu(&self) -> bool {
        let has_vcpus = self.vcpus.is_some_and(|v| v > 0);
        let gpus_allowed = self.gpus != Some(0);
        has_vcpus && gpus_allowed
    }
}

/// Reference to an existing EC2 launch template
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchTemplateRef {
    /// Launch template id (e.g., "lt-0abc")
    pub id: String,
    /// Version; absent means the template's default version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Rolling update settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfig {
    /// Maximum unavailable nodes during an update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<u32>,
    /// Maximum unavailable nodes as a percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable_percentage: Option<u32>,
}

/// Automatic node repair settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeRepairConfig {
    /// Enable node auto repair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// EC2 market options
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceMarketOptions {
    /// Market type (e.g., "capacity-block")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_type: Option<String>,
}

impl InstanceMarketOptions {
    /// Returns true if this selects the capacity-block market
    pub fn is_capacity_block(&self) -> bool {
        self.market_type.as_deref() == Some(CAPACITY_BLOCK_MARKET_TYPE)
    }
}

/// Kubernetes taint as written in configuration
///
/// The effect is kept as a string; it is checked against the closed set of
/// effects during synthesis.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct NodeGroupTaint {
    /// Taint key
    pub key: String,
    /// Taint value
    #[serde(default)]
    pub value: String,
    /// Taint effect (NoSchedule, PreferNoSchedule, NoExecute)
    pub effect: String,
}

impl NodeGroupTaint {
    /// Create a taint
    pub fn new(key: impl Into<String>, value: impl Into<String>, effect: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            effect: effect.into(),
        }
    }
}

/// Node IAM role settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupIam {
    /// Existing role to use instead of creating one
    #[serde(
        default,
        rename = "instanceRoleARN",
        skip_serializing_if = "Option::is_none"
    )]
    pub instance_role_arn: Option<String>,

    /// Name for the created role (requires named-IAM capability)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_role_name: Option<String>,

    /// Managed policies replacing the default set
    #[serde(
        default,
        rename = "attachPolicyARNs",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub attach_policy_arns: Vec<String>,

    /// Permissions boundary for the created role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_role_permissions_boundary: Option<String>,
}

impl NodeGroupIam {
    /// Existing role ARN, treating an empty string as unset
    pub fn role_arn(&self) -> Option<&str> {
        non_empty(self.instance_role_arn.as_deref())
    }

    /// Role name for the created role, treating an empty string as unset
    pub fn role_name(&self) -> Option<&str> {
        non_empty(self.instance_role_name.as_deref())
    }
}

/// SSH access settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupSsh {
    /// Allow SSH access to nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<bool>,
}

/// Placement constraints for subnet resolution
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Availability zones to restrict nodes to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub availability_zones: Vec<String>,

    /// Explicit subnet ids or names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<String>,

    /// Place nodes in private subnets
    #[serde(default)]
    pub private_networking: bool,
}
