//! Node group model
//!
//! - [`NodeGroupSpec`] - declarative node group (managed or unmanaged)
//! - [`ClusterContext`] - enclosing cluster: name, region, tags, endpoint
//! - [`AmiFamily`] / [`AmiType`] - image families and EKS AMI types
//! - [`InstanceClass`] - accelerator class of an instance type
//! - [`LaunchTemplateData`] - contents of a launch template

mod ami;
mod cluster;
mod instance;
mod launch_template;
mod nodegroup;

pub use ami::{AmiFamily, AmiLineage, AmiType};
pub use cluster::{ClusterContext, Partition};
pub use instance::{
    is_accelerated_instance_type, is_arm_instance_type, is_gpu_instance_type, InstanceClass,
};
pub use launch_template::{IamInstanceProfile, LaunchTemplateData};
pub use nodegroup::{
    InstanceMarketOptions, InstanceSelector, LaunchTemplateRef, NodeGroupIam, NodeGroupKind,
    NodeGroupSpec, NodeGroupSsh, NodeGroupTaint, NodeRepairConfig, Placement, UpdateConfig,
    CAPACITY_BLOCK_MARKET_TYPE,
};
