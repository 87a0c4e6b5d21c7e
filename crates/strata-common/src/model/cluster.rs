//! Cluster context shared by every node group of a cluster

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Enclosing cluster of a node group
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterContext {
    /// Cluster name
    pub name: String,

    /// AWS region (e.g., "us-west-2", "cn-north-1")
    #[serde(default)]
    pub region: String,

    /// Tags propagated to node groups that do not define the same key
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    /// EKS API endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eks_endpoint: Option<String>,

    /// IAM OIDC provider enabled (aws-node gets its own role)
    #[serde(default, rename = "withOIDC")]
    pub with_oidc: bool,
}

impl ClusterContext {
    /// Create a cluster context for the given name and region
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            ..Default::default()
        }
    }

    /// AWS partition the cluster lives in
    pub fn partition(&self) -> Partition {
        Partition::for_region(&self.region)
    }

    /// Standard regional EKS endpoint
    pub fn standard_eks_endpoint(&self) -> String {
        format!(
            "https://eks.{}.{}",
            self.region,
            self.partition().dns_suffix()
        )
    }

    /// Returns true if the cluster targets a non-standard EKS endpoint
    pub fn is_custom_eks_endpoint(&self) -> bool {
        match self.eks_endpoint.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(endpoint) => {
                endpoint.trim_end_matches('/') != self.standard_eks_endpoint()
            }
        }
    }
}

/// AWS partition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Commercial regions
    Aws,
    /// China regions
    AwsCn,
    /// GovCloud regions
    AwsUsGov,
    /// ISO regions
    AwsIso,
    /// ISO-B regions
    AwsIsoB,
}

impl Partition {
    /// Partition of a region, by region-name prefix
    pub fn for_region(region: &str) -> Self {
        if region.starts_with("cn-") {
            Self::AwsCn
        } else if region.starts_with("us-gov-") {
            Self::AwsUsGov
        } else if region.starts_with("us-isob-") {
            Self::AwsIsoB
        } else if region.starts_with("us-iso-") {
            Self::AwsIso
        } else {
            Self::Aws
        }
    }

    /// Partition id as it appears in ARNs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::AwsCn => "aws-cn",
            Self::AwsUsGov => "aws-us-gov",
            Self::AwsIso => "aws-iso",
            Self::AwsIsoB => "aws-iso-b",
        }
    }

    /// Parse a partition id taken from an ARN
    pub fn from_arn_partition(partition: &str) -> Option<Self> {
        match partition {
            "aws" => Some(Self::Aws),
            "aws-cn" => Some(Self::AwsCn),
            "aws-us-gov" => Some(Self::AwsUsGov),
            "aws-iso" => Some(Self::AwsIso),
            "aws-iso-b" => Some(Self::AwsIsoB),
            _ => None,
        }
    }

    /// DNS suffix for service endpoints
    pub fn dns_suffix(&self) -> &'static str {
        match self {
            Self::Aws | Self::AwsUsGov => "amazonaws.com",
            Self::AwsCn => "amazonaws.com.cn",
            Self::AwsIso => "c2s.ic.gov",
            Self::AwsIsoB => "sc2s.sgov.gov",
        }
    }

    /// EC2 service principal used in node role trust policies
    pub fn ec2_service_principal(&self) -> String {
        format!("ec2.{}", self.dns_suffix())
    }

    /// ARN of an AWS managed IAM policy in this partition
    pub fn managed_policy_arn(&self, policy: &str) -> String {
        format!("arn:{}:iam::aws:policy/{}", self.as_str(), policy)
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
