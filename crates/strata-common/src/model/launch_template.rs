//! Launch template data
//!
//! Mirrors the EC2 `LaunchTemplateData` shape for the fields this crate
//! inspects or writes. Used both for templates fetched from EC2 and for
//! templates generated from a node group.

use serde::{Deserialize, Serialize};

/// Launch template contents
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchTemplateData {
    /// Embedded image id (custom AMI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,

    /// Embedded instance type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,

    /// Embedded IAM instance profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_instance_profile: Option<IamInstanceProfile>,

    /// Base64 boot script
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
}

impl LaunchTemplateData {
    /// Embedded image id, treating an empty string as unset
    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref().filter(|s| !s.is_empty())
    }

    /// Embedded instance type, treating an empty string as unset
    pub fn instance_type(&self) -> Option<&str> {
        self.instance_type.as_deref().filter(|s| !s.is_empty())
    }

    /// Embedded instance profile ARN, if any
    pub fn iam_instance_profile_arn(&self) -> Option<&str> {
        self.iam_instance_profile
            .as_ref()
            .and_then(|p| p.arn.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Returns true if a boot script is embedded
    pub fn has_user_data(&self) -> bool {
        self.user_data.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// IAM instance profile reference
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct IamInstanceProfile {
    /// Instance profile ARN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}
