//! Node instance role resource

use serde::Serialize;
use serde_json::json;

/// Resource type for IAM roles
pub const IAM_ROLE_TYPE: &str = "AWS::IAM::Role";

/// IAM role assumed by node instances
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IamRoleResource {
    /// Explicit role name; requires the named-IAM capability
    pub role_name: Option<String>,
    /// Service principal allowed to assume the role (e.g., "ec2.amazonaws.com")
    pub service_principal: String,
    /// Attached managed policy ARNs, in attachment order
    pub managed_policy_arns: Vec<String>,
    /// Permissions boundary policy ARN
    pub permissions_boundary: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RoleProperties<'a> {
    assume_role_policy_document: serde_json::Value,
    managed_policy_arns: &'a [String],
    path: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    permissions_boundary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role_name: Option<&'a str>,
}

impl IamRoleResource {
    /// Render the `Properties` block
    pub fn render_properties(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(RoleProperties {
            assume_role_policy_document: json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": [&self.service_principal] },
                    "Action": ["sts:AssumeRole"],
                }],
            }),
            managed_policy_arns: &self.managed_policy_arns,
            path: "/",
            permissions_boundary: self.permissions_boundary.as_deref(),
            role_name: self.role_name.as_deref(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_trust_policy_and_optional_fields() {
        let role = IamRoleResource {
            role_name: None,
            service_principal: "ec2.amazonaws.com.cn".to_string(),
            managed_policy_arns: vec![
                "arn:aws-cn:iam::aws:policy/AmazonEKSWorkerNodePolicy".to_string(),
            ],
            permissions_boundary: None,
        };
        let rendered = role.render_properties().expect("render");
        assert_eq!(
            rendered["AssumeRolePolicyDocument"]["Statement"][0]["Principal"]["Service"][0],
            "ec2.amazonaws.com.cn"
        );
        assert_eq!(rendered["Path"], "/");
        assert!(rendered.get("RoleName").is_none());
        assert!(rendered.get("PermissionsBoundary").is_none());

        let named = IamRoleResource {
            role_name: Some("gpu-nodes".to_string()),
            permissions_boundary: Some("arn:aws:iam::1:policy/boundary".to_string()),
            ..role
        };
        let rendered = named.render_properties().expect("render");
        assert_eq!(rendered["RoleName"], "gpu-nodes");
        assert_eq!(rendered["PermissionsBoundary"], "arn:aws:iam::1:policy/boundary");
    }
}
