//! Node role resolution

use strata_common::model::{ClusterContext, NodeGroupIam, Partition};

use crate::resource::{IamRoleResource, PropertyValue, NODE_INSTANCE_ROLE};

const DEFAULT_NODE_POLICIES: &[&str] = &[
    "AmazonEKSWorkerNodePolicy",
    "AmazonEC2ContainerRegistryReadOnly",
    "AmazonSSMManagedInstanceCore",
];

const CNI_POLICY: &str = "AmazonEKS_CNI_Policy";

/// Node role reference plus the role resource when one must be created
pub(crate) struct NodeRole {
    pub reference: PropertyValue,
    pub resource: Option<IamRoleResource>,
}

/// Use the configured role ARN, or describe a new role
pub(crate) fn resolve_node_role(
    iam: &NodeGroupIam,
    cluster: &ClusterContext,
    force_add_cni_policy: bool,
) -> Result<NodeRole, String> {
    if let Some(arn) = iam.role_arn() {
        return Ok(NodeRole {
            reference: PropertyValue::literal(normalize_arn(arn)?),
            resource: None,
        });
    }

    Ok(NodeRole {
        reference: PropertyValue::get_att(NODE_INSTANCE_ROLE, "Arn"),
        resource: Some(node_role_resource(iam, cluster, force_add_cni_policy)),
    })
}

/// Strip the path from an IAM role ARN
///
/// `arn:aws:iam::123456789012:role/team/nodes` becomes
/// `arn:aws:iam::123456789012:role/nodes`. The node group API rejects role
/// ARNs that carry a path.
pub fn normalize_arn(arn: &str) -> Result<String, String> {
    let invalid = || format!("invalid instance role ARN {arn:?}");

    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    let &[prefix, partition, service, _region, account, resource] = parts.as_slice() else {
        return Err(invalid());
    };
    if prefix != "arn"
        || Partition::from_arn_partition(partition).is_none()
        || service != "iam"
        || account.is_empty()
    {
        return Err(invalid());
    }

    let segments: Vec<&str> = resource.split('/').collect();
    match segments.as_slice() {
        ["role", .., name] if !name.is_empty() => Ok(format!(
            "arn:{partition}:{service}::{account}:role/{name}"
        )),
        _ => Err(invalid()),
    }
}

fn node_role_resource(
    iam: &NodeGroupIam,
    cluster: &ClusterContext,
    force_add_cni_policy: bool,
) -> IamRoleResource {
    let partition = cluster.partition();

    let mut managed_policy_arns: Vec<String> = if iam.attach_policy_arns.is_empty() {
        let mut defaults: Vec<String> = DEFAULT_NODE_POLICIES
            .iter()
            .map(|policy| partition.managed_policy_arn(policy))
            .collect();
        if !cluster.with_oidc {
            defaults.push(partition.managed_policy_arn(CNI_POLICY));
        }
        defaults
    } else {
        iam.attach_policy_arns.clone()
    };

    let cni_policy = partition.managed_policy_arn(CNI_POLICY);
    if force_add_cni_policy && !managed_policy_arns.contains(&cni_policy) {
        managed_policy_arns.push(cni_policy);
    }

    IamRoleResource {
        role_name: iam.role_name().map(str::to_string),
        service_principal: partition.ec2_service_principal(),
        managed_policy_arns,
        permissions_boundary: iam
            .instance_role_permissions_boundary
            .clone()
            .filter(|b| !b.is_empty()),
    }
}
