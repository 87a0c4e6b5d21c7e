//! Accelerator support matrix
//!
//! Which accelerator classes each image lineage supports, separately for
//! managed and unmanaged node groups. Standard instance types are supported
//! everywhere and have no rows. Adding a family or class means adding rows.

use strata_common::model::{
    AmiFamily, AmiLineage, InstanceClass, NodeGroupKind, NodeGroupSpec,
};
use strata_common::{Error, Result};

/// Outcome of a matrix lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Support {
    /// The combination is supported
    Allowed,
    /// The lineage does not support this accelerator class at all
    RejectedByClass,
    /// The lineage only supports this class on managed node groups
    RejectedForUnmanaged,
}

use self::Support::{Allowed, RejectedByClass, RejectedForUnmanaged};
use strata_common::model::InstanceClass::{Inferentia, Nvidia, Trainium};

/// (lineage, class, managed, unmanaged)
const SUPPORT_MATRIX: &[(AmiLineage, InstanceClass, Support, Support)] = &[
    (AmiLineage::AmazonLinux2023, Nvidia, Allowed, Allowed),
    (AmiLineage::AmazonLinux2023, Inferentia, Allowed, Allowed),
    (AmiLineage::AmazonLinux2023, Trainium, Allowed, Allowed),
    (AmiLineage::AmazonLinux2, Nvidia, Allowed, RejectedForUnmanaged),
    (AmiLineage::AmazonLinux2, Inferentia, RejectedByClass, RejectedByClass),
    (AmiLineage::AmazonLinux2, Trainium, RejectedByClass, RejectedByClass),
    (AmiLineage::Ubuntu, Nvidia, Allowed, Allowed),
    (AmiLineage::Ubuntu, Inferentia, Allowed, Allowed),
    (AmiLineage::Ubuntu, Trainium, Allowed, Allowed),
    (AmiLineage::Windows, Nvidia, Allowed, RejectedForUnmanaged),
    (AmiLineage::Windows, Inferentia, Allowed, RejectedForUnmanaged),
    (AmiLineage::Windows, Trainium, Allowed, RejectedForUnmanaged),
    (AmiLineage::Bottlerocket, Nvidia, Allowed, Allowed),
    (AmiLineage::Bottlerocket, Inferentia, RejectedByClass, RejectedByClass),
    (AmiLineage::Bottlerocket, Trainium, RejectedByClass, RejectedByClass),
];

/// Look up support for one instance class on an image family
pub fn support_for(family: AmiFamily, class: InstanceClass, kind: NodeGroupKind) -> Support {
    let lineage = family.lineage();
    SUPPORT_MATRIX
        .iter()
        .find(|(l, c, _, _)| *l == lineage && *c == class)
        .map(|(_, _, managed, unmanaged)| match kind {
            NodeGroupKind::Managed => *managed,
            NodeGroupKind::Unmanaged => *unmanaged,
        })
        .unwrap_or(Allowed)
}

/// Check every explicitly named instance type against the matrix
///
/// An explicit custom `ami` skips the check entirely. Node groups without
/// explicit instance types defer to the provisioner and always pass.
pub(crate) fn check_accelerator_support(ng: &NodeGroupSpec, kind: NodeGroupKind) -> Result<()> {
    if ng.custom_ami().is_some() {
        return Ok(());
    }

    let family = ng.effective_ami_family();
    let field = if ng.instance_types.is_empty() {
        "instanceType"
    } else {
        "instanceTypes"
    };

    for instance_type in ng.explicit_instance_types() {
        let class = InstanceClass::of(instance_type);
        let message = match support_for(family, class, kind) {
            Allowed => continue,
            RejectedByClass => {
                format!("{class} instance types are not supported for {family}")
            }
            RejectedForUnmanaged => format!(
                "{instance_type} instance types are not supported for unmanaged nodegroups with AMIFamily {family}"
            ),
        };
        return Err(Error::validation_for_field(&ng.name, field, message));
    }
    Ok(())
}
