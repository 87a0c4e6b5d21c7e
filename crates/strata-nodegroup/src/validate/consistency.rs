//! Field consistency rules
//!
//! Checks that a node group's own fields agree with each other and with its
//! kind. Runs after the accelerator matrix; the first violation wins.

use strata_common::model::{NodeGroupKind, NodeGroupSpec};
use strata_common::{Error, Result};

pub(crate) fn check_consistency(ng: &NodeGroupSpec, kind: NodeGroupKind) -> Result<()> {
    check_instance_type_fields(ng)?;
    check_scaling(ng)?;
    check_update_config(ng)?;
    check_launch_template_ref(ng)?;
    if !kind.is_managed() {
        check_managed_only_fields(ng)?;
    }
    Ok(())
}

fn check_instance_type_fields(ng: &NodeGroupSpec) -> Result<()> {
    if ng.instance_type().is_some() && !ng.instance_types.is_empty() {
        return Err(Error::validation_for_field(
            &ng.name,
            "instanceTypes",
            "instanceType and instanceTypes are mutually exclusive",
        ));
    }
    if ng.instance_types.iter().any(String::is_empty) {
        return Err(Error::validation_for_field(
            &ng.name,
            "instanceTypes",
            "instanceTypes must not contain empty entries",
        ));
    }
    Ok(())
}

fn check_scaling(ng: &NodeGroupSpec) -> Result<()> {
    if let (Some(min), Some(max)) = (ng.min_size, ng.max_size) {
        if min > max {
            return Err(Error::validation_for_field(
                &ng.name,
                "minSize",
                format!("minSize ({min}) cannot be greater than maxSize ({max})"),
            ));
        }
    }

    let Some(desired) = ng.desired_capacity else {
        return Ok(());
    };
    if let Some(min) = ng.min_size.filter(|min| desired < *min) {
        return Err(Error::validation_for_field(
            &ng.name,
            "desiredCapacity",
            format!("desiredCapacity ({desired}) cannot be less than minSize ({min})"),
        ));
    }
    if let Some(max) = ng.max_size.filter(|max| desired > *max) {
        return Err(Error::validation_for_field(
            &ng.name,
            "desiredCapacity",
            format!("desiredCapacity ({desired}) cannot be greater than maxSize ({max})"),
        ));
    }
    Ok(())
}

fn check_update_config(ng: &NodeGroupSpec) -> Result<()> {
    let Some(update) = &ng.update_config else {
        return Ok(());
    };
    let invalid = |msg: String| Err(Error::validation_for_field(&ng.name, "updateConfig", msg));

    match (update.max_unavailable, update.max_unavailable_percentage) {
        (Some(_), Some(_)) => invalid(
            "cannot use maxUnavailable and maxUnavailablePercentage at the same time".to_string(),
        ),
        (None, None) => invalid(
            "one of maxUnavailable or maxUnavailablePercentage must be set".to_string(),
        ),
        (Some(0), None) => invalid("maxUnavailable must be at least 1".to_string()),
        (None, Some(pct)) if pct == 0 || pct > 100 => invalid(format!(
            "maxUnavailablePercentage must be between 1 and 100, got {pct}"
        )),
        _ => Ok(()),
    }
}

fn check_launch_template_ref(ng: &NodeGroupSpec) -> Result<()> {
    match &ng.launch_template {
        Some(lt) if lt.id.is_empty() => Err(Error::validation_for_field(
            &ng.name,
            "launchTemplate.id",
            "launchTemplate.id must be set",
        )),
        _ => Ok(()),
    }
}

fn check_managed_only_fields(ng: &NodeGroupSpec) -> Result<()> {
    let managed_only = [
        ("launchTemplate", ng.launch_template.is_some()),
        ("updateConfig", ng.update_config.is_some()),
        ("nodeRepairConfig", ng.node_repair_config.is_some()),
        ("releaseVersion", ng.release_version().is_some()),
    ];
    match managed_only.iter().find(|(_, set)| *set) {
        Some((field, _)) => Err(Error::validation_for_field(
            &ng.name,
            *field,
            format!("{field} is only supported for managed nodegroups"),
        )),
        None => Ok(()),
    }
}
