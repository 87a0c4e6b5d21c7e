//! Launch template resolution
//!
//! A node group either references an existing template or gets a new one
//! generated from bootstrap data. Both paths decide the AMI type and where
//! the instance types go: on the node group, or pinned on the template when
//! capacity blocks are used.

use tracing::debug;

use strata_common::model::{
    AmiType, ClusterContext, LaunchTemplateData, LaunchTemplateRef, NodeGroupSpec,
};
use strata_common::{Error, Result};

use crate::resource::{
    GeneratedLaunchTemplate, LaunchTemplateBinding, LaunchTemplateSpecification, PropertyValue,
    LAUNCH_TEMPLATE, STACK_NAME_SUB,
};
use crate::Collaborators;

const NODEGROUP_FIELD: &str = "managedNodeGroup";

/// Where the launch template comes from
pub(crate) enum TemplateSource<'a> {
    /// An existing template named by the node group
    Explicit(&'a LaunchTemplateRef),
    /// A template generated from bootstrap data
    Generated,
}

impl<'a> TemplateSource<'a> {
    pub(crate) fn of(ng: &'a NodeGroupSpec) -> Self {
        match &ng.launch_template {
            Some(lt) => Self::Explicit(lt),
            None => Self::Generated,
        }
    }
}

/// Launch template outcome for the node group resource
#[derive(Debug)]
pub(crate) struct ResolvedLaunchTemplate {
    pub binding: LaunchTemplateBinding,
    pub specification: LaunchTemplateSpecification,
    pub ami_type: Option<AmiType>,
    pub instance_types: Vec<String>,
}

/// Resolve the launch template for a node group
pub(crate) async fn resolve_launch_template(
    ng: &NodeGroupSpec,
    cluster: &ClusterContext,
    capacity_block: bool,
    collaborators: &Collaborators,
) -> Result<ResolvedLaunchTemplate> {
    let family = ng.effective_ami_family();

    match TemplateSource::of(ng) {
        TemplateSource::Explicit(lt) => {
            let data = collaborators.launch_templates.fetch(lt).await?;
            validate_launch_template(&data, ng)
                .map_err(|msg| Error::synthesis_for(&ng.name, msg))?;
            debug!(
                nodegroup = %ng.name,
                launch_template = %lt.id,
                version = ?lt.version,
                custom_image = data.image_id().is_some(),
                "using existing launch template"
            );

            let ami_type = data.image_id().is_none().then(|| {
                let representative = data
                    .instance_type()
                    .or_else(|| ng.representative_instance_type());
                AmiType::resolve(family, representative)
            });

            let (instance_types, pinned) = if data.instance_type().is_some() {
                (Vec::new(), None)
            } else {
                place_instance_types(ng, capacity_block)?
            };

            Ok(ResolvedLaunchTemplate {
                binding: LaunchTemplateBinding::Explicit {
                    id: lt.id.clone(),
                    version: lt.version.clone(),
                    instance_type: pinned,
                },
                specification: LaunchTemplateSpecification {
                    id: PropertyValue::literal(&lt.id),
                    version: lt.version.clone(),
                },
                ami_type,
                instance_types,
            })
        }
        TemplateSource::Generated => {
            let mut data = collaborators.bootstrapper.build(ng, cluster).await?;
            let ami_type = data
                .image_id()
                .is_none()
                .then(|| AmiType::resolve(family, ng.representative_instance_type()));

            let (instance_types, pinned) = place_instance_types(ng, capacity_block)?;
            if pinned.is_some() {
                data.instance_type = pinned;
            }

            Ok(ResolvedLaunchTemplate {
                binding: LaunchTemplateBinding::Generated(GeneratedLaunchTemplate {
                    name: PropertyValue::Sub(STACK_NAME_SUB.to_string()),
                    data,
                }),
                specification: LaunchTemplateSpecification {
                    id: PropertyValue::reference(LAUNCH_TEMPLATE),
                    version: None,
                },
                ami_type,
                instance_types,
            })
        }
    }
}

/// Split instance types between the node group list and the template
///
/// Capacity blocks forbid a type list on the node group, so the single
/// type is pinned on the template instead.
fn place_instance_types(
    ng: &NodeGroupSpec,
    capacity_block: bool,
) -> Result<(Vec<String>, Option<String>)> {
    let instance_types = ng.instance_type_list();
    if !capacity_block {
        return Ok((instance_types, None));
    }

    match <[String; 1]>::try_from(instance_types) {
        Ok([single]) => Ok((Vec::new(), Some(single))),
        Err(types) => Err(Error::synthesis_for(
            &ng.name,
            format!(
                "capacity type CAPACITY_BLOCK requires a single instance type, got {}",
                types.len()
            ),
        )),
    }
}

/// Check an existing launch template against the node group
///
/// The instance type must come from exactly one side, a custom image needs
/// a boot script and excludes the node group's own image settings, and the
/// node role cannot be supplied through an instance profile.
pub fn validate_launch_template(
    data: &LaunchTemplateData,
    ng: &NodeGroupSpec,
) -> std::result::Result<(), String> {
    let nodegroup_types = ng.instance_type_list();
    match (data.instance_type(), nodegroup_types.is_empty()) {
        (None, true) => {
            return Err(format!(
                "instance type must be set in the launch template if {NODEGROUP_FIELD}.instanceTypes is not specified"
            ))
        }
        (Some(_), false) => {
            return Err(format!(
                "instance type must not be set in the launch template if {NODEGROUP_FIELD}.instanceTypes is specified"
            ))
        }
        _ => {}
    }

    if data.image_id().is_some() {
        if !data.has_user_data() {
            return Err(
                "custom AMI requires a boot script: UserData must be set in the launch template"
                    .to_string(),
            );
        }
        let conflicts = [
            ("ami", ng.custom_ami().is_some()),
            ("releaseVersion", ng.release_version().is_some()),
        ];
        if let Some((field, _)) = conflicts.iter().find(|(_, set)| *set) {
            return Err(format!(
                "cannot set {NODEGROUP_FIELD}.{field} when launchTemplate.ImageId is set"
            ));
        }
    }

    if data.iam_instance_profile_arn().is_some() {
        return Err("IAM instance profile must not be set in the launch template".to_string());
    }

    Ok(())
}
