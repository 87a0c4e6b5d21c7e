//! Node group compatibility validation
//!
//! Rules run in order and the first error short-circuits:
//!
//! 1. the accelerator support matrix (skipped for custom AMIs)
//! 2. field consistency
//! 3. the GPU driver warning, which never fails validation
//!
//! A successful call returns a [`ValidatedNodeGroup`], the only input the
//! synthesizer accepts.

mod accelerator;
mod consistency;

pub use accelerator::{support_for, Support};

use tracing::debug;

use strata_common::model::{
    is_gpu_instance_type, AmiFamily, ClusterContext, NodeGroupKind, NodeGroupSpec,
};
use strata_common::Result;

use crate::collaborators::WarningSink;

/// A node group that passed validation
///
/// Borrowed from the caller's spec; carries the warnings emitted while
/// validating it.
#[derive(Clone, Debug)]
pub struct ValidatedNodeGroup<'a> {
    spec: &'a NodeGroupSpec,
    kind: NodeGroupKind,
    warnings: Vec<String>,
}

impl<'a> ValidatedNodeGroup<'a> {
    /// The validated specification
    pub fn spec(&self) -> &'a NodeGroupSpec {
        self.spec
    }

    /// Node group name
    pub fn name(&self) -> &'a str {
        &self.spec.name
    }

    /// Whether the node group is managed or unmanaged
    pub fn kind(&self) -> NodeGroupKind {
        self.kind
    }

    /// Warnings emitted during validation
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Validate a node group against its cluster
///
/// Warnings go to `sink` as they are found and are also recorded on the
/// returned token. Errors are [`strata_common::Error::Validation`].
pub fn validate_node_group<'a>(
    ng: &'a NodeGroupSpec,
    cluster: &ClusterContext,
    kind: NodeGroupKind,
    sink: &dyn WarningSink,
) -> Result<ValidatedNodeGroup<'a>> {
    accelerator::check_accelerator_support(ng, kind)?;
    consistency::check_consistency(ng, kind)?;

    let mut warnings = Vec::new();
    let family = ng.effective_ami_family();
    if !family.ships_gpu_drivers() && is_gpu_capable(ng) {
        let warning = gpu_drivers_warning(family);
        sink.warn(&warning);
        warnings.push(warning);
    }

    debug!(
        nodegroup = %ng.name,
        cluster = %cluster.name,
        kind = %kind,
        warnings = warnings.len(),
        "nodegroup validated"
    );

    Ok(ValidatedNodeGroup {
        spec: ng,
        kind,
        warnings,
    })
}

/// Warning text for an image family without preinstalled GPU drivers
pub fn gpu_drivers_warning(family: AmiFamily) -> String {
    format!(
        "{family} does not ship with NVIDIA GPU drivers installed; \
         GPU-accelerated workloads will not run until the drivers are installed manually"
    )
}

// Explicit instance types decide on their own; the selector only counts
// when no type is named.
fn is_gpu_capable(ng: &NodeGroupSpec) -> bool {
    let explicit = ng.explicit_instance_types();
    if !explicit.is_empty() {
        return explicit.into_iter().any(is_gpu_instance_type);
    }
    ng.instance_selector
        .as_ref()
        .is_some_and(|selector| selector.implies_gpu())
}
