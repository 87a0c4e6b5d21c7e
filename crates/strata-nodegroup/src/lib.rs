//! Node group validation and resource synthesis
//!
//! Two stages turn a declarative node group into a provisionable resource
//! graph:
//!
//! 1. [`validate_node_group`] checks the node group against the
//!    image-family/instance-class support matrix and its own internal
//!    consistency, emitting GPU driver warnings to a [`WarningSink`].
//! 2. [`ManagedNodeGroupBuilder::synthesize`] resolves the node role,
//!    subnets, launch template, capacity mode, taints and tags into a
//!    [`ResourceGraph`].
//!
//! Synthesis only accepts the [`ValidatedNodeGroup`] produced by the first
//! stage, so an unvalidated node group cannot reach the builder.

#![deny(missing_docs)]

pub mod builder;
pub mod collaborators;
pub mod resource;
pub mod validate;

pub use builder::ManagedNodeGroupBuilder;
pub use collaborators::{
    LaunchTemplateDataBuilder, LaunchTemplateFetcher, SubnetResolver, TracingWarningSink,
    WarningSink,
};
pub use resource::ResourceGraph;
pub use validate::{validate_node_group, ValidatedNodeGroup};

use std::sync::Arc;

/// External collaborators used during synthesis
///
/// Implementations must be safe for concurrent use when one set is shared
/// across node groups.
#[derive(Clone)]
pub struct Collaborators {
    /// Reads explicitly referenced launch templates
    pub launch_templates: Arc<dyn LaunchTemplateFetcher>,
    /// Assigns subnets from placement constraints
    pub subnets: Arc<dyn SubnetResolver>,
    /// Generates launch template data when none is referenced
    pub bootstrapper: Arc<dyn LaunchTemplateDataBuilder>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
