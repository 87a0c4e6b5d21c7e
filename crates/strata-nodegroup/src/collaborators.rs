//! External collaborators of the validator and synthesizer
//!
//! Each trait is a seam to an outside system: EC2 launch templates, subnet
//! assignment, bootstrap data generation, and the warning log. Production
//! code supplies real implementations; tests use the mockall-generated mocks.
//!
//! Collaborators own their retry policy. Errors they return are propagated
//! unchanged. Dropping the synthesis future cancels the in-flight call.

use async_trait::async_trait;
use tracing::warn;

#[cfg(test)]
use mockall::automock;

use strata_common::model::{ClusterContext, LaunchTemplateData, LaunchTemplateRef, NodeGroupSpec, Placement};
use strata_common::Result;

/// Reads the contents of an existing launch template
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LaunchTemplateFetcher: Send + Sync {
    /// Fetch the data of the referenced template
    ///
    /// A missing version means the template's default version.
    async fn fetch(&self, template: &LaunchTemplateRef) -> Result<LaunchTemplateData>;
}

/// Assigns subnets to a node group
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubnetResolver: Send + Sync {
    /// Resolve the ordered subnet ids for the given placement constraints
    async fn resolve(&self, placement: &Placement, cluster: &ClusterContext)
        -> Result<Vec<String>>;
}

/// Generates launch template data for node groups without an explicit template
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LaunchTemplateDataBuilder: Send + Sync {
    /// Build fresh launch template data for the node group
    ///
    /// Carries an image id only when the node group demands a custom one.
    async fn build(
        &self,
        nodegroup: &NodeGroupSpec,
        cluster: &ClusterContext,
    ) -> Result<LaunchTemplateData>;
}

/// Destination for non-fatal diagnostics
#[cfg_attr(test, automock)]
pub trait WarningSink: Send + Sync {
    /// Record one warning
    fn warn(&self, message: &str);
}

/// Warning sink that logs through `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingWarningSink;

impl WarningSink for TracingWarningSink {
    fn warn(&self, message: &str) {
        warn!("{message}");
    }
}
