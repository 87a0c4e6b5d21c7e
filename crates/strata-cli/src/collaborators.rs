//! File-backed collaborators
//!
//! Resolve launch templates and subnets from the `launchTemplates` and
//! `subnets` sections of the config file instead of a cloud API.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use strata_common::config::{LaunchTemplateEntry, SubnetEntry};
use strata_common::model::{
    ClusterContext, LaunchTemplateData, LaunchTemplateRef, NodeGroupSpec, Placement,
};
use strata_common::{Error, Result, StrataConfig};
use strata_nodegroup::{
    Collaborators, LaunchTemplateDataBuilder, LaunchTemplateFetcher, SubnetResolver,
};

/// Launch templates listed in the config file
#[derive(Clone, Debug, Default)]
pub struct StaticLaunchTemplates {
    entries: Vec<LaunchTemplateEntry>,
}

impl StaticLaunchTemplates {
    pub fn new(entries: Vec<LaunchTemplateEntry>) -> Self {
        Self { entries }
    }

    /// Find the entry for a reference
    ///
    /// An exact id/version match wins; an entry without a version serves
    /// any version of that id.
    fn find(&self, template: &LaunchTemplateRef) -> Option<&LaunchTemplateEntry> {
        let same_id = || self.entries.iter().filter(|e| e.id == template.id);
        same_id()
            .find(|e| e.version == template.version)
            .or_else(|| same_id().find(|e| e.version.is_none()))
    }
}

#[async_trait]
impl LaunchTemplateFetcher for StaticLaunchTemplates {
    async fn fetch(&self, template: &LaunchTemplateRef) -> Result<LaunchTemplateData> {
        let entry = self.find(template).ok_or_else(|| {
            let version = template.version.as_deref().unwrap_or("$Default");
            Error::collaborator_permanent(
                "launch template fetcher",
                format!(
                    "launch template {} (version {version}) not found",
                    template.id
                ),
            )
        })?;
        debug!(launch_template = %entry.id, version = ?entry.version, "found launch template");
        Ok(entry.data.clone())
    }
}

/// Subnets listed in the config file
#[derive(Clone, Debug, Default)]
pub struct StaticSubnets {
    subnets: Vec<SubnetEntry>,
}

impl StaticSubnets {
    pub fn new(subnets: Vec<SubnetEntry>) -> Self {
        Self { subnets }
    }
}

#[async_trait]
impl SubnetResolver for StaticSubnets {
    async fn resolve(&self, placement: &Placement, cluster: &ClusterContext) -> Result<Vec<String>> {
        if !placement.subnets.is_empty() {
            return Ok(placement.subnets.clone());
        }

        let zones = &placement.availability_zones;
        let subnets: Vec<String> = self
            .subnets
            .iter()
            .filter(|s| s.private == placement.private_networking)
            .filter(|s| zones.is_empty() || zones.contains(&s.availability_zone))
            .map(|s| s.id.clone())
            .collect();

        if subnets.is_empty() {
            let visibility = if placement.private_networking {
                "private"
            } else {
                "public"
            };
            let mut message = format!("no {visibility} subnets found for cluster {}", cluster.name);
            if !zones.is_empty() {
                message.push_str(&format!(" in zones {}", zones.join(", ")));
            }
            return Err(Error::collaborator_permanent("subnet resolver", message));
        }

        debug!(cluster = %cluster.name, count = subnets.len(), "resolved subnets");
        Ok(subnets)
    }
}

/// Bootstrap data carrying the node group's custom image, if any
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageBootstrapper;

#[async_trait]
impl LaunchTemplateDataBuilder for ImageBootstrapper {
    async fn build(
        &self,
        nodegroup: &NodeGroupSpec,
        _cluster: &ClusterContext,
    ) -> Result<LaunchTemplateData> {
        Ok(LaunchTemplateData {
            image_id: nodegroup.custom_ami().map(str::to_string),
            ..Default::default()
        })
    }
}

/// Collaborators backed by a loaded config file
pub fn from_config(config: &StrataConfig) -> Collaborators {
    Collaborators {
        launch_templates: Arc::new(StaticLaunchTemplates::new(config.launch_templates.clone())),
        subnets: Arc::new(StaticSubnets::new(config.subnets.clone())),
        bootstrapper: Arc::new(ImageBootstrapper),
    }
}
