//! Configuration file loading
//!
//! A strata config file describes one cluster and its node groups:
//!
//! ```yaml
//! cluster:
//!   name: prod
//!   region: us-west-2
//!   tags: { team: infra }
//! managedNodeGroups:
//!   - name: gpu
//!     amiFamily: AmazonLinux2023
//!     instanceType: g4dn.xlarge
//! nodeGroups: []
//! launchTemplates: []   # known templates, keyed by id/version
//! subnets: []           # known subnets with their zone and privacy
//! ```
//!
//! `AWS_EKS_ENDPOINT`, when set, overrides `cluster.eksEndpoint`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{ClusterContext, LaunchTemplateData, NodeGroupKind, NodeGroupSpec};
use crate::{yaml, Error, Result, EKS_ENDPOINT_ENV};

/// Parsed strata configuration file
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrataConfig {
    /// Cluster the node groups belong to
    pub cluster: ClusterContext,

    /// EKS managed node groups
    #[serde(default)]
    pub managed_node_groups: Vec<NodeGroupSpec>,

    /// Self-managed node groups
    #[serde(default)]
    pub node_groups: Vec<NodeGroupSpec>,

    /// Launch templates available for lookup by id
    #[serde(default)]
    pub launch_templates: Vec<LaunchTemplateEntry>,

    /// Subnets available for node placement
    #[serde(default)]
    pub subnets: Vec<SubnetEntry>,
}

/// A known launch template and its contents
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchTemplateEntry {
    /// Launch template id
    pub id: String,
    /// Version; absent entries also serve as the default version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Template contents
    #[serde(default)]
    pub data: LaunchTemplateData,
}

/// A known subnet
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubnetEntry {
    /// Subnet id
    pub id: String,
    /// Availability zone of the subnet
    pub availability_zone: String,
    /// Private subnet (no public IPs)
    #[serde(default)]
    pub private: bool,
}

impl StrataConfig {
    /// Parse a config from YAML text
    pub fn from_yaml(input: &str) -> Result<Self> {
        let config: StrataConfig =
            yaml::from_yaml(input).map_err(|e| Error::config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Load a config file and apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let location = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config_at(&location, format!("failed to read: {e}")))?;

        let mut config: StrataConfig = yaml::from_yaml(&content)
            .map_err(|e| Error::config_at(&location, e.to_string()))?;
        config
            .check()
            .map_err(|e| Error::config_at(&location, e.to_string()))?;
        config.apply_env_overrides(std::env::var(EKS_ENDPOINT_ENV).ok());

        debug!(
            path = %location,
            cluster = %config.cluster.name,
            managed = config.managed_node_groups.len(),
            unmanaged = config.node_groups.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Apply the EKS endpoint override, ignoring empty values
    pub fn apply_env_overrides(&mut self, eks_endpoint: Option<String>) {
        if let Some(endpoint) = eks_endpoint.filter(|e| !e.trim().is_empty()) {
            self.cluster.eks_endpoint = Some(endpoint);
        }
    }

    /// Every node group with its kind, managed first
    pub fn all_node_groups(&self) -> impl Iterator<Item = (NodeGroupKind, &NodeGroupSpec)> {
        self.managed_node_groups
            .iter()
            .map(|ng| (NodeGroupKind::Managed, ng))
            .chain(
                self.node_groups
                    .iter()
                    .map(|ng| (NodeGroupKind::Unmanaged, ng)),
            )
    }

    fn check(&self) -> Result<()> {
        if self.cluster.name.is_empty() {
            return Err(Error::config("cluster.name is required"));
        }

        let mut seen = std::collections::BTreeSet::new();
        for (kind, ng) in self.all_node_groups() {
            if ng.name.is_empty() {
                return Err(Error::config(format!(
                    "every entry in {} needs a name",
                    kind.config_key()
                )));
            }
            if !seen.insert(ng.name.as_str()) {
                return Err(Error::config(format!(
                    "duplicate nodegroup name: {}",
                    ng.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AmiFamily;

    const SAMPLE: &str = r#"
cluster:
  name: prod
  region: us-west-2
  withOIDC: true
  tags:
    team: infra
managedNodeGroups:
  - name: gpu
    amiFamily: AmazonLinux2023
    instanceType: g4dn.xlarge
    minSize: 1
    maxSize: 3
    launchTemplate:
      id: lt-0abc
      version: "2"
nodeGroups:
  - name: windows
    amiFamily: WindowsServer2022CoreContainer
    instanceType: m5.large
launchTemplates:
  - id: lt-0abc
    version: "2"
    data:
      InstanceType: g4dn.xlarge
subnets:
  - id: subnet-a
    availabilityZone: us-west-2a
    private: true
"#;

    #[test]
    fn parses_full_config() {
        let config = StrataConfig::from_yaml(SAMPLE).expect("config should parse");
        assert_eq!(config.cluster.name, "prod");
        assert!(config.cluster.with_oidc);
        assert_eq!(config.cluster.tags.get("team").map(String::as_str), Some("infra"));

        let gpu = &config.managed_node_groups[0];
        assert_eq!(gpu.ami_family, Some(AmiFamily::AmazonLinux2023));
        assert_eq!(gpu.min_size, Some(1));
        assert_eq!(gpu.desired_capacity, None);
        assert_eq!(
            gpu.launch_template.as_ref().and_then(|lt| lt.version.as_deref()),
            Some("2")
        );

        assert_eq!(config.launch_templates[0].data.instance_type(), Some("g4dn.xlarge"));
        assert!(config.subnets[0].private);

        let kinds: Vec<_> = config.all_node_groups().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, vec![NodeGroupKind::Managed, NodeGroupKind::Unmanaged]);
    }

    #[test]
    fn rejects_missing_cluster_name() {
        let err = StrataConfig::from_yaml("cluster:\n  region: us-west-2\n  name: \"\"\n")
            .expect_err("empty name should fail");
        assert!(err.to_string().contains("cluster.name is required"));
    }

    #[test]
    fn rejects_duplicate_nodegroup_names() {
        let yaml = r#"
cluster: { name: c }
managedNodeGroups: [{ name: a }]
nodeGroups: [{ name: a }]
"#;
        let err = StrataConfig::from_yaml(yaml).expect_err("duplicate should fail");
        assert!(err.to_string().contains("duplicate nodegroup name: a"));
    }

    #[test]
    fn rejects_unknown_ami_family() {
        let yaml = r#"
cluster: { name: c }
managedNodeGroups: [{ name: a, amiFamily: CentOS7 }]
"#;
        assert!(matches!(
            StrataConfig::from_yaml(yaml),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn endpoint_override_ignores_blank_values() {
        let mut config = StrataConfig::from_yaml("cluster: { name: c }").expect("parse");
        config.apply_env_overrides(Some("  ".to_string()));
        assert_eq!(config.cluster.eks_endpoint, None);
        config.apply_env_overrides(Some("https://eks.example.internal".to_string()));
        assert_eq!(
            config.cluster.eks_endpoint.as_deref(),
            Some("https://eks.example.internal")
        );
    }

    #[test]
    fn load_reads_file_and_names_path_on_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("strata.yaml");
        std::fs::write(&path, SAMPLE).expect("write config");
        let config = StrataConfig::load(&path).expect("load should succeed");
        assert_eq!(config.managed_node_groups.len(), 1);

        let missing = dir.path().join("missing.yaml");
        match StrataConfig::load(&missing) {
            Err(Error::Config { path, .. }) => {
                assert_eq!(path, Some(missing.display().to_string()));
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn load_logs_the_file_it_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("strata.yaml");
        std::fs::write(&path, SAMPLE).expect("write config");

        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let config = tracing::subscriber::with_default(subscriber, || StrataConfig::load(&path))
            .expect("load should succeed under a debug subscriber");
        assert_eq!(config.cluster.name, "prod");
    }

    #[test]
    fn ami_family_names_are_case_insensitive() {
        let config = StrataConfig::from_yaml(
            r#"
cluster:
  name: prod
  region: us-west-2
managedNodeGroups:
  - name: ubuntu
    amiFamily: ubuntu2004
    instanceType: m5.large
"#,
        )
        .expect("lowercase family should load");
        assert_eq!(
            config.managed_node_groups[0].ami_family,
            Some(AmiFamily::Ubuntu2004)
        );
    }
}
