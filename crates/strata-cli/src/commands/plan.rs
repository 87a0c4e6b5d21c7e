//! Plan command

use std::path::PathBuf;

use clap::Args;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use strata_common::StrataConfig;
use strata_nodegroup::resource::Capability;
use strata_nodegroup::{validate_node_group, ManagedNodeGroupBuilder, TracingWarningSink};

use crate::{collaborators, Error, Result};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Config file describing the cluster and its node groups
    #[arg(short, long)]
    pub file: PathBuf,

    /// Attach the CNI policy to node roles even when OIDC is enabled
    #[arg(long)]
    pub force_add_cni_policy: bool,

    /// Only plan the named node group
    #[arg(long)]
    pub nodegroup: Option<String>,
}

pub async fn run(args: PlanArgs) -> Result<()> {
    let config = StrataConfig::load(&args.file)?;
    let plan = build_plan(&config, args.nodegroup.as_deref(), args.force_add_cni_policy).await?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// Validate and synthesize node groups into one document keyed by name
///
/// Unmanaged node groups are validated but not synthesized, unless one is
/// requested by name, in which case synthesis rejects it. The first
/// failure aborts the plan.
pub async fn build_plan(
    config: &StrataConfig,
    only: Option<&str>,
    force_add_cni_policy: bool,
) -> Result<Value> {
    let builder = ManagedNodeGroupBuilder::new(&config.cluster, collaborators::from_config(config))
        .force_add_cni_policy(force_add_cni_policy);
    let sink = TracingWarningSink;

    let selected: Vec<_> = config
        .all_node_groups()
        .filter(|(_, ng)| only.map_or(true, |name| ng.name == name))
        .collect();
    if let (Some(name), true) = (only, selected.is_empty()) {
        return Err(Error::nodegroup_not_found(name));
    }

    let mut plan = Map::new();
    for (kind, ng) in selected {
        let validated = validate_node_group(ng, &config.cluster, kind, &sink)?;
        if !kind.is_managed() && only.is_none() {
            debug!(nodegroup = %ng.name, "skipping unmanaged nodegroup");
            continue;
        }

        let graph = builder.synthesize(&validated).await?;
        let mut document = graph.to_value()?;
        let capabilities: Vec<&str> = graph.capabilities().iter().map(Capability::as_str).collect();
        document["Capabilities"] = json!(capabilities);
        plan.insert(ng.name.clone(), document);
    }

    info!(cluster = %config.cluster.name, nodegroups = plan.len(), "planned nodegroups");
    Ok(Value::Object(plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONFIG: &str = r#"
cluster:
  name: prod
  region: us-west-2
  withOIDC: true
  tags: { team: infra }
managedNodeGroups:
  - name: gpu
    amiFamily: AmazonLinux2023
    instanceType: g4dn.xlarge
    privateNetworking: true
    availabilityZones: [us-west-2a]
  - name: custom
    launchTemplate: { id: lt-custom, version: "2" }
    subnets: [subnet-explicit]
nodeGroups:
  - name: workers
    instanceType: m5.large
launchTemplates:
  - id: lt-custom
    version: "2"
    data:
      ImageId: ami-0custom
      InstanceType: c6i.large
      UserData: IyEvYmluL2Jhc2g=
subnets:
  - { id: subnet-priv-a, availabilityZone: us-west-2a, private: true }
  - { id: subnet-priv-b, availabilityZone: us-west-2b, private: true }
  - { id: subnet-pub-a, availabilityZone: us-west-2a }
"#;

    fn config() -> StrataConfig {
        StrataConfig::from_yaml(CONFIG).expect("config")
    }

    #[tokio::test]
    async fn plans_managed_nodegroups_only() {
        let plan = build_plan(&config(), None, false).await.expect("plan");
        let plan = plan.as_object().expect("object");
        assert_eq!(plan.len(), 2);
        assert!(!plan.contains_key("workers"));

        let gpu = &plan["gpu"];
        let props = &gpu["Resources"]["ManagedNodeGroup"]["Properties"];
        assert_eq!(props["AmiType"], "AL2023_x86_64_NVIDIA");
        assert_eq!(props["Subnets"], json!(["subnet-priv-a"]));
        assert_eq!(props["Tags"]["team"], "infra");
        assert_eq!(gpu["Capabilities"], json!(["CAPABILITY_IAM"]));

        let custom = &plan["custom"]["Resources"]["ManagedNodeGroup"]["Properties"];
        assert!(custom.get("AmiType").is_none());
        assert_eq!(custom["LaunchTemplate"], json!({ "Id": "lt-custom", "Version": "2" }));
        assert_eq!(custom["Subnets"], json!(["subnet-explicit"]));
    }

    #[tokio::test]
    async fn force_cni_policy_reaches_the_node_role() {
        let plan = build_plan(&config(), Some("gpu"), true).await.expect("plan");
        let policies = plan["gpu"]["Resources"]["NodeInstanceRole"]["Properties"]
            ["ManagedPolicyArns"]
            .as_array()
            .expect("policy list");
        assert!(policies
            .iter()
            .any(|p| p == "arn:aws:iam::aws:policy/AmazonEKS_CNI_Policy"));
    }

    #[tokio::test]
    async fn unknown_nodegroup_is_reported() {
        let err = build_plan(&config(), Some("nope"), false)
            .await
            .expect_err("no such nodegroup");
        assert!(matches!(err, Error::NodeGroupNotFound { ref name } if name == "nope"));
    }

    #[tokio::test]
    async fn requested_unmanaged_nodegroup_is_rejected() {
        let err = build_plan(&config(), Some("workers"), false)
            .await
            .expect_err("unmanaged");
        assert_eq!(
            err.to_string(),
            "synthesis error for workers: only managed nodegroups can be synthesized"
        );
    }

    #[tokio::test]
    async fn run_prints_plan_for_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(CONFIG.as_bytes()).expect("write");

        run(PlanArgs {
            file: file.path().to_path_buf(),
            force_add_cni_policy: false,
            nodegroup: Some("gpu".to_string()),
        })
        .await
        .expect("plan succeeds");
    }
}
