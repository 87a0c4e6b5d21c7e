//! Validate command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use strata_common::StrataConfig;
use strata_nodegroup::{validate_node_group, TracingWarningSink};

use crate::Result;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Config file describing the cluster and its node groups
    #[arg(short, long)]
    pub file: PathBuf,
}

/// Outcome of validating every node group in a config
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Node groups that passed, as `kind/name`
    pub valid: Vec<String>,
    /// Warnings, prefixed with the node group name
    pub warnings: Vec<String>,
    /// Rejections, one per failing node group
    pub errors: Vec<String>,
}

pub async fn run(args: ValidateArgs) -> Result<()> {
    let config = StrataConfig::load(&args.file)?;
    let report = validate_config(&config);

    for valid in &report.valid {
        println!("  {} valid", valid);
    }
    println!();

    if !report.warnings.is_empty() {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
        println!();
    }

    if report.errors.is_empty() {
        println!("All validations passed");
        Ok(())
    } else {
        println!("Validation errors:");
        for error in &report.errors {
            println!("  - {}", error);
        }
        Err(crate::Error::validation(format!(
            "{} validation errors",
            report.errors.len()
        )))
    }
}

/// Validate every node group, managed first, without stopping at failures
pub fn validate_config(config: &StrataConfig) -> ValidationReport {
    let sink = TracingWarningSink;
    let mut report = ValidationReport::default();

    for (kind, ng) in config.all_node_groups() {
        match validate_node_group(ng, &config.cluster, kind, &sink) {
            Ok(validated) => {
                report.valid.push(format!("{}/{}", kind.config_key(), ng.name));
                report.warnings.extend(
                    validated
                        .warnings()
                        .iter()
                        .map(|w| format!("{}: {}", ng.name, w)),
                );
            }
            Err(e) => report.errors.push(e.to_string()),
        }
    }

    info!(
        cluster = %config.cluster.name,
        valid = report.valid.len(),
        invalid = report.errors.len(),
        "validated nodegroups"
    );
    report
}
