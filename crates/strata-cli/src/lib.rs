//! Strata CLI library

pub mod collaborators;
pub mod commands;
pub mod error;

pub use error::{Error, Result};

use clap::{Parser, Subcommand};
use strata_common::telemetry::LogFormat;

/// Strata - EKS node group validation and planning
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "STRATA_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every node group in a config file
    Validate(commands::validate::ValidateArgs),
    /// Validate and synthesize managed node groups, printing the resources
    Plan(commands::plan::PlanArgs),
}

impl Cli {
    /// Log format selected on the command line
    pub fn log_format(&self) -> LogFormat {
        if self.log_json {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }

    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Validate(args) => commands::validate::run(args).await,
            Commands::Plan(args) => commands::plan::run(args).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_flags() {
        let cli = Cli::try_parse_from([
            "strata",
            "plan",
            "-f",
            "cluster.yaml",
            "--force-add-cni-policy",
            "--nodegroup",
            "gpu",
            "--log-json",
        ])
        .expect("valid arguments");

        assert_eq!(cli.log_format(), LogFormat::Json);
        let Commands::Plan(args) = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(args.file.to_str(), Some("cluster.yaml"));
        assert!(args.force_add_cni_policy);
        assert_eq!(args.nodegroup.as_deref(), Some("gpu"));
    }

    #[test]
    fn validate_requires_a_file() {
        assert!(Cli::try_parse_from(["strata", "validate"]).is_err());

        let cli = Cli::try_parse_from(["strata", "validate", "--file", "c.yaml"])
            .expect("valid arguments");
        assert_eq!(cli.log_format(), LogFormat::Text);
        assert!(matches!(cli.command, Commands::Validate(_)));
    }
}
