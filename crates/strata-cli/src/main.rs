//! Strata CLI
//!
//! Validates EKS node groups and plans their resources from a config file.

use clap::Parser;

use strata_cli::{Cli, Result};
use strata_common::telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_telemetry(TelemetryConfig {
        format: cli.log_format(),
        ..Default::default()
    })?;

    cli.run().await
}
