//! Common types for strata: node group model, configuration, errors, and telemetry

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod model;
pub mod telemetry;
pub mod yaml;

pub use config::StrataConfig;
pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Environment variable that points the EKS API at a non-standard endpoint
pub const EKS_ENDPOINT_ENV: &str = "AWS_EKS_ENDPOINT";

/// Marker appended to generated resource descriptions
pub const CREATED_BY: &str = "[created by strata]";
