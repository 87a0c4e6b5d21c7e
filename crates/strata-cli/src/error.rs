//! Error types for the CLI

use strata_common::telemetry::TelemetryError;

/// CLI Result type
pub type Result<T> = std::result::Result<T, Error>;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Strata(#[from] strata_common::Error),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("nodegroup not found: {name}")]
    NodeGroupNotFound { name: String },

    #[error("validation failed: {message}")]
    Validation { message: String },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    pub fn nodegroup_not_found(name: impl Into<String>) -> Self {
        Error::NodeGroupNotFound { name: name.into() }
    }
}
