//! Error types for strata
//!
//! Errors are structured with fields to aid debugging. Each variant maps to
//! one failure category: user input that fails validation, node group
//! fields that cannot be synthesized together, failures reported by an
//! external collaborator, and configuration or serialization problems.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for strata operations
#[derive(Debug, Error)]
pub enum Error {
    /// Node group failed a compatibility or consistency check
    #[error("validation error for {nodegroup}: {message}")]
    Validation {
        /// Name of the node group with invalid configuration
        nodegroup: String,
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "managedNodeGroups[0].instanceTypes")
        field: Option<String>,
    },

    /// Node group fields could not be turned into a resource graph
    #[error("synthesis error for {nodegroup}: {message}")]
    Synthesis {
        /// Name of the node group being synthesized
        nodegroup: String,
        /// Description of what failed
        message: String,
    },

    /// Failure reported by an injected collaborator (template fetch, subnets)
    #[error("{collaborator} error: {message}")]
    Collaborator {
        /// Which collaborator failed (e.g., "launch template fetcher")
        collaborator: String,
        /// Description of what failed
        message: String,
        /// Whether the caller may retry the whole call
        retryable: bool,
    },

    /// Configuration file could not be read or has the wrong shape
    #[error("configuration error: {message}")]
    Config {
        /// Description of what failed
        message: String,
        /// Path of the offending file (if known)
        path: Option<String>,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },
}

impl Error {
    /// Create a validation error with the given message
    ///
    /// For simple validation errors without node group context.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            nodegroup: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with node group context
    pub fn validation_for(nodegroup: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            nodegroup: nodegroup.into(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with node group context and field path
    pub fn validation_for_field(
        nodegroup: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            nodegroup: nodegroup.into(),
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a synthesis error with the given message
    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis {
            nodegroup: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
        }
    }

    /// Create a synthesis error with node group context
    pub fn synthesis_for(nodegroup: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Synthesis {
            nodegroup: nodegroup.into(),
            message: msg.into(),
        }
    }

    /// Create a retryable collaborator error (e.g., throttling, timeouts)
    pub fn collaborator(collaborator: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator: collaborator.into(),
            message: msg.into(),
            retryable: true,
        }
    }

    /// Create a non-retryable collaborator error (e.g., template not found)
    pub fn collaborator_permanent(
        collaborator: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Collaborator {
            collaborator: collaborator.into(),
            message: msg.into(),
            retryable: false,
        }
    }

    /// Create a configuration error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            path: None,
        }
    }

    /// Create a configuration error for a specific file
    pub fn config_at(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            path: Some(path.into()),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Check if this error is retryable
    ///
    /// Only collaborator failures can succeed on a later attempt; everything
    /// else requires the input to change.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Collaborator { retryable, .. } => *retryable,
            Error::Validation { .. }
            | Error::Synthesis { .. }
            | Error::Config { .. }
            | Error::Serialization { .. } => false,
        }
    }

    /// Get the node group name if this error is associated with one
    pub fn nodegroup(&self) -> Option<&str> {
        match self {
            Error::Validation { nodegroup, .. } => Some(nodegroup),
            Error::Synthesis { nodegroup, .. } => Some(nodegroup),
            Error::Collaborator { .. } => None,
            Error::Config { .. } => None,
            Error::Serialization { .. } => None,
        }
    }

    /// Get the field path if this is a field-level validation error
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // Story Tests: Error Propagation in Node Group Planning
    // ==========================================================================

    /// Story: validation catches incompatible node groups before synthesis
    #[test]
    fn story_validation_rejects_incompatible_nodegroup() {
        let err = Error::validation_for(
            "gpu-workers",
            "Inferentia instance types are not supported for Bottlerocket",
        );
        assert!(err.to_string().contains("validation error for gpu-workers"));
        assert!(err
            .to_string()
            .contains("Inferentia instance types are not supported for Bottlerocket"));
        assert_eq!(err.nodegroup(), Some("gpu-workers"));
        assert!(!err.is_retryable());
    }

    /// Story: field-level errors point at the offending field
    #[test]
    fn story_field_errors_carry_path() {
        let err = Error::validation_for_field(
            "ng-1",
            "managedNodeGroups[0].updateConfig",
            "cannot set both maxUnavailable and maxUnavailablePercentage",
        );
        assert_eq!(err.field(), Some("managedNodeGroups[0].updateConfig"));
        assert_eq!(Error::synthesis("x").field(), None);
    }

    /// Story: synthesis errors abort the whole call with the node group named
    #[test]
    fn story_synthesis_errors_name_nodegroup() {
        let err = Error::synthesis_for("ng-1", "unexpected taint effect: Sometimes");
        assert!(err.to_string().contains("synthesis error for ng-1"));
        assert!(err.to_string().contains("unexpected taint effect: Sometimes"));
        assert!(!err.is_retryable());

        let err = Error::synthesis("no context");
        assert_eq!(err.nodegroup(), Some(UNKNOWN_CONTEXT));
    }

    /// Story: collaborator errors keep their retry classification
    #[test]
    fn story_collaborator_errors_surface_retryability() {
        let err = Error::collaborator("subnet resolver", "throttled");
        assert!(err.is_retryable());
        assert!(err.to_string().starts_with("subnet resolver error"));
        assert_eq!(err.nodegroup(), None);

        let err = Error::collaborator_permanent("launch template fetcher", "lt-123 not found");
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("lt-123 not found"));
    }

    #[test]
    fn test_config_error_with_path() {
        let err = Error::config_at("cluster.yaml", "missing cluster.name");
        match &err {
            Error::Config { path, .. } => assert_eq!(path.as_deref(), Some("cluster.yaml")),
            _ => panic!("Expected Config variant"),
        }
        assert!(err.to_string().contains("missing cluster.name"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_serialization_for_kind() {
        let err = Error::serialization_for_kind("AWS::EKS::Nodegroup", "bad value");
        match &err {
            Error::Serialization { kind, .. } => {
                assert_eq!(kind.as_deref(), Some("AWS::EKS::Nodegroup"));
            }
            _ => panic!("Expected Serialization variant"),
        }
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unknown_context_constant() {
        assert_eq!(UNKNOWN_CONTEXT, "unknown");
        match Error::validation("test") {
            Error::Validation { nodegroup, .. } => assert_eq!(nodegroup, UNKNOWN_CONTEXT),
            _ => panic!("Expected Validation variant"),
        }
    }
}
