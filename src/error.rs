//! Error types for the Athanor SDK.

use thiserror::Error;

use crate::schema::Diagnostic;
use crate::value::ValueKind;

/// Errors that can occur when building blueprints or schemas, or when
/// implementing a provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource instance was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// No handler is registered for the resource type.
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    /// A handler failure, malformed payload, or unregistered capability.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A typed accessor was used on a value of a different kind.
    #[error("Wrong kind: expected {expected}, got {actual}")]
    WrongKind {
        /// The kind the caller asked for.
        expected: ValueKind,
        /// The kind the value actually has.
        actual: ValueKind,
    },

    /// Two distinct struct definitions share one name.
    #[error("Duplicate type definition: {0}")]
    DuplicateType(String),

    /// An alias is bound to more than one definition within a blueprint.
    #[error("Duplicate alias: {0}")]
    DuplicateAlias(String),

    /// A value does not match its schema.
    #[error("Validation failed: {}", join_diagnostics(.0))]
    Validation(Vec<Diagnostic>),

    /// A protobuf payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// A JSON payload could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A gRPC transport error occurred.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

impl ProviderError {
    /// Shorthand for an [`ProviderError::Internal`] error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Shorthand for a [`ProviderError::NotFound`] error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether this error means "the thing does not exist" rather than a failure.
    ///
    /// Both an unknown resource type and a missing instance qualify.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::UnknownResourceType(_))
    }
}

fn join_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| match &d.attribute {
            Some(attr) => format!("{}: {}", attr, d.summary),
            None => d.summary.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(msg) => tonic::Status::not_found(msg),
            ProviderError::UnknownResourceType(resource_type) => tonic::Status::not_found(
                format!("resource type not found: {}", resource_type),
            ),
            other => tonic::Status::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("bucket/x".to_string());
        assert_eq!(format!("{}", err), "Resource not found: bucket/x");

        let err = ProviderError::UnknownResourceType("queue".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: queue");

        let err = ProviderError::WrongKind {
            expected: ValueKind::String,
            actual: ValueKind::Map,
        };
        assert_eq!(format!("{}", err), "Wrong kind: expected string, got map");

        let err = ProviderError::DuplicateType("config".to_string());
        assert_eq!(format!("{}", err), "Duplicate type definition: config");
    }

    #[test]
    fn test_validation_display_joins_diagnostics() {
        let err = ProviderError::Validation(vec![
            Diagnostic::error("Missing field").with_attribute("name"),
            Diagnostic::error("Unknown field"),
        ]);
        assert_eq!(
            format!("{}", err),
            "Validation failed: name: Missing field; Unknown field"
        );
    }

    #[test]
    fn test_error_to_status() {
        let status: tonic::Status = ProviderError::not_found("no such bucket").into();
        assert_eq!(status.code(), tonic::Code::NotFound);
        assert_eq!(status.message(), "no such bucket");

        let status: tonic::Status = ProviderError::UnknownResourceType("queue".into()).into();
        assert_eq!(status.code(), tonic::Code::NotFound);

        let status: tonic::Status = ProviderError::internal("boom").into();
        assert_eq!(status.code(), tonic::Code::Internal);

        let status: tonic::Status = ProviderError::WrongKind {
            expected: ValueKind::Bool,
            actual: ValueKind::Nil,
        }
        .into();
        assert_eq!(status.code(), tonic::Code::Internal);

        let status: tonic::Status = ProviderError::DuplicateType("config".into()).into();
        assert_eq!(status.code(), tonic::Code::Internal);
    }

    #[test]
    fn test_is_not_found() {
        assert!(ProviderError::not_found("x").is_not_found());
        assert!(ProviderError::UnknownResourceType("x".into()).is_not_found());
        assert!(!ProviderError::internal("x").is_not_found());
    }
}
