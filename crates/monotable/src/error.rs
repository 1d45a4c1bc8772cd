//! Error types for the DynamoDB layer.
//!
//! Mapping and validation failures are typed; underlying AWS SDK errors
//! are carried verbatim inside [`StoreError::Dynamo`] and never wrapped,
//! retried, or reconciled here. Retry/backoff policy belongs to the
//! caller.

use aws_sdk_dynamodb::error::SdkError;
use thiserror::Error;

/// Raised when a declared-required field is null, absent, or empty at
/// validation time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("required fields missing or empty: {}", .fields.join(", "))]
pub struct EmptyValueError {
    /// The offending field names, in declaration order.
    pub fields: Vec<&'static str>,
}

/// Errors converting between models and stored items.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("Missing key attribute: {0}")]
    MissingKey(&'static str),
    #[error("Key value does not match the declared key spec for {entity_type}")]
    KeyMismatch { entity_type: &'static str },
    #[error("Missing or invalid attribute: {0}")]
    InvalidAttribute(String),
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("No attributes selected for update")]
    NoAttributesSelected,
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    EmptyValue(#[from] EmptyValueError),
    /// Request construction error from the SDK builders.
    #[error(transparent)]
    Build(#[from] aws_sdk_dynamodb::error::BuildError),
    /// Underlying service error, propagated verbatim.
    #[error(transparent)]
    Dynamo(#[from] Box<aws_sdk_dynamodb::Error>),
}

impl<E, R> From<SdkError<E, R>> for StoreError
where
    aws_sdk_dynamodb::Error: From<SdkError<E, R>>,
{
    fn from(err: SdkError<E, R>) -> Self {
        StoreError::Dynamo(Box::new(err.into()))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_error_display() {
        let error = EmptyValueError {
            fields: vec!["name", "email"],
        };
        assert_eq!(
            error.to_string(),
            "required fields missing or empty: name, email"
        );
    }

    #[test]
    fn test_missing_key_display() {
        assert_eq!(
            MappingError::MissingKey("SK").to_string(),
            "Missing key attribute: SK"
        );
    }

    #[test]
    fn test_key_mismatch_display() {
        let error = MappingError::KeyMismatch {
            entity_type: "NOTE",
        };
        assert_eq!(
            error.to_string(),
            "Key value does not match the declared key spec for NOTE"
        );
    }

    #[test]
    fn test_store_error_is_transparent_over_mapping() {
        let error = StoreError::from(MappingError::NoAttributesSelected);
        assert_eq!(error.to_string(), "No attributes selected for update");
    }
}
