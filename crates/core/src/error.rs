use thiserror::Error;

/// Errors that can occur when constructing or parsing sortable identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KsuidError {
    #[error("Invalid byte length: expected {expected}, got {actual}")]
    InvalidByteLength { expected: usize, actual: usize },
    #[error("Invalid text length: expected {expected}, got {actual}")]
    InvalidTextLength { expected: usize, actual: usize },
    #[error("Invalid base62 character: {0:?}")]
    InvalidCharacter(char),
    #[error("Encoded value exceeds the identifier range")]
    Overflow,
}
