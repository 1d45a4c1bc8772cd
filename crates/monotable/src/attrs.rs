//! DynamoDB attribute helpers.
//!
//! Small pure functions for building and reading `AttributeValue` maps.
//! These are testable in isolation without DynamoDB access.

use std::collections::HashMap;
use std::str::FromStr;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use monotable_core::Ksuid;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::MappingError;

/// A DynamoDB item: attribute names mapped to their values.
pub type Item = HashMap<String, AttributeValue>;

// ============================================================================
// Builders
// ============================================================================

/// String attribute.
pub fn s(value: impl Into<String>) -> AttributeValue {
    AttributeValue::S(value.into())
}

/// Number attribute. DynamoDB numbers travel as strings.
pub fn n(value: impl ToString) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

/// Boolean attribute.
pub fn boolean(value: bool) -> AttributeValue {
    AttributeValue::Bool(value)
}

/// Null attribute.
pub fn null() -> AttributeValue {
    AttributeValue::Null(true)
}

/// Datetime attribute, stored as an RFC 3339 string.
pub fn datetime(value: DateTime<Utc>) -> AttributeValue {
    AttributeValue::S(value.to_rfc3339())
}

/// Optional string attribute; `None` becomes a null attribute.
pub fn opt_s(value: Option<&str>) -> AttributeValue {
    match value {
        Some(value) => s(value),
        None => null(),
    }
}

/// Complex payload stored as a JSON string inside a string attribute.
pub fn json<T: Serialize>(value: &T) -> Result<AttributeValue, MappingError> {
    let text =
        serde_json::to_string(value).map_err(|e| MappingError::Serialization(e.to_string()))?;
    Ok(AttributeValue::S(text))
}

// ============================================================================
// Readers
// ============================================================================

/// Get a required string attribute.
pub fn get_string(item: &Item, key: &str) -> Result<String, MappingError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| MappingError::InvalidAttribute(key.to_string()))
}

/// Get an optional string attribute. Missing and null both read as `None`.
pub fn get_optional_string(item: &Item, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}

/// Get a required number attribute, parsed into any `FromStr` numeric type.
pub fn get_number<T: FromStr>(item: &Item, key: &str) -> Result<T, MappingError> {
    item.get(key)
        .and_then(|v| v.as_n().ok())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| MappingError::InvalidAttribute(key.to_string()))
}

/// Get a required boolean attribute.
pub fn get_bool(item: &Item, key: &str) -> Result<bool, MappingError> {
    item.get(key)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| MappingError::InvalidAttribute(key.to_string()))
}

/// Get a required datetime attribute (RFC 3339 string).
pub fn get_datetime(item: &Item, key: &str) -> Result<DateTime<Utc>, MappingError> {
    let text = get_string(item, key)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| MappingError::InvalidAttribute(format!("{key}: {e}")))
}

/// Get a required sortable identifier attribute (base62 string).
pub fn get_ksuid(item: &Item, key: &str) -> Result<Ksuid, MappingError> {
    let text = get_string(item, key)?;
    text.parse()
        .map_err(|e| MappingError::InvalidAttribute(format!("{key}: {e}")))
}

/// Get a required JSON payload attribute.
pub fn get_json<T: DeserializeOwned>(item: &Item, key: &str) -> Result<T, MappingError> {
    let text = get_string(item, key)?;
    serde_json::from_str(&text).map_err(|e| MappingError::Serialization(e.to_string()))
}

// ============================================================================
// Item-level helpers
// ============================================================================

/// Drops null attributes from an item.
pub fn strip_nulls(item: Item) -> Item {
    item.into_iter()
        .filter(|(_, value)| !matches!(value, AttributeValue::Null(_)))
        .collect()
}

/// Type-appropriate emptiness rule used by presence validation: null
/// attributes, empty strings, and empty containers are empty; booleans
/// and numbers (including zero) always count as present.
pub fn is_empty_value(value: &AttributeValue) -> bool {
    match value {
        AttributeValue::Null(_) => true,
        AttributeValue::S(s) => s.is_empty(),
        AttributeValue::B(b) => b.as_ref().is_empty(),
        AttributeValue::L(l) => l.is_empty(),
        AttributeValue::M(m) => m.is_empty(),
        AttributeValue::Ss(v) => v.is_empty(),
        AttributeValue::Ns(v) => v.is_empty(),
        AttributeValue::Bs(v) => v.is_empty(),
        _ => false,
    }
}
