//! Serializer Module
//!
//! JSON encoding of payloads and stored items. Failures come back as
//! [`StorageError`] values, never panics.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Result, StorageError};

/// Encodes a value as JSON text.
pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decodes JSON text into `T`.
pub fn deserialize<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| StorageError::CorruptedData(e.to_string()))
}

/// Converts a value into a JSON tree.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decodes a JSON tree into `T`.
pub fn from_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| StorageError::CorruptedData(e.to_string()))
}
