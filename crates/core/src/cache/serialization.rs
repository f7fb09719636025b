//! Pure functions for serializing/deserializing cache values.
//!
//! These functions use JSON serialization for cache storage, providing human-readable
//! cache values that are easy to debug and inspect.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use super::CacheError;

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value to bytes.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// Failed to deserialize bytes to a value.
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

impl From<SerializationError> for CacheError {
    fn from(err: SerializationError) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serializes an entity snapshot to JSON bytes.
pub fn serialize_entity<E: Serialize>(entity: &E) -> Result<Vec<u8>> {
    serde_json::to_vec(entity).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to an entity snapshot.
pub fn deserialize_entity<E: DeserializeOwned>(bytes: &[u8]) -> Result<E> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

/// Serializes a single id pointer (secondary map value).
pub fn serialize_id(id: &str) -> Vec<u8> {
    id.as_bytes().to_vec()
}

/// Deserializes a single id pointer.
///
/// Pointers are raw UTF-8; an empty pointer is rejected so a truncated
/// write never resolves to a bogus id.
pub fn deserialize_id(bytes: &[u8]) -> Result<String> {
    let id = std::str::from_utf8(bytes)
        .map_err(|e| SerializationError::DeserializeFailed(e.to_string()))?;
    if id.is_empty() {
        return Err(SerializationError::DeserializeFailed(
            "empty id pointer".to_string(),
        ));
    }
    Ok(id.to_string())
}

/// Serializes an ordered id list to JSON bytes.
pub fn serialize_ids(ids: &[String]) -> Result<Vec<u8>> {
    serde_json::to_vec(ids).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to an ordered id list.
pub fn deserialize_ids(bytes: &[u8]) -> Result<Vec<String>> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}
