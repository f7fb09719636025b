//! Best-effort typed access to the cache backend.
//!
//! Every read failure or undecodable payload becomes a miss and every write
//! failure is logged, so nothing in here can fail a repository operation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use tenantry_core::cache::{deserialize_entity, deserialize_id, serialize_entity, serialize_id, Cache};

/// Primary, secondary and list maps over one shared [`Cache`].
///
/// The map a key belongs to is encoded in the key itself (see
/// [`tenantry_core::cache::KeyBuilder`]), so one instance serves them all.
#[derive(Clone)]
pub struct IndexMap {
    cache: Arc<dyn Cache>,
}

impl IndexMap {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    /// Reads an entity snapshot. `None` means unknown, not absent.
    pub async fn get<E: DeserializeOwned>(&self, key: &str) -> Option<E> {
        let bytes = match self.cache.get(key).await {
            Ok(bytes) => bytes?,
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache read failed");
                return None;
            }
        };
        match deserialize_entity(&bytes) {
            Ok(entity) => Some(entity),
            Err(err) => {
                tracing::warn!(key, error = %err, "Cached entity deserialization failed");
                None
            }
        }
    }

    /// Reads a secondary pointer.
    pub async fn get_id(&self, key: &str) -> Option<String> {
        let bytes = match self.cache.get(key).await {
            Ok(bytes) => bytes?,
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache read failed");
                return None;
            }
        };
        match deserialize_id(&bytes) {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!(key, error = %err, "Cached pointer deserialization failed");
                None
            }
        }
    }

    /// Reads an id list.
    pub async fn get_list(&self, key: &str) -> Option<Vec<String>> {
        match self.cache.get_list(key).await {
            Ok(ids) => ids,
            Err(err) => {
                tracing::warn!(key, error = %err, "Cached list read failed");
                None
            }
        }
    }

    /// Reads several snapshots. Keys that miss or fail to decode are absent.
    pub async fn get_multiple<E: DeserializeOwned>(&self, keys: &[String]) -> HashMap<String, E> {
        let found = match self.cache.get_multiple(keys).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(requested = keys.len(), error = %err, "Cache multi-get failed");
                return HashMap::new();
            }
        };

        found
            .into_iter()
            .filter_map(|(key, bytes)| match deserialize_entity(&bytes) {
                Ok(entity) => Some((key, entity)),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "Cached entity deserialization failed");
                    None
                }
            })
            .collect()
    }

    pub async fn set<E: Serialize>(&self, key: &str, entity: &E, ttl: Duration) {
        let bytes = match serialize_entity(entity) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(key, error = %err, "Entity serialization failed");
                return;
            }
        };
        if let Err(err) = self.cache.set(key, &bytes, Some(ttl)).await {
            tracing::warn!(key, error = %err, "Failed to cache entity");
        }
    }

    pub async fn set_id(&self, key: &str, id: &str, ttl: Duration) {
        if let Err(err) = self.cache.set(key, &serialize_id(id), Some(ttl)).await {
            tracing::warn!(key, error = %err, "Failed to cache pointer");
        }
    }

    pub async fn set_list(&self, key: &str, ids: &[String], ttl: Duration) {
        if let Err(err) = self.cache.set_list(key, ids, Some(ttl)).await {
            tracing::warn!(key, error = %err, "Failed to cache list");
        }
    }

    pub async fn delete_many(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        if let Err(err) = self.cache.delete_many(keys).await {
            tracing::warn!(count = keys.len(), error = %err, "Failed to invalidate cache keys");
        }
    }
}
