use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::serialization::{deserialize_ids, serialize_ids};
use super::Result;

/// Trait for cache backend operations.
///
/// Keys are fully namespaced (see [`super::KeyBuilder`]). Backends only need
/// `get`/`set`/`delete`; the batched and list operations have default
/// implementations that backends with native support override.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Gets several values at once. Missing keys are absent from the result.
    async fn get_multiple(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.get(key).await? {
                found.insert(key.clone(), value);
            }
        }
        Ok(found)
    }

    /// Deletes several keys. Stops at the first failure.
    async fn delete_many(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.delete(key).await?;
        }
        Ok(())
    }

    /// Gets an ordered id list stored under `key`.
    async fn get_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.get(key).await? {
            Some(bytes) => Ok(Some(deserialize_ids(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Stores an ordered id list under `key`.
    async fn set_list(&self, key: &str, ids: &[String], ttl: Option<Duration>) -> Result<()> {
        let bytes = serialize_ids(ids)?;
        self.set(key, &bytes, ttl).await
    }
}
