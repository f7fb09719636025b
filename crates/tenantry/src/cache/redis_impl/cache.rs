//! Shared index maps in Redis.
//!
//! Every map entry is a plain string key. A batched read is one `MGET` and a
//! batched invalidation one `DEL`, so related keys disappear together rather
//! than one round trip at a time. Nothing here is transactional.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use tenantry_core::cache::{Cache, Result};

use super::error::map_redis_error;

/// Redis expiry granularity is whole seconds; sub-second TTLs round up to one.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Index map backend shared by every instance pointed at one Redis.
///
/// Cheap to clone: the multiplexed connection reconnects on its own.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Connects to `url`, e.g. `redis://localhost:6379`.
    ///
    /// Fails with `CacheError::ConnectionFailed` when the server is unreachable.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { manager })
    }

    fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection();
        conn.get(key).await.map_err(map_redis_error)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut command = redis::cmd("SET");
        command.arg(key).arg(value);
        if let Some(ttl) = ttl {
            command.arg("EX").arg(expiry_seconds(ttl));
        }
        let mut conn = self.connection();
        command
            .query_async::<()>(&mut conn)
            .await
            .map_err(map_redis_error)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection();
        conn.del::<_, ()>(key).await.map_err(map_redis_error)
    }

    async fn get_multiple(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let mut conn = self.connection();
        let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(map_redis_error)?;

        Ok(keys
            .iter()
            .zip(values)
            .filter_map(|(key, value)| Some((key.clone(), value?)))
            .collect())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection();
        conn.del::<_, ()>(keys).await.map_err(map_redis_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Connects to `REDIS_URL`, or returns `None` so the test can skip.
    async fn live_cache() -> Option<RedisCache> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        RedisCache::new(&url).await.ok()
    }

    /// A key namespace no other test run can collide with.
    fn scratch(map: &str, raw: &str) -> String {
        format!("tenantry-test-{}:{map}:{raw}", Uuid::new_v4())
    }

    #[test]
    fn test_sub_second_ttl_rounds_up() {
        assert_eq!(expiry_seconds(Duration::from_millis(10)), 1);
        assert_eq!(expiry_seconds(Duration::from_secs(7_200)), 7_200);
    }

    #[tokio::test]
    async fn test_primary_entry_set_read_invalidate() {
        let Some(cache) = live_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = scratch("id", "1");
        cache.set(&key, br#"{"slug":"acme"}"#, None).await.unwrap();
        assert_eq!(
            cache.get(&key).await.unwrap(),
            Some(br#"{"slug":"acme"}"#.to_vec())
        );

        cache.delete(&key).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let Some(cache) = live_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = scratch("relationship", "s:u");
        cache
            .set(&key, b"\"m-1\"", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1_500)).await;

        assert_eq!(cache.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_batch_read_reports_only_hits() {
        let Some(cache) = live_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let hit = scratch("id", "hit");
        let miss = scratch("id", "miss");
        cache.set(&hit, b"h", None).await.unwrap();

        let found = cache
            .get_multiple(&[hit.clone(), miss.clone()])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[&hit], b"h".to_vec());
        cache.delete(&hit).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalidation_batch_drops_every_key() {
        let Some(cache) = live_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let keys = vec![scratch("id", "g"), scratch("slug", "eng"), scratch("space", "s")];
        for key in &keys {
            cache.set(key, b"v", None).await.unwrap();
        }

        cache.delete_many(&keys).await.unwrap();
        cache.delete_many(&[]).await.unwrap();

        assert!(cache.get_multiple(&keys).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_members_round_trip() {
        let Some(cache) = live_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = scratch("space", "s");
        let ids = vec!["q-1".to_string(), "q-2".to_string()];
        cache.set_list(&key, &ids, None).await.unwrap();

        assert_eq!(cache.get_list(&key).await.unwrap(), Some(ids));
        cache.delete(&key).await.unwrap();
    }
}
