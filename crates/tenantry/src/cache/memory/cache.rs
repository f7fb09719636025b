//! Bounded in-process index map backend.
//!
//! Entries carry an optional deadline and are reaped lazily: a read that
//! finds an expired slot removes it and reports a miss. Capacity is bounded
//! by least-recently-used eviction, so cold list keys fall out before hot
//! primary entries.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use tenantry_core::cache::{Cache, Result};

type Slots = LruCache<String, Slot>;

#[derive(Debug, Clone)]
struct Slot {
    bytes: Vec<u8>,
    deadline: Option<Instant>,
}

impl Slot {
    fn live_until(bytes: &[u8], ttl: Option<Duration>) -> Self {
        Self {
            bytes: bytes.to_vec(),
            deadline: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.deadline.map_or(true, |deadline| now <= deadline)
    }
}

/// Promotes `key` and returns its bytes, dropping it first if it expired.
fn take_live(slots: &mut Slots, key: &str, now: Instant) -> Option<Vec<u8>> {
    let live = slots.get(key)?.is_live(now);
    if !live {
        slots.pop(key);
        return None;
    }
    slots.peek(key).map(|slot| slot.bytes.clone())
}

/// Index map backend held in process memory.
///
/// Cloning shares the underlying slots, so every repository built from one
/// `MemoryCache` sees the same primary, secondary and list maps.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    slots: Arc<RwLock<Slots>>,
}

impl MemoryCache {
    /// Holds at most `max_entries` keys; 0 is raised to 1.
    pub fn new(max_entries: usize) -> Self {
        let bound = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            slots: Arc::new(RwLock::new(LruCache::new(bound))),
        }
    }

    /// Number of held keys, including expired ones not yet reaped.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether `key` holds a live value, without promoting it.
    pub async fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.slots
            .read()
            .await
            .peek(key)
            .is_some_and(|slot| slot.is_live(now))
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut slots = self.slots.write().await;
        Ok(take_live(&mut slots, key, Instant::now()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        self.slots
            .write()
            .await
            .put(key.to_owned(), Slot::live_until(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.slots.write().await.pop(key);
        Ok(())
    }

    async fn get_multiple(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        let now = Instant::now();
        let mut slots = self.slots.write().await;
        Ok(keys
            .iter()
            .filter_map(|key| take_live(&mut slots, key, now).map(|bytes| (key.clone(), bytes)))
            .collect())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<()> {
        let mut slots = self.slots.write().await;
        keys.iter().for_each(|key| {
            slots.pop(key);
        });
        Ok(())
    }
}
