//! Test doubles for the cached repositories.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use tenantry_core::cache::{Cache, CacheError, Result as CacheResult, TtlPolicy};
use tenantry_core::entity::Entity;
use tenantry_core::storage::{Page, PageRequest, Predicate, Result, Store, Written};

use crate::cache::MemoryCache;
use crate::populator::{Populator, PopulatorConfig};
use crate::storage::InMemoryStore;

use super::CachedRepository;

/// A cache backend that is always down.
pub struct FailingCache;

#[async_trait]
impl Cache for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Err(CacheError::ConnectionFailed("cache is down".to_string()))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
        Err(CacheError::ConnectionFailed("cache is down".to_string()))
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::ConnectionFailed("cache is down".to_string()))
    }
}

/// A memory cache whose `set` stalls on keys containing `pattern`.
///
/// Only the first `slow_sets` matching writes are delayed.
pub struct SlowCache {
    inner: MemoryCache,
    pattern: &'static str,
    delay: Duration,
    slow_sets: AtomicUsize,
}

impl SlowCache {
    pub fn new(
        inner: MemoryCache,
        pattern: &'static str,
        delay: Duration,
        slow_sets: usize,
    ) -> Self {
        Self {
            inner,
            pattern,
            delay,
            slow_sets: AtomicUsize::new(slow_sets),
        }
    }
}

#[async_trait]
impl Cache for SlowCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        let stall = key.contains(self.pattern)
            && self
                .slow_sets
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
        if stall {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.inner.delete(key).await
    }

    async fn get_multiple(&self, keys: &[String]) -> CacheResult<HashMap<String, Vec<u8>>> {
        self.inner.get_multiple(keys).await
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<()> {
        self.inner.delete_many(keys).await
    }
}

/// Wraps a store and counts reads that reach it.
pub struct CountingStore<S> {
    inner: S,
    reads: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<E, S> Store<E> for CountingStore<S>
where
    E: Entity,
    S: Store<E>,
{
    async fn create(&self, entity: &E) -> Result<Written<E>> {
        self.inner.create(entity).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<E>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_id(id).await
    }

    async fn get_by(&self, predicate: &Predicate) -> Result<Option<E>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by(predicate).await
    }

    async fn list(&self, predicate: &Predicate, page: PageRequest) -> Result<Page<E>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.list(predicate, page).await
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64> {
        self.inner.count(predicate).await
    }

    async fn update(&self, id: &str, patch: &E::Patch) -> Result<Written<E>> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<E> {
        self.inner.delete(id).await
    }
}

/// Everything a repository test needs, sharing one store and one cache.
pub struct Harness {
    pub store: Arc<CountingStore<InMemoryStore>>,
    pub cache: Arc<MemoryCache>,
    pub populator: Populator,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: Arc::new(CountingStore::new(InMemoryStore::new())),
            cache: Arc::new(MemoryCache::new(1024)),
            populator: Populator::new(PopulatorConfig {
                workers: 2,
                queue_capacity: 64,
            }),
        }
    }

    pub fn repository<E: Entity>(&self) -> CachedRepository<E, CountingStore<InMemoryStore>> {
        CachedRepository::new(
            Arc::clone(&self.store),
            self.cache.clone(),
            self.populator.clone(),
            TtlPolicy::default(),
        )
    }

    /// A repository over the same store and populator but another cache.
    pub fn repository_over<E: Entity>(
        &self,
        cache: Arc<dyn Cache>,
    ) -> CachedRepository<E, CountingStore<InMemoryStore>> {
        CachedRepository::new(
            Arc::clone(&self.store),
            cache,
            self.populator.clone(),
            TtlPolicy::default(),
        )
    }

    /// A repository over the same store whose cache always fails.
    pub fn failing_repository<E: Entity>(&self) -> CachedRepository<E, CountingStore<InMemoryStore>> {
        CachedRepository::new(
            Arc::clone(&self.store),
            Arc::new(FailingCache),
            self.populator.clone(),
            TtlPolicy::default(),
        )
    }

    pub async fn flush(&self) {
        self.populator.flush().await;
    }

    /// Whether the cache currently holds `key`.
    pub async fn cached(&self, key: &str) -> bool {
        matches!(self.cache.get(key).await, Ok(Some(_)))
    }
}
