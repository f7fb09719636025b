//! Repository wiring.
//!
//! Builds one cached repository per entity over a shared store, cache and
//! populator. Nothing here is process-global: every collaborator is passed
//! in, so tests can swap any of them.

use std::sync::Arc;

use tenantry_core::cache::Cache;
use tenantry_core::entity::{
    BillingRecord, Group, Membership, PaymentChannel, Quota, Setting, Space,
};
use tenantry_core::storage::Store;

use crate::cli::CacheBackend;
use crate::config::Config;
use crate::populator::Populator;
use crate::storage::CachedRepository;

/// A store that can hold every entity kind.
pub trait EntityStore:
    Store<Space>
    + Store<Group>
    + Store<Quota>
    + Store<Setting>
    + Store<Membership>
    + Store<BillingRecord>
    + Store<PaymentChannel>
    + 'static
{
}

impl<S> EntityStore for S where
    S: Store<Space>
        + Store<Group>
        + Store<Quota>
        + Store<Setting>
        + Store<Membership>
        + Store<BillingRecord>
        + Store<PaymentChannel>
        + 'static
{
}

/// Every cached repository, sharing one store, cache and populator.
pub struct Repositories<S: EntityStore> {
    pub spaces: CachedRepository<Space, S>,
    pub groups: CachedRepository<Group, S>,
    pub quotas: CachedRepository<Quota, S>,
    pub settings: CachedRepository<Setting, S>,
    pub memberships: CachedRepository<Membership, S>,
    pub billing: CachedRepository<BillingRecord, S>,
    pub channels: CachedRepository<PaymentChannel, S>,
    populator: Populator,
}

impl<S: EntityStore> Repositories<S> {
    /// Spawns the populator and builds the repositories.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(store: Arc<S>, cache: Arc<dyn Cache>, config: &Config) -> Self {
        let populator = Populator::new(config.populator());
        let ttl = config.ttl_policy();

        Self {
            spaces: CachedRepository::new(store.clone(), cache.clone(), populator.clone(), ttl),
            groups: CachedRepository::new(store.clone(), cache.clone(), populator.clone(), ttl),
            quotas: CachedRepository::new(store.clone(), cache.clone(), populator.clone(), ttl),
            settings: CachedRepository::new(store.clone(), cache.clone(), populator.clone(), ttl),
            memberships: CachedRepository::new(store.clone(), cache.clone(), populator.clone(), ttl),
            billing: CachedRepository::new(store.clone(), cache.clone(), populator.clone(), ttl),
            channels: CachedRepository::new(store, cache, populator.clone(), ttl),
            populator,
        }
    }

    /// Waits for all scheduled cache work.
    pub async fn flush(&self) {
        self.populator.flush().await;
    }

    /// Drains the populator and stops its workers.
    pub async fn shutdown(&self) {
        self.populator.shutdown().await;
    }
}

/// Connects the selected cache backend.
pub async fn connect_cache(backend: CacheBackend, config: &Config) -> anyhow::Result<Arc<dyn Cache>> {
    match backend {
        #[cfg(feature = "memory")]
        CacheBackend::Memory => Ok(Arc::new(crate::cache::MemoryCache::new(
            config.cache_max_entries,
        ))),
        #[cfg(feature = "redis")]
        CacheBackend::Redis => {
            let cache = crate::cache::RedisCache::new(&config.redis_url).await?;
            tracing::info!(url = %config.redis_url, "Connected to Redis cache");
            Ok(Arc::new(cache))
        }
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("cache backend {other:?} is not compiled in"),
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use tenantry_core::entity::Role;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_repositories_share_store_and_cache() {
        let config = Config::from_lookup(|_| None);
        let cache = connect_cache(CacheBackend::Memory, &config).await.unwrap();
        let repos = Repositories::new(Arc::new(InMemoryStore::new()), cache.clone(), &config);

        let space = repos
            .spaces
            .create(Space::new("acme", "Acme", Uuid::new_v4()))
            .await
            .unwrap();
        let user = Uuid::new_v4();
        repos
            .memberships
            .create(Membership::new(space.id, user, Role::Owner))
            .await
            .unwrap();
        repos.flush().await;

        assert!(matches!(
            cache.get(&format!("space:id:{}", space.id)).await,
            Ok(Some(_))
        ));
        assert_eq!(
            repos.memberships.role_of(space.id, user).await.unwrap(),
            Some(Role::Owner)
        );

        repos.shutdown().await;
    }

    #[cfg(not(feature = "redis"))]
    #[tokio::test]
    async fn test_missing_backend_is_an_error() {
        let config = Config::from_lookup(|_| None);
        assert!(connect_cache(CacheBackend::Redis, &config).await.is_err());
    }
}
