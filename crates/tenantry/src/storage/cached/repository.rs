//! Generic cache-aside repository.

use std::marker::PhantomData;
use std::sync::Arc;

use tenantry_core::cache::{Cache, CacheError, CachePlan, KeyBuilder, TtlPolicy};
use tenantry_core::entity::{Entity, IndexKey};
use tenantry_core::storage::{Page, PageRequest, Predicate, Result, Store};

use crate::populator::Populator;

use super::IndexMap;

/// Cache-aside repository for one entity type.
///
/// - **Reads**: consult the index maps first; on a miss read the store and
///   schedule the cache fill on the [`Populator`].
/// - **Writes**: persist to the store, then schedule the invalidation plan.
///   Lists are never patched, only deleted, so the next read rebuilds them.
///
/// Store errors are the only errors a caller ever sees.
///
/// # Type Parameters
///
/// * `E` - The cached entity
/// * `S` - The backing store
pub struct CachedRepository<E, S>
where
    E: Entity,
    S: Store<E>,
{
    store: Arc<S>,
    maps: IndexMap,
    populator: Populator,
    keys: KeyBuilder,
    ttl: TtlPolicy,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S> Clone for CachedRepository<E, S>
where
    E: Entity,
    S: Store<E>,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            maps: self.maps.clone(),
            populator: self.populator.clone(),
            keys: self.keys,
            ttl: self.ttl,
            _entity: PhantomData,
        }
    }
}

impl<E, S> CachedRepository<E, S>
where
    E: Entity,
    S: Store<E>,
{
    /// Creates a repository over `store`.
    ///
    /// # Arguments
    ///
    /// * `store` - Source of truth
    /// * `cache` - Cache backend, usually shared by every repository
    /// * `populator` - Runs cache fills and invalidations off the caller's path
    /// * `ttl` - TTLs per class; `E::TTL_CLASS` picks the one used here
    pub fn new(store: Arc<S>, cache: Arc<dyn Cache>, populator: Populator, ttl: TtlPolicy) -> Self {
        Self {
            store,
            maps: IndexMap::new(cache),
            populator,
            keys: KeyBuilder::for_entity::<E>(),
            ttl,
            _entity: PhantomData,
        }
    }

    /// The backing store, for reads that must bypass the cache.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn populator(&self) -> &Populator {
        &self.populator
    }

    /// Reads by primary id.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<E>> {
        let key = self.keys.primary(id);
        if let Some(entity) = self.maps.get::<E>(&key).await {
            tracing::trace!(kind = E::KIND, id, "Cache hit");
            return Ok(Some(entity));
        }

        tracing::trace!(kind = E::KIND, id, "Cache miss");
        let entity = self.store.get_by_id(id).await?;
        if let Some(ref e) = entity {
            self.schedule(CachePlan::for_fill(&self.keys, e.clone(), None))
                .await;
        }
        Ok(entity)
    }

    /// Reads through a natural key.
    ///
    /// The secondary map only yields an id, which is resolved through
    /// [`Self::get_by_id`]. A pointer whose target no longer carries the key
    /// is treated as a miss.
    pub async fn get_by_natural_key(&self, index: &'static str, value: &str) -> Result<Option<E>> {
        let key = self.keys.secondary(index, value);
        let mut stale = false;

        if let Some(id) = self.maps.get_id(&key).await {
            if let Some(entity) = self.get_by_id(&id).await? {
                if entity.natural_key(index).as_deref() == Some(value) {
                    tracing::trace!(kind = E::KIND, index, value, "Cache hit");
                    return Ok(Some(entity));
                }
            }
            tracing::debug!(kind = E::KIND, index, value, id = %id, "Stale secondary pointer");
            stale = true;
        } else {
            tracing::trace!(kind = E::KIND, index, value, "Cache miss");
        }

        let entity = self.store.get_by(&Predicate::eq(index, value)).await?;
        match entity {
            Some(ref e) => {
                let pointer = IndexKey::new(index, value);
                self.schedule(CachePlan::for_fill(&self.keys, e.clone(), Some(&pointer)))
                    .await;
            }
            None if stale => {
                let mut plan = CachePlan::default();
                plan.delete.insert(key);
                self.schedule(plan).await;
            }
            None => {}
        }
        Ok(entity)
    }

    /// Lists every entity under a grouping key, ordered by id.
    pub async fn list_by_group(&self, index: &'static str, value: &str) -> Result<Vec<E>> {
        let key = self.keys.list(index, value);
        let group = IndexKey::new(index, value);

        if let Some(ids) = self.maps.get_list(&key).await {
            if let Some(entities) = self.resolve(&ids, &group).await? {
                tracing::trace!(kind = E::KIND, index, value, count = entities.len(), "Cache hit");
                return Ok(entities);
            }
            tracing::debug!(kind = E::KIND, index, value, "Stale cached list");
        } else {
            tracing::trace!(kind = E::KIND, index, value, "Cache miss");
        }

        let page = self
            .store
            .list(&Predicate::eq(index, value), PageRequest::all())
            .await?;
        self.schedule(CachePlan::for_list_fill(&self.keys, &group, page.items.clone()))
            .await;
        Ok(page.items)
    }

    /// Paged store listing. Arbitrary predicates are not cached.
    pub async fn list(&self, predicate: &Predicate, page: PageRequest) -> Result<Page<E>> {
        self.store.list(predicate, page).await
    }

    pub async fn count(&self, predicate: &Predicate) -> Result<u64> {
        self.store.count(predicate).await
    }

    /// Creates an entity.
    ///
    /// Any exclusivity flag the entity sets is cleared on its peers inside the
    /// same store write; the demoted peers are refreshed in the cache too.
    pub async fn create(&self, entity: E) -> Result<E> {
        let written = self.store.create(&entity).await?;
        self.schedule(CachePlan::for_create(&self.keys, &written))
            .await;

        tracing::debug!(
            kind = E::KIND,
            id = %written.entity.id(),
            demoted = written.demoted.len(),
            "Entity created"
        );
        Ok(written.entity)
    }

    /// Applies a typed patch.
    ///
    /// The cached snapshot, if any, is read first so keys it still advertises
    /// get invalidated alongside the ones the store reports as replaced.
    pub async fn update(&self, id: &str, patch: &E::Patch) -> Result<E> {
        let cached = self.maps.get::<E>(&self.keys.primary(id)).await;
        let written = self.store.update(id, patch).await?;
        self.schedule(CachePlan::for_update(&self.keys, cached.as_slice(), &written))
            .await;

        tracing::debug!(
            kind = E::KIND,
            id,
            demoted = written.demoted.len(),
            "Entity updated"
        );
        Ok(written.entity)
    }

    /// Deletes an entity and returns its last stored state.
    pub async fn delete(&self, id: &str) -> Result<E> {
        let cached = self.maps.get::<E>(&self.keys.primary(id)).await;
        let deleted = self.store.delete(id).await?;

        let mut snapshots = vec![deleted.clone()];
        snapshots.extend(cached);
        self.schedule(CachePlan::for_delete(&self.keys, &snapshots))
            .await;

        tracing::debug!(kind = E::KIND, id, "Entity deleted");
        Ok(deleted)
    }

    /// Resolves list members, batched, falling back per id on a partial miss.
    ///
    /// Returns `None` when the list no longer matches the store: a member
    /// vanished or moved to another group.
    async fn resolve(&self, ids: &[String], group: &IndexKey) -> Result<Option<Vec<E>>> {
        let keys: Vec<String> = ids.iter().map(|id| self.keys.primary(id)).collect();
        let mut found = self.maps.get_multiple::<E>(&keys).await;

        if found.len() < keys.len() {
            let miss = CacheError::PartialMiss {
                requested: keys.len(),
                found: found.len(),
            };
            tracing::debug!(kind = E::KIND, error = %miss, "Resolving list members from store");
        }

        let mut entities = Vec::with_capacity(ids.len());
        for (id, key) in ids.iter().zip(&keys) {
            let entity = match found.remove(key) {
                Some(entity) => entity,
                None => match self.get_by_id(id).await? {
                    Some(entity) => entity,
                    None => return Ok(None),
                },
            };
            if !entity.group_keys().contains(group) {
                return Ok(None);
            }
            entities.push(entity);
        }
        Ok(Some(entities))
    }

    /// Queues `plan` behind every earlier plan for this entity kind.
    ///
    /// All plans of one namespace share a populator shard, so a fill
    /// scheduled by a read is applied before the invalidation of any write
    /// that follows it.
    async fn schedule(&self, plan: CachePlan<E>) {
        if plan.is_empty() {
            return;
        }
        let maps = self.maps.clone();
        let keys = self.keys;
        let ttl = self.ttl;
        self.populator
            .submit(E::KIND, async move { execute(&maps, &keys, ttl, plan).await })
            .await;
    }
}

/// Applies a plan: invalidations first, then writes.
async fn execute<E: Entity>(maps: &IndexMap, keys: &KeyBuilder, ttl: TtlPolicy, plan: CachePlan<E>) {
    let entity_ttl = ttl.ttl_for(E::TTL_CLASS);
    let list_ttl = ttl.list_ttl_for(E::TTL_CLASS);

    let deleted: Vec<String> = plan.delete.into_iter().collect();
    maps.delete_many(&deleted).await;

    for entity in &plan.put {
        maps.set(&keys.primary(&entity.id()), entity, entity_ttl).await;
    }
    for (key, id) in &plan.point {
        maps.set_id(key, id, entity_ttl).await;
    }
    for (key, ids) in &plan.lists {
        maps.set_list(key, ids, list_ttl).await;
    }

    tracing::trace!(
        kind = E::KIND,
        invalidated = deleted.len(),
        written = plan.put.len() + plan.point.len() + plan.lists.len(),
        "Cache plan applied"
    );
}
