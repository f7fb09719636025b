//! In-memory store implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tenantry_core::entity::Entity;
use tenantry_core::storage::{
    Change, Page, PageRequest, Predicate, RepositoryError, Result, Store, Written,
};

use crate::storage::record::{
    check_invariants, dangling_reference, duplicate_key, still_referenced, StoredRecord,
};

/// Record tables keyed by kind, each ordered by id.
#[derive(Debug, Default)]
struct Tables {
    records: HashMap<&'static str, BTreeMap<String, StoredRecord>>,
}

impl Tables {
    fn records_of(&self, kind: &str) -> impl Iterator<Item = &StoredRecord> {
        self.records.get(kind).into_iter().flat_map(|t| t.values())
    }

    fn get(&self, kind: &str, id: &str) -> Option<&StoredRecord> {
        self.records.get(kind).and_then(|t| t.get(id))
    }

    fn exists(&self, kind: &str, id: &str) -> bool {
        self.get(kind, id).is_some()
    }

    /// Validates and stores `entity`, clearing the exclusivity flag of every
    /// other record in its scope. Nothing is mutated unless every check passes.
    fn save<E: Entity>(&mut self, entity: E, previous: Option<E>) -> Result<Written<E>> {
        check_invariants(&entity)?;
        let id = entity.id();
        let record = StoredRecord::encode(&entity)?;

        let mut demoted = Vec::new();
        if let Some(scope) = &record.exclusive {
            for other in self.records_of(E::KIND) {
                if other.id != id && other.exclusive.as_ref() == Some(scope) {
                    let before: E = other.decode()?;
                    let mut after = before.clone();
                    after.clear_exclusive();
                    demoted.push(Change { before, after });
                }
            }
        }
        let demoted_records = demoted
            .iter()
            .map(|change| StoredRecord::encode(&change.after))
            .collect::<Result<Vec<_>>>()?;

        for key in &record.natural {
            let clash = self.records_of(E::KIND).any(|other| {
                let natural = demoted_records
                    .iter()
                    .find(|d| d.id == other.id)
                    .map_or(&other.natural, |d| &d.natural);
                other.id != id && natural.contains(key)
            });
            if clash {
                return Err(duplicate_key(E::KIND, key));
            }
        }

        for target in &record.refs {
            let is_self = target.kind == E::KIND && target.id == id;
            if !is_self && !self.exists(target.kind, &target.id) {
                return Err(dangling_reference(E::KIND, &id, target));
            }
        }

        let table = self.records.entry(E::KIND).or_default();
        for demoted_record in demoted_records {
            table.insert(demoted_record.id.clone(), demoted_record);
        }
        table.insert(id, record);

        Ok(Written {
            previous,
            entity,
            demoted,
        })
    }

    fn matching<E: Entity>(&self, predicate: &Predicate, cursor: Option<&str>) -> Result<Vec<E>> {
        let mut found = Vec::new();
        for record in self.records_of(E::KIND) {
            if cursor.is_some_and(|c| record.id.as_str() <= c) {
                continue;
            }
            let entity: E = record.decode()?;
            if predicate.matches(&entity) {
                found.push(entity);
            }
        }
        Ok(found)
    }
}

/// In-memory store for tests and development.
///
/// All entity kinds share one record table behind an `Arc<RwLock<_>>`, so a
/// write holds the lock for its whole validation and commit. Data is not
/// persisted and is lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<E: Entity> Store<E> for InMemoryStore {
    async fn create(&self, entity: &E) -> Result<Written<E>> {
        let mut tables = self.tables.write().await;
        let id = entity.id();
        if tables.exists(E::KIND, &id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: E::KIND,
                key: format!("id={id}"),
            });
        }
        tables.save(entity.clone(), None)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<E>> {
        let tables = self.tables.read().await;
        tables.get(E::KIND, id).map(StoredRecord::decode::<E>).transpose()
    }

    async fn get_by(&self, predicate: &Predicate) -> Result<Option<E>> {
        let tables = self.tables.read().await;
        Ok(tables.matching::<E>(predicate, None)?.into_iter().next())
    }

    async fn list(&self, predicate: &Predicate, page: PageRequest) -> Result<Page<E>> {
        let tables = self.tables.read().await;
        let mut items: Vec<E> = tables.matching(predicate, page.cursor.as_deref())?;
        if let Some(limit) = page.limit {
            items.truncate(limit.saturating_add(1));
        }
        Ok(Page::from_sorted(items, page.limit))
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64> {
        let tables = self.tables.read().await;
        let matching: Vec<E> = tables.matching(predicate, None)?;
        Ok(matching.len() as u64)
    }

    async fn update(&self, id: &str, patch: &E::Patch) -> Result<Written<E>> {
        let mut tables = self.tables.write().await;
        let current: E = tables
            .get(E::KIND, id)
            .ok_or_else(|| RepositoryError::not_found(E::KIND, id))?
            .decode()?;

        let mut next = current.clone();
        next.apply(patch);
        tables.save(next, Some(current))
    }

    async fn delete(&self, id: &str) -> Result<E> {
        let mut tables = self.tables.write().await;
        if !tables.exists(E::KIND, id) {
            return Err(RepositoryError::not_found(E::KIND, id));
        }

        let referrer = tables
            .records
            .values()
            .flat_map(|t| t.values())
            .find(|r| r.references(E::KIND, id) && !(r.kind == E::KIND && r.id == id));
        if let Some(referrer) = referrer {
            return Err(still_referenced(E::KIND, id, referrer.kind, &referrer.id));
        }

        let record = tables
            .records
            .get_mut(E::KIND)
            .and_then(|t| t.remove(id))
            .ok_or_else(|| RepositoryError::not_found(E::KIND, id))?;
        record.decode()
    }
}
