//! Kind-agnostic stored form of an entity.
//!
//! Both stores keep every entity type in one record table: the JSON body plus
//! the derived keys, references and exclusivity scope the store needs to
//! enforce uniqueness, referential integrity and exclusivity without knowing
//! the concrete type.

use tenantry_core::entity::{Entity, EntityRef, IndexKey};
use tenantry_core::storage::{RepositoryError, Result};

/// An entity in stored form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub kind: &'static str,
    pub id: String,
    pub body: String,
    pub natural: Vec<IndexKey>,
    pub groups: Vec<IndexKey>,
    pub refs: Vec<EntityRef>,
    pub exclusive: Option<String>,
}

impl StoredRecord {
    /// Encodes an entity.
    pub fn encode<E: Entity>(entity: &E) -> Result<Self> {
        let body = serde_json::to_string(entity)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        Ok(Self {
            kind: E::KIND,
            id: entity.id(),
            body,
            natural: entity.natural_keys(),
            groups: entity.group_keys(),
            refs: entity.references(),
            exclusive: entity.exclusive_scope(),
        })
    }

    /// Decodes the body back into `E`.
    pub fn decode<E: Entity>(&self) -> Result<E> {
        decode_body(&self.body)
    }

    /// Returns true if this record references `kind`/`id`.
    pub fn references(&self, kind: &str, id: &str) -> bool {
        self.refs.iter().any(|r| r.kind == kind && r.id == id)
    }
}

/// Decodes a stored JSON body.
pub fn decode_body<E: Entity>(body: &str) -> Result<E> {
    serde_json::from_str(body).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Error for a natural key already held by another record.
pub fn duplicate_key(kind: &'static str, key: &IndexKey) -> RepositoryError {
    RepositoryError::AlreadyExists {
        entity_type: kind,
        key: format!("{}={}", key.index, key.value),
    }
}

/// Error for a write that points at a record that does not exist.
pub fn dangling_reference(kind: &str, id: &str, target: &EntityRef) -> RepositoryError {
    RepositoryError::ConstraintViolation(format!(
        "{kind} {id} references missing {} {}",
        target.kind, target.id
    ))
}

/// Refuses an entity whose own invariants do not hold.
pub fn check_invariants<E: Entity>(entity: &E) -> Result<()> {
    entity.validate().map_err(|reason| {
        RepositoryError::InvalidData(format!("{} {}: {reason}", E::KIND, entity.id()))
    })
}

/// Error for a delete of a record that is still referenced.
pub fn still_referenced(kind: &str, id: &str, by_kind: &str, by_id: &str) -> RepositoryError {
    RepositoryError::ConstraintViolation(format!(
        "{kind} {id} is referenced by {by_kind} {by_id}"
    ))
}
