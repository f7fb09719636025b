use async_trait::async_trait;

use crate::entity::Entity;

use super::{Page, PageRequest, Predicate, Result, Written};

/// Authoritative persistent backend for one entity type.
///
/// Implementations enforce, inside the write itself:
/// - natural keys are unique per kind (`AlreadyExists`),
/// - a record cannot be deleted while referenced (`ConstraintViolation`),
/// - setting an exclusivity flag clears it on every other record of the
///   same scope, reported back in [`Written::demoted`].
#[async_trait]
pub trait Store<E: Entity>: Send + Sync {
    /// Creates a new entity.
    async fn create(&self, entity: &E) -> Result<Written<E>>;

    /// Gets an entity by its ID.
    async fn get_by_id(&self, id: &str) -> Result<Option<E>>;

    /// Gets the first entity (by id) matching the predicate.
    async fn get_by(&self, predicate: &Predicate) -> Result<Option<E>>;

    /// Lists matching entities ordered by id.
    async fn list(&self, predicate: &Predicate, page: PageRequest) -> Result<Page<E>>;

    /// Counts matching entities.
    async fn count(&self, predicate: &Predicate) -> Result<u64>;

    /// Applies a typed patch to an existing entity.
    async fn update(&self, id: &str, patch: &E::Patch) -> Result<Written<E>>;

    /// Deletes an entity by its ID, returning the removed state.
    async fn delete(&self, id: &str) -> Result<E>;
}
