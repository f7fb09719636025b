//! Membership lookups.
//!
//! Pairwise checks go through the `relationship` secondary map, so answering
//! "is this user in this space" costs two cache reads on a warm cache.

use uuid::Uuid;

use tenantry_core::cache::RELATIONSHIP_MAP;
use tenantry_core::entity::{Membership, Role};
use tenantry_core::storage::{Result, Store};

use super::CachedRepository;

impl<S: Store<Membership>> CachedRepository<Membership, S> {
    pub async fn get_relationship(&self, space_id: Uuid, user_id: Uuid) -> Result<Option<Membership>> {
        self.get_by_natural_key(RELATIONSHIP_MAP, &Membership::relationship_key(space_id, user_id))
            .await
    }

    pub async fn has_relationship(&self, space_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self.get_relationship(space_id, user_id).await?.is_some())
    }

    pub async fn role_of(&self, space_id: Uuid, user_id: Uuid) -> Result<Option<Role>> {
        Ok(self
            .get_relationship(space_id, user_id)
            .await?
            .map(|m| m.role))
    }

    pub async fn list_for_space(&self, space_id: Uuid) -> Result<Vec<Membership>> {
        self.list_by_group("space", &space_id.to_string()).await
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Membership>> {
        self.list_by_group("user", &user_id.to_string()).await
    }
}
