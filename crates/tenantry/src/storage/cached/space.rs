//! Space lookups.

use uuid::Uuid;

use tenantry_core::entity::{Space, SpaceStatus};
use tenantry_core::storage::{Result, Store};

use super::CachedRepository;

impl<S: Store<Space>> CachedRepository<Space, S> {
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Space>> {
        self.get_by_natural_key("slug", slug).await
    }

    /// Spaces owned by a user.
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Space>> {
        self.list_by_group("owner", &owner_id.to_string()).await
    }

    pub async fn list_by_status(&self, status: SpaceStatus) -> Result<Vec<Space>> {
        self.list_by_group("status", status.as_str()).await
    }
}
