//! Quota lookups and consumption.

use uuid::Uuid;

use tenantry_core::entity::{Quota, QuotaPatch};
use tenantry_core::storage::{Result, Store};

use super::CachedRepository;

impl<S: Store<Quota>> CachedRepository<Quota, S> {
    pub async fn get_for_resource(&self, space_id: Uuid, resource: &str) -> Result<Option<Quota>> {
        self.get_by_natural_key("resource", &Quota::resource_key(space_id, resource))
            .await
    }

    pub async fn list_for_space(&self, space_id: Uuid) -> Result<Vec<Quota>> {
        self.list_by_group("space", &space_id.to_string()).await
    }

    /// Records `amount` units of usage.
    ///
    /// The increment is applied to the stored usage inside the store's write,
    /// so concurrent consumers never lose an update. Returns `InvalidData`
    /// when the quota would be exceeded; nothing is written then.
    pub async fn consume(&self, id: &str, amount: u64) -> Result<Quota> {
        self.update(id, &QuotaPatch::consume(amount)).await
    }
}
