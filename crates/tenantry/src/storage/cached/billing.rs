//! Billing record lookups.

use uuid::Uuid;

use tenantry_core::entity::{BillingRecord, BillingStatus};
use tenantry_core::storage::{Result, Store};

use super::CachedRepository;

impl<S: Store<BillingRecord>> CachedRepository<BillingRecord, S> {
    pub async fn list_for_space(&self, space_id: Uuid) -> Result<Vec<BillingRecord>> {
        self.list_by_group("space", &space_id.to_string()).await
    }

    /// Records of one space in one status.
    pub async fn list_by_status(
        &self,
        space_id: Uuid,
        status: BillingStatus,
    ) -> Result<Vec<BillingRecord>> {
        self.list_by_group("status", &BillingRecord::status_key(space_id, status))
            .await
    }
}
