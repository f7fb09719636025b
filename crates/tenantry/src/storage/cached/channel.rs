//! Payment channel lookups.
//!
//! At most one channel per `(tenant, provider)` is the default. The store
//! clears the previous default inside the same write, so the cache only ever
//! has to catch up with a state that is already consistent.

use uuid::Uuid;

use tenantry_core::entity::{ChannelPatch, PaymentChannel, DEFAULT_CHANNEL_INDEX};
use tenantry_core::storage::{Result, Store};

use super::CachedRepository;

impl<S: Store<PaymentChannel>> CachedRepository<PaymentChannel, S> {
    /// The default channel of a provider within a tenant.
    pub async fn get_default(&self, provider: &str, tenant_id: Uuid) -> Result<Option<PaymentChannel>> {
        self.get_by_natural_key(
            DEFAULT_CHANNEL_INDEX,
            &PaymentChannel::default_scope(tenant_id, provider),
        )
        .await
    }

    pub async fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<PaymentChannel>> {
        self.list_by_group("tenant", &tenant_id.to_string()).await
    }

    /// Makes a channel the default for its provider, demoting the previous one.
    pub async fn set_default(&self, id: &str) -> Result<PaymentChannel> {
        self.update(id, &ChannelPatch::make_default()).await
    }
}
