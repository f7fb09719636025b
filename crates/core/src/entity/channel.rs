use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, IndexKey};
use crate::cache::TtlClass;

/// Name of the natural key held by the default channel of a scope.
pub const DEFAULT_CHANNEL_INDEX: &str = "default";

/// A payment channel configured by a tenant for one provider.
///
/// At most one channel per `(tenant, provider)` is the default. The flag is
/// an exclusivity flag: stores clear it on every other channel of the scope
/// in the same transaction that sets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentChannel {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Provider identifier, e.g. `"stripe"`.
    pub provider: String,
    pub name: String,
    pub is_default: bool,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl PaymentChannel {
    pub fn new(tenant_id: Uuid, provider: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            provider: provider.into(),
            name: name.into(),
            is_default: false,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    /// Marks this channel as the default of its scope.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Exclusivity scope of a `(tenant, provider)` pair.
    pub fn default_scope(tenant_id: Uuid, provider: &str) -> String {
        format!("{tenant_id}:{provider}")
    }
}

/// Partial update for a [`PaymentChannel`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelPatch {
    pub name: Option<String>,
    pub is_default: Option<bool>,
    pub enabled: Option<bool>,
}

impl ChannelPatch {
    pub fn make_default() -> Self {
        Self {
            is_default: Some(true),
            ..Self::default()
        }
    }
}

impl Entity for PaymentChannel {
    const KIND: &'static str = "channel";
    const TTL_CLASS: TtlClass = TtlClass::Entity;
    type Patch = ChannelPatch;

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn natural_keys(&self) -> Vec<IndexKey> {
        self.exclusive_scope()
            .map(|scope| vec![IndexKey::new(DEFAULT_CHANNEL_INDEX, scope)])
            .unwrap_or_default()
    }

    fn group_keys(&self) -> Vec<IndexKey> {
        vec![IndexKey::new("tenant", self.tenant_id.to_string())]
    }

    fn apply(&mut self, patch: &ChannelPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(is_default) = patch.is_default {
            self.is_default = is_default;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
    }

    fn exclusive_scope(&self) -> Option<String> {
        self.is_default
            .then(|| PaymentChannel::default_scope(self.tenant_id, &self.provider))
    }

    fn clear_exclusive(&mut self) {
        self.is_default = false;
    }
}
