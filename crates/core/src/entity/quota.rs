use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, EntityRef, IndexKey};
use crate::cache::TtlClass;

/// A usage limit for one resource within a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub id: Uuid,
    pub space_id: Uuid,
    /// Resource name, unique within the space (e.g. `"seats"`).
    pub resource: String,
    pub limit: u64,
    pub used: u64,
    pub created_at: DateTime<Utc>,
}

impl Quota {
    pub fn new(space_id: Uuid, resource: impl Into<String>, limit: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            space_id,
            resource: resource.into(),
            limit,
            used: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_used(mut self, used: u64) -> Self {
        self.used = used;
        self
    }

    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }

    /// Natural key value of a quota resource, scoped to its space.
    pub fn resource_key(space_id: Uuid, resource: &str) -> String {
        format!("{space_id}:{resource}")
    }
}

/// Partial update for a [`Quota`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaPatch {
    pub limit: Option<u64>,
    pub used: Option<u64>,
    /// Units added to whatever usage the store holds at write time.
    pub consume: Option<u64>,
}

impl QuotaPatch {
    pub fn consume(amount: u64) -> Self {
        Self {
            consume: Some(amount),
            ..Self::default()
        }
    }
}

impl Entity for Quota {
    const KIND: &'static str = "quota";
    const TTL_CLASS: TtlClass = TtlClass::Entity;
    type Patch = QuotaPatch;

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn natural_keys(&self) -> Vec<IndexKey> {
        vec![IndexKey::new(
            "resource",
            Quota::resource_key(self.space_id, &self.resource),
        )]
    }

    fn group_keys(&self) -> Vec<IndexKey> {
        vec![IndexKey::new("space", self.space_id.to_string())]
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![EntityRef::new("space", self.space_id)]
    }

    fn apply(&mut self, patch: &QuotaPatch) {
        if let Some(limit) = patch.limit {
            self.limit = limit;
        }
        if let Some(used) = patch.used {
            self.used = used;
        }
        if let Some(amount) = patch.consume {
            self.used = self.used.saturating_add(amount);
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.used > self.limit {
            return Err(format!(
                "{} uses {} of {} units",
                self.resource, self.used, self.limit
            ));
        }
        Ok(())
    }
}
