use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How quickly an entity type changes, which decides its cache TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TtlClass {
    /// Memberships, group associations and other frequently changing links.
    Relationship,
    /// Slowly-changing entities such as spaces and quotas.
    Entity,
    /// Near-static configuration such as settings.
    Configuration,
}

/// TTLs per [`TtlClass`].
///
/// TTL is the backstop for any invalidation that is missed or fails, so it
/// bounds the staleness window of every cached key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub relationship: Duration,
    pub entity: Duration,
    pub configuration: Duration,
}

impl TtlPolicy {
    /// Default relationship TTL (2h).
    pub const DEFAULT_RELATIONSHIP: Duration = Duration::from_secs(2 * 60 * 60);
    /// Default entity TTL (4h).
    pub const DEFAULT_ENTITY: Duration = Duration::from_secs(4 * 60 * 60);
    /// Default configuration TTL (6h).
    pub const DEFAULT_CONFIGURATION: Duration = Duration::from_secs(6 * 60 * 60);

    /// Creates a policy with explicit TTLs.
    pub fn new(relationship: Duration, entity: Duration, configuration: Duration) -> Self {
        Self {
            relationship,
            entity,
            configuration,
        }
    }

    /// Creates a policy where every class shares one TTL.
    pub fn uniform(ttl: Duration) -> Self {
        Self::new(ttl, ttl, ttl)
    }

    /// TTL for primary and secondary entries of an entity class.
    pub fn ttl_for(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Relationship => self.relationship,
            TtlClass::Entity => self.entity,
            TtlClass::Configuration => self.configuration,
        }
    }

    /// TTL for list maps of an entity class.
    ///
    /// Lists materialize group membership, so they never outlive the
    /// relationship TTL even when the entity itself is slow-changing.
    pub fn list_ttl_for(&self, class: TtlClass) -> Duration {
        self.ttl_for(class).min(self.relationship)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_RELATIONSHIP,
            Self::DEFAULT_ENTITY,
            Self::DEFAULT_CONFIGURATION,
        )
    }
}
