//! Entities cached by the repositories.
//!
//! An [`Entity`] describes everything the caching protocol needs to know
//! about a record: its id, the natural keys that point at it, the grouping
//! keys it is listed under, the records it references, and optionally an
//! exclusivity scope for "default within scope" flags.

mod billing;
mod channel;
mod group;
mod membership;
mod quota;
mod setting;
mod space;

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use crate::cache::TtlClass;

pub use billing::{BillingPatch, BillingRecord, BillingStatus};
pub use channel::{ChannelPatch, PaymentChannel, DEFAULT_CHANNEL_INDEX};
pub use group::{Group, GroupPatch};
pub use membership::{Membership, MembershipPatch, Role};
pub use quota::{Quota, QuotaPatch};
pub use setting::{Setting, SettingPatch, GLOBAL_SCOPE};
pub use space::{Space, SpacePatch, SpaceStatus};

/// A derived `(index name, value)` pair.
///
/// Used both for natural keys (unique, resolved through a secondary map)
/// and grouping keys (shared, materialized as id lists).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexKey {
    pub index: &'static str,
    pub value: String,
}

impl IndexKey {
    pub fn new(index: &'static str, value: impl Into<String>) -> Self {
        Self {
            index,
            value: value.into(),
        }
    }
}

/// An outgoing reference to another stored record.
///
/// Stores refuse to delete a record while any other record references it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub kind: &'static str,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: &'static str, id: impl ToString) -> Self {
        Self {
            kind,
            id: id.to_string(),
        }
    }
}

/// A record the store owns and the cache mirrors.
pub trait Entity:
    Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Store kind and top-level cache namespace.
    const KIND: &'static str;

    /// TTL class of cached snapshots.
    const TTL_CLASS: TtlClass;

    /// Typed partial update.
    type Patch: Debug + Clone + Send + Sync + 'static;

    /// Stable primary identifier.
    fn id(&self) -> String;

    /// Unique alternate keys, each resolved through a secondary map.
    fn natural_keys(&self) -> Vec<IndexKey>;

    /// Grouping keys, each materialized as an id list.
    fn group_keys(&self) -> Vec<IndexKey>;

    /// Records this entity references.
    fn references(&self) -> Vec<EntityRef> {
        Vec::new()
    }

    /// Applies a partial update in place.
    fn apply(&mut self, patch: &Self::Patch);

    /// Scope in which this entity currently holds an exclusivity flag.
    ///
    /// `Some(scope)` means the flag is set; at most one entity per scope may
    /// return the same value.
    fn exclusive_scope(&self) -> Option<String> {
        None
    }

    /// Clears the exclusivity flag.
    fn clear_exclusive(&mut self) {}

    /// Rejects a state the store must never hold, such as usage past a limit.
    ///
    /// Stores call this on every write after the patch is applied, inside
    /// the same critical section.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// All keys a predicate can match against: natural and grouping keys.
    fn indexed_fields(&self) -> Vec<IndexKey> {
        let mut fields = self.natural_keys();
        fields.extend(self.group_keys());
        fields
    }

    /// Returns the value of the natural key `index`, if present.
    fn natural_key(&self, index: &str) -> Option<String> {
        self.natural_keys()
            .into_iter()
            .find(|k| k.index == index)
            .map(|k| k.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Natural and grouping maps share the entity namespace, so their names
    /// must never overlap.
    fn assert_distinct_index_names<E: Entity>(entity: &E) {
        let natural: Vec<_> = entity.natural_keys().into_iter().map(|k| k.index).collect();
        for group in entity.group_keys() {
            assert!(
                !natural.contains(&group.index),
                "{} reuses index name {}",
                E::KIND,
                group.index
            );
            assert_ne!(group.index, crate::cache::PRIMARY_MAP);
        }
        for index in natural {
            assert_ne!(index, crate::cache::PRIMARY_MAP);
        }
    }

    #[test]
    fn test_index_names_are_distinct_for_every_entity() {
        let space_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        assert_distinct_index_names(&Space::new("acme", "Acme", user_id));
        assert_distinct_index_names(
            &Group::new(space_id, "ops", "Ops").with_parent(Uuid::new_v4()),
        );
        assert_distinct_index_names(&Quota::new(space_id, "seats", 10));
        assert_distinct_index_names(&Setting::new(GLOBAL_SCOPE, "theme", "dark".into()));
        assert_distinct_index_names(&Membership::new(space_id, user_id, Role::Member));
        assert_distinct_index_names(&BillingRecord::new(space_id, 1_000, "USD", "2024-06"));
        assert_distinct_index_names(&PaymentChannel::new(space_id, "stripe", "Main").as_default());
    }

    #[test]
    fn test_indexed_fields_joins_natural_and_group_keys() {
        let space = Space::new("acme", "Acme", Uuid::nil());
        let fields = space.indexed_fields();

        assert!(fields.contains(&IndexKey::new("slug", "acme")));
        assert!(fields.contains(&IndexKey::new("owner", Uuid::nil().to_string())));
        assert!(fields.contains(&IndexKey::new("status", "active")));
    }

    #[test]
    fn test_natural_key_lookup() {
        let space = Space::new("acme", "Acme", Uuid::nil());
        assert_eq!(space.natural_key("slug"), Some("acme".to_string()));
        assert_eq!(space.natural_key("missing"), None);
    }

    #[test]
    fn test_entity_ref_stringifies_id() {
        let id = Uuid::nil();
        let reference = EntityRef::new("space", id);
        assert_eq!(reference.id, id.to_string());
    }
}
