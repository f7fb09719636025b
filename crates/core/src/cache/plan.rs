//! Pure cache reconciliation planning.
//!
//! Given what a store operation observed, these functions decide which cache
//! keys to overwrite and which to invalidate. The shell executes the plan in
//! a background job; nothing here touches the cache.
//!
//! Rules:
//! - primary entries are overwritten with the latest stored snapshot,
//! - a secondary pointer is written only for a freshly created entity or a
//!   read that just resolved it; otherwise changed natural keys are deleted,
//!   both old and new value,
//! - list entries are never patched: any change to group membership deletes
//!   the list so the next read rebuilds it from the store.

use std::collections::BTreeSet;

use crate::entity::{Entity, IndexKey};
use crate::storage::{Change, Written};

use super::KeyBuilder;

/// Cache writes and invalidations derived from one store operation.
#[derive(Debug, Clone, PartialEq)]
pub struct CachePlan<E> {
    /// Snapshots to write into the primary map.
    pub put: Vec<E>,
    /// Secondary pointers, `(key, id)`.
    pub point: Vec<(String, String)>,
    /// Id lists, `(key, ids)`.
    pub lists: Vec<(String, Vec<String>)>,
    /// Keys to delete. Never contains a key that is also written.
    pub delete: BTreeSet<String>,
}

impl<E> Default for CachePlan<E> {
    fn default() -> Self {
        Self {
            put: Vec::new(),
            point: Vec::new(),
            lists: Vec::new(),
            delete: BTreeSet::new(),
        }
    }
}

impl<E: Entity> CachePlan<E> {
    /// Plan after a read that fell back to the store.
    ///
    /// `pointer` is the natural key the read was resolved through, if any.
    pub fn for_fill(keys: &KeyBuilder, entity: E, pointer: Option<&IndexKey>) -> Self {
        let mut plan = Self::default();
        if let Some(key) = pointer {
            plan.point
                .push((keys.secondary(key.index, &key.value), entity.id()));
        }
        plan.put.push(entity);
        plan
    }

    /// Plan after a list read that fell back to the store.
    pub fn for_list_fill(keys: &KeyBuilder, group: &IndexKey, entities: Vec<E>) -> Self {
        let ids = entities.iter().map(Entity::id).collect();
        Self {
            put: entities,
            lists: vec![(keys.list(group.index, &group.value), ids)],
            ..Self::default()
        }
    }

    /// Plan after a successful create.
    pub fn for_create(keys: &KeyBuilder, written: &Written<E>) -> Self {
        let mut plan = Self::default();
        plan.demotions(keys, &written.demoted);

        let entity = &written.entity;
        for key in entity.natural_keys() {
            plan.point
                .push((keys.secondary(key.index, &key.value), entity.id()));
        }
        for key in entity.group_keys() {
            plan.delete.insert(keys.list(key.index, &key.value));
        }
        plan.put.push(entity.clone());
        plan.finish()
    }

    /// Plan after a successful update.
    ///
    /// `before` holds every snapshot known to precede the write: the cached
    /// one the repository read and the one the store replaced. Keys of either
    /// that differ from the new state are invalidated.
    pub fn for_update(keys: &KeyBuilder, before: &[E], written: &Written<E>) -> Self {
        let mut plan = Self::default();
        plan.demotions(keys, &written.demoted);

        let mut snapshots: Vec<&E> = before.iter().collect();
        snapshots.extend(written.previous.iter());
        plan.diff(keys, &snapshots, &written.entity);
        plan.put.push(written.entity.clone());
        plan.finish()
    }

    /// Plan after a successful delete.
    pub fn for_delete(keys: &KeyBuilder, snapshots: &[E]) -> Self {
        let mut plan = Self::default();
        for entity in snapshots {
            plan.delete.insert(keys.primary(&entity.id()));
            for key in entity.natural_keys() {
                plan.delete.insert(keys.secondary(key.index, &key.value));
            }
            for key in entity.group_keys() {
                plan.delete.insert(keys.list(key.index, &key.value));
            }
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.put.is_empty()
            && self.point.is_empty()
            && self.lists.is_empty()
            && self.delete.is_empty()
    }

    fn demotions(&mut self, keys: &KeyBuilder, demoted: &[Change<E>]) {
        for change in demoted {
            self.diff(keys, &[&change.before], &change.after);
            self.put.push(change.after.clone());
        }
    }

    fn diff(&mut self, keys: &KeyBuilder, before: &[&E], after: &E) {
        let new_natural = after.natural_keys();
        let new_groups = after.group_keys();

        for old in before {
            let old_natural = old.natural_keys();
            for key in old_natural.iter().filter(|k| !new_natural.contains(k)) {
                self.delete.insert(keys.secondary(key.index, &key.value));
            }
            for key in new_natural.iter().filter(|k| !old_natural.contains(k)) {
                self.delete.insert(keys.secondary(key.index, &key.value));
            }

            let old_groups = old.group_keys();
            for key in old_groups.iter().filter(|k| !new_groups.contains(k)) {
                self.delete.insert(keys.list(key.index, &key.value));
            }
            for key in new_groups.iter().filter(|k| !old_groups.contains(k)) {
                self.delete.insert(keys.list(key.index, &key.value));
            }
        }
    }

    fn finish(mut self) -> Self {
        for (key, _) in &self.point {
            self.delete.remove(key);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ChannelPatch, PaymentChannel, Space, SpacePatch, SpaceStatus};
    use uuid::Uuid;

    fn space_keys() -> KeyBuilder {
        KeyBuilder::for_entity::<Space>()
    }

    fn created(entity: Space) -> Written<Space> {
        Written {
            previous: None,
            entity,
            demoted: Vec::new(),
        }
    }

    fn updated(before: &Space, patch: &SpacePatch) -> Written<Space> {
        let mut after = before.clone();
        after.apply(patch);
        Written {
            previous: Some(before.clone()),
            entity: after,
            demoted: Vec::new(),
        }
    }

    #[test]
    fn test_fill_without_pointer_only_puts() {
        let space = Space::new("acme", "Acme", Uuid::nil());
        let plan = CachePlan::for_fill(&space_keys(), space.clone(), None);

        assert_eq!(plan.put, vec![space]);
        assert!(plan.point.is_empty());
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn test_fill_through_natural_key_writes_pointer() {
        let space = Space::new("acme", "Acme", Uuid::nil());
        let pointer = IndexKey::new("slug", "acme");
        let plan = CachePlan::for_fill(&space_keys(), space.clone(), Some(&pointer));

        assert_eq!(
            plan.point,
            vec![("space:slug:acme".to_string(), space.id())]
        );
    }

    #[test]
    fn test_list_fill_keeps_store_order() {
        let owner = Uuid::new_v4();
        let a = Space::new("a", "A", owner).with_id(Uuid::from_u128(1));
        let b = Space::new("b", "B", owner).with_id(Uuid::from_u128(2));
        let group = IndexKey::new("owner", owner.to_string());

        let plan = CachePlan::for_list_fill(&space_keys(), &group, vec![a.clone(), b.clone()]);

        assert_eq!(
            plan.lists,
            vec![(format!("space:owner:{owner}"), vec![a.id(), b.id()])]
        );
        assert_eq!(plan.put.len(), 2);
    }

    #[test]
    fn test_create_points_natural_keys_and_invalidates_lists() {
        let owner = Uuid::new_v4();
        let space = Space::new("acme", "Acme", owner);
        let plan = CachePlan::for_create(&space_keys(), &created(space.clone()));

        assert_eq!(plan.put, vec![space.clone()]);
        assert_eq!(
            plan.point,
            vec![("space:slug:acme".to_string(), space.id())]
        );
        assert!(plan.delete.contains(&format!("space:owner:{owner}")));
        assert!(plan.delete.contains("space:status:active"));
        assert!(plan.lists.is_empty());
    }

    #[test]
    fn test_update_of_unindexed_field_only_refreshes_primary() {
        let space = Space::new("acme", "Acme", Uuid::nil());
        let written = updated(&space, &SpacePatch::name("Acme Corp"));
        let plan = CachePlan::for_update(&space_keys(), &[space], &written);

        assert_eq!(plan.put, vec![written.entity]);
        assert!(plan.delete.is_empty());
        assert!(plan.point.is_empty());
    }

    #[test]
    fn test_update_of_natural_key_invalidates_old_and_new() {
        let space = Space::new("acme", "Acme", Uuid::nil());
        let written = updated(&space, &SpacePatch::slug("acme-corp"));
        let plan = CachePlan::for_update(&space_keys(), &[], &written);

        assert!(plan.delete.contains("space:slug:acme"));
        assert!(plan.delete.contains("space:slug:acme-corp"));
        assert!(!plan.delete.contains(&space_keys().primary(&space.id())));
    }

    #[test]
    fn test_update_of_group_key_invalidates_both_lists() {
        let space = Space::new("acme", "Acme", Uuid::nil());
        let written = updated(&space, &SpacePatch::status(SpaceStatus::Suspended));
        let plan = CachePlan::for_update(&space_keys(), &[], &written);

        assert!(plan.delete.contains("space:status:active"));
        assert!(plan.delete.contains("space:status:suspended"));
        assert!(!plan.delete.contains(&format!("space:owner:{}", Uuid::nil())));
    }

    #[test]
    fn test_update_uses_stale_cached_snapshot_too() {
        let stored = Space::new("acme-2", "Acme", Uuid::nil());
        let mut cached = stored.clone();
        cached.slug = "acme-1".to_string();

        let written = updated(&stored, &SpacePatch::name("Renamed"));
        let plan = CachePlan::for_update(&space_keys(), &[cached], &written);

        assert!(plan.delete.contains("space:slug:acme-1"));
        assert!(!plan.delete.contains("space:slug:acme-2"));
    }

    #[test]
    fn test_delete_clears_every_key() {
        let owner = Uuid::new_v4();
        let space = Space::new("acme", "Acme", owner);
        let keys = space_keys();
        let plan = CachePlan::for_delete(&keys, std::slice::from_ref(&space));

        let expected: BTreeSet<String> = [
            keys.primary(&space.id()),
            "space:slug:acme".to_string(),
            format!("space:owner:{owner}"),
            "space:status:active".to_string(),
        ]
        .into_iter()
        .collect();
        assert_eq!(plan.delete, expected);
        assert!(plan.put.is_empty());
    }

    #[test]
    fn test_create_with_demotion_keeps_new_pointer() {
        let tenant = Uuid::new_v4();
        let keys = KeyBuilder::for_entity::<PaymentChannel>();
        let old_default = PaymentChannel::new(tenant, "stripe", "A").as_default();
        let mut demoted = old_default.clone();
        demoted.clear_exclusive();
        let new_default = PaymentChannel::new(tenant, "stripe", "B").as_default();

        let written = Written {
            previous: None,
            entity: new_default.clone(),
            demoted: vec![Change {
                before: old_default,
                after: demoted.clone(),
            }],
        };
        let plan = CachePlan::for_create(&keys, &written);

        let pointer = format!("channel:default:{tenant}:stripe");
        assert_eq!(plan.point, vec![(pointer.clone(), new_default.id())]);
        assert!(!plan.delete.contains(&pointer));
        assert_eq!(plan.put, vec![demoted, new_default]);
    }

    #[test]
    fn test_update_with_demotion_invalidates_pointer() {
        let tenant = Uuid::new_v4();
        let keys = KeyBuilder::for_entity::<PaymentChannel>();
        let old_default = PaymentChannel::new(tenant, "stripe", "A").as_default();
        let mut demoted = old_default.clone();
        demoted.clear_exclusive();
        let promoted_before = PaymentChannel::new(tenant, "stripe", "B");
        let mut promoted = promoted_before.clone();
        promoted.apply(&ChannelPatch::make_default());

        let written = Written {
            previous: Some(promoted_before),
            entity: promoted.clone(),
            demoted: vec![Change {
                before: old_default,
                after: demoted.clone(),
            }],
        };
        let plan = CachePlan::for_update(&keys, &[], &written);

        assert!(plan
            .delete
            .contains(&format!("channel:default:{tenant}:stripe")));
        assert_eq!(plan.put, vec![demoted, promoted]);
    }

    #[test]
    fn test_is_empty() {
        let space = Space::new("acme", "Acme", Uuid::nil());
        let plan = CachePlan::for_create(&space_keys(), &created(space));

        assert!(!plan.is_empty());
        assert!(CachePlan::<Space>::default().is_empty());
    }
}
