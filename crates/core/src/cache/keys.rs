//! Cache key construction.
//!
//! Every key has the shape `{namespace}:{map}:{raw}` where the namespace is
//! the entity kind (`space`, `quota`, ...), the map is the logical index map
//! (`id`, `slug`, `space`, `relationship`, ...) and the raw part is the
//! looked-up value. Keeping all construction here means two entity types can
//! never write into each other's maps.

use crate::entity::Entity;

/// Name of the primary map (id -> entity snapshot).
pub const PRIMARY_MAP: &str = "id";

/// Name of the pairwise membership map.
pub const RELATIONSHIP_MAP: &str = "relationship";

/// Builds namespaced cache keys for one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBuilder {
    namespace: &'static str,
}

impl KeyBuilder {
    /// Creates a key builder for an explicit namespace.
    pub const fn new(namespace: &'static str) -> Self {
        Self { namespace }
    }

    /// Creates a key builder for the namespace of `E`.
    pub const fn for_entity<E: Entity>() -> Self {
        Self::new(E::KIND)
    }

    /// Returns the namespace this builder writes into.
    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Returns `{namespace}:{map}:{raw}`.
    pub fn key(&self, map: &str, raw: &str) -> String {
        format!("{}:{}:{}", self.namespace, map, raw)
    }

    /// Returns the primary map key for an entity id.
    pub fn primary(&self, id: &str) -> String {
        self.key(PRIMARY_MAP, id)
    }

    /// Returns the secondary map key (`natural key -> id`).
    pub fn secondary(&self, index: &str, value: &str) -> String {
        self.key(index, value)
    }

    /// Returns the list map key (`grouping key -> [id]`).
    pub fn list(&self, group: &str, value: &str) -> String {
        self.key(group, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Membership, Space};

    #[test]
    fn test_primary_key() {
        let keys = KeyBuilder::new("space");
        assert_eq!(keys.primary("abc"), "space:id:abc");
    }

    #[test]
    fn test_secondary_key() {
        let keys = KeyBuilder::new("space");
        assert_eq!(keys.secondary("slug", "acme"), "space:slug:acme");
    }

    #[test]
    fn test_list_key() {
        let keys = KeyBuilder::new("quota");
        assert_eq!(keys.list("space", "s-1"), "quota:space:s-1");
    }

    #[test]
    fn test_relationship_key() {
        let keys = KeyBuilder::new("membership");
        assert_eq!(
            keys.secondary(RELATIONSHIP_MAP, "s-1:u-1"),
            "membership:relationship:s-1:u-1"
        );
    }

    #[test]
    fn test_for_entity_uses_kind() {
        assert_eq!(KeyBuilder::for_entity::<Space>().namespace(), "space");
        assert_eq!(
            KeyBuilder::for_entity::<Membership>().namespace(),
            "membership"
        );
    }

    #[test]
    fn test_namespaces_never_collide() {
        let space = KeyBuilder::new("space").primary("same-id");
        let quota = KeyBuilder::new("quota").primary("same-id");
        assert_ne!(space, quota);
    }
}
