//! Group lookups.

use uuid::Uuid;

use tenantry_core::entity::Group;
use tenantry_core::storage::{Result, Store};

use super::CachedRepository;

impl<S: Store<Group>> CachedRepository<Group, S> {
    /// Group slugs are unique within their space only.
    pub async fn get_by_slug(&self, space_id: Uuid, slug: &str) -> Result<Option<Group>> {
        self.get_by_natural_key("slug", &Group::slug_key(space_id, slug))
            .await
    }

    pub async fn list_for_space(&self, space_id: Uuid) -> Result<Vec<Group>> {
        self.list_by_group("space", &space_id.to_string()).await
    }

    /// Direct children of a group.
    pub async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Group>> {
        self.list_by_group("parent", &parent_id.to_string()).await
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::storage::cached::testing::Harness;
    use tenantry_core::entity::{GroupPatch, Space};
    use tenantry_core::storage::RepositoryError;

    #[tokio::test]
    async fn test_slug_is_scoped_to_space() {
        let h = Harness::new();
        let spaces = h.repository::<Space>();
        let groups = h.repository::<Group>();
        let a = spaces.create(Space::new("a", "A", Uuid::new_v4())).await.unwrap();
        let b = spaces.create(Space::new("b", "B", Uuid::new_v4())).await.unwrap();

        let ops_a = groups.create(Group::new(a.id, "ops", "Ops")).await.unwrap();
        let ops_b = groups.create(Group::new(b.id, "ops", "Ops")).await.unwrap();

        assert_eq!(groups.get_by_slug(a.id, "ops").await.unwrap(), Some(ops_a));
        assert_eq!(groups.get_by_slug(b.id, "ops").await.unwrap(), Some(ops_b));
    }

    #[tokio::test]
    async fn test_reparenting_rebuilds_children_lists() {
        let h = Harness::new();
        let spaces = h.repository::<Space>();
        let groups = h.repository::<Group>();
        let space = spaces.create(Space::new("a", "A", Uuid::new_v4())).await.unwrap();
        let root = groups.create(Group::new(space.id, "root", "Root")).await.unwrap();
        let other = groups.create(Group::new(space.id, "other", "Other")).await.unwrap();
        let child = groups
            .create(Group::new(space.id, "child", "Child").with_parent(root.id))
            .await
            .unwrap();
        h.flush().await;

        assert_eq!(groups.list_children(root.id).await.unwrap(), vec![child.clone()]);
        h.flush().await;

        let patch = GroupPatch {
            parent_id: Some(Some(other.id)),
            ..GroupPatch::default()
        };
        groups.update(&child.id.to_string(), &patch).await.unwrap();
        h.flush().await;

        assert!(groups.list_children(root.id).await.unwrap().is_empty());
        assert_eq!(groups.list_children(other.id).await.unwrap().len(), 1);
        assert_eq!(groups.list_for_space(space.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_space_with_groups_cannot_be_deleted() {
        let h = Harness::new();
        let spaces = h.repository::<Space>();
        let groups = h.repository::<Group>();
        let space = spaces.create(Space::new("a", "A", Uuid::new_v4())).await.unwrap();
        groups.create(Group::new(space.id, "ops", "Ops")).await.unwrap();

        let result = spaces.delete(&space.id.to_string()).await;
        assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
        assert!(spaces.get_by_id(&space.id.to_string()).await.unwrap().is_some());
    }
}
