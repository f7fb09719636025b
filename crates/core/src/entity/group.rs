use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, EntityRef, IndexKey};
use crate::cache::TtlClass;

/// An organizational group inside a space, optionally nested under a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub space_id: Uuid,
    pub parent_id: Option<Uuid>,
    /// Unique within the space.
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(space_id: Uuid, slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            space_id,
            parent_id: None,
            slug: slug.into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Natural key value of a group slug, scoped to its space.
    pub fn slug_key(space_id: Uuid, slug: &str) -> String {
        format!("{space_id}:{slug}")
    }
}

/// Partial update for a [`Group`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPatch {
    pub slug: Option<String>,
    pub name: Option<String>,
    /// `Some(None)` moves the group to the top level.
    pub parent_id: Option<Option<Uuid>>,
}

impl Entity for Group {
    const KIND: &'static str = "group";
    const TTL_CLASS: TtlClass = TtlClass::Relationship;
    type Patch = GroupPatch;

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn natural_keys(&self) -> Vec<IndexKey> {
        vec![IndexKey::new(
            "slug",
            Group::slug_key(self.space_id, &self.slug),
        )]
    }

    fn group_keys(&self) -> Vec<IndexKey> {
        let mut keys = vec![IndexKey::new("space", self.space_id.to_string())];
        if let Some(parent_id) = self.parent_id {
            keys.push(IndexKey::new("parent", parent_id.to_string()));
        }
        keys
    }

    fn references(&self) -> Vec<EntityRef> {
        let mut refs = vec![EntityRef::new("space", self.space_id)];
        if let Some(parent_id) = self.parent_id {
            refs.push(EntityRef::new(Self::KIND, parent_id));
        }
        refs
    }

    fn apply(&mut self, patch: &GroupPatch) {
        if let Some(slug) = &patch.slug {
            self.slug = slug.clone();
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = parent_id;
        }
    }
}
