use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, IndexKey};
use crate::cache::TtlClass;

/// Lifecycle state of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceStatus {
    Active,
    Suspended,
    Archived,
}

impl SpaceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceStatus::Active => "active",
            SpaceStatus::Suspended => "suspended",
            SpaceStatus::Archived => "archived",
        }
    }
}

/// A tenant: the top-level organizational unit everything else hangs off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: Uuid,
    /// Human-readable unique identifier used in URLs.
    pub slug: String,
    pub name: String,
    pub owner_id: Uuid,
    pub status: SpaceStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Space {
    /// Creates a new active space.
    pub fn new(slug: impl Into<String>, name: impl Into<String>, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            slug: slug.into(),
            name: name.into(),
            owner_id,
            status: SpaceStatus::Active,
            description: None,
            created_at: Utc::now(),
        }
    }

    /// Replaces the generated id, for fixtures that need stable ordering.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_status(mut self, status: SpaceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update for a [`Space`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpacePatch {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub owner_id: Option<Uuid>,
    pub status: Option<SpaceStatus>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}

impl SpacePatch {
    pub fn slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Self::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn status(status: SpaceStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl Entity for Space {
    const KIND: &'static str = "space";
    const TTL_CLASS: TtlClass = TtlClass::Entity;
    type Patch = SpacePatch;

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn natural_keys(&self) -> Vec<IndexKey> {
        vec![IndexKey::new("slug", &self.slug)]
    }

    fn group_keys(&self) -> Vec<IndexKey> {
        vec![
            IndexKey::new("owner", self.owner_id.to_string()),
            IndexKey::new("status", self.status.as_str()),
        ]
    }

    fn apply(&mut self, patch: &SpacePatch) {
        if let Some(slug) = &patch.slug {
            self.slug = slug.clone();
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(owner_id) = patch.owner_id {
            self.owner_id = owner_id;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
    }
}
