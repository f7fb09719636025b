use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, IndexKey};
use crate::cache::TtlClass;

/// Scope of platform-wide settings.
pub const GLOBAL_SCOPE: &str = "global";

/// A named configuration value, either global or scoped to a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub id: Uuid,
    /// [`GLOBAL_SCOPE`] or a space id.
    pub scope: String,
    pub name: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Setting {
    pub fn new(scope: impl Into<String>, name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            scope: scope.into(),
            name: name.into(),
            value,
            created_at: Utc::now(),
        }
    }

    /// Natural key value of a setting name within its scope.
    pub fn name_key(scope: &str, name: &str) -> String {
        format!("{scope}:{name}")
    }
}

/// Partial update for a [`Setting`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingPatch {
    pub value: Option<serde_json::Value>,
}

impl Entity for Setting {
    const KIND: &'static str = "setting";
    const TTL_CLASS: TtlClass = TtlClass::Configuration;
    type Patch = SettingPatch;

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn natural_keys(&self) -> Vec<IndexKey> {
        vec![IndexKey::new(
            "name",
            Setting::name_key(&self.scope, &self.name),
        )]
    }

    fn group_keys(&self) -> Vec<IndexKey> {
        vec![IndexKey::new("scope", &self.scope)]
    }

    fn apply(&mut self, patch: &SettingPatch) {
        if let Some(value) = &patch.value {
            self.value = value.clone();
        }
    }
}
