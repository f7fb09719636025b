//! Setting lookups.

use tenantry_core::entity::{Setting, GLOBAL_SCOPE};
use tenantry_core::storage::{Result, Store};

use super::CachedRepository;

impl<S: Store<Setting>> CachedRepository<Setting, S> {
    pub async fn get_setting(&self, scope: &str, name: &str) -> Result<Option<Setting>> {
        self.get_by_natural_key("name", &Setting::name_key(scope, name))
            .await
    }

    /// Value of a setting in exactly `scope`.
    pub async fn get_value(&self, scope: &str, name: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.get_setting(scope, name).await?.map(|s| s.value))
    }

    /// Value in `scope`, falling back to the global scope.
    pub async fn resolve_value(&self, scope: &str, name: &str) -> Result<Option<serde_json::Value>> {
        if let Some(value) = self.get_value(scope, name).await? {
            return Ok(Some(value));
        }
        if scope == GLOBAL_SCOPE {
            return Ok(None);
        }
        self.get_value(GLOBAL_SCOPE, name).await
    }

    pub async fn list_for_scope(&self, scope: &str) -> Result<Vec<Setting>> {
        self.list_by_group("scope", scope).await
    }
}
