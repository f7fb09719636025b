use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, EntityRef, IndexKey};
use crate::cache::{TtlClass, RELATIONSHIP_MAP};

/// Role a user holds within a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Member,
    Admin,
    Owner,
}

impl Role {
    /// Returns true if this role can modify shared resources.
    pub fn can_write(&self) -> bool {
        matches!(self, Role::Member | Role::Admin | Role::Owner)
    }

    /// Returns true if this role can manage memberships and settings.
    pub fn can_administer(&self) -> bool {
        matches!(self, Role::Admin | Role::Owner)
    }
}

/// A role assignment of a user within a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub space_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(space_id: Uuid, user_id: Uuid, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            space_id,
            user_id,
            role,
            created_at: Utc::now(),
        }
    }

    /// Natural key value of the `(space, user)` pair.
    pub fn relationship_key(space_id: Uuid, user_id: Uuid) -> String {
        format!("{space_id}:{user_id}")
    }
}

/// Partial update for a [`Membership`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipPatch {
    pub role: Option<Role>,
}

impl Entity for Membership {
    const KIND: &'static str = "membership";
    const TTL_CLASS: TtlClass = TtlClass::Relationship;
    type Patch = MembershipPatch;

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn natural_keys(&self) -> Vec<IndexKey> {
        vec![IndexKey::new(
            RELATIONSHIP_MAP,
            Membership::relationship_key(self.space_id, self.user_id),
        )]
    }

    fn group_keys(&self) -> Vec<IndexKey> {
        vec![
            IndexKey::new("space", self.space_id.to_string()),
            IndexKey::new("user", self.user_id.to_string()),
        ]
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![EntityRef::new("space", self.space_id)]
    }

    fn apply(&mut self, patch: &MembershipPatch) {
        if let Some(role) = patch.role {
            self.role = role;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(!Role::Viewer.can_write());
        assert!(Role::Member.can_write());
        assert!(!Role::Member.can_administer());
        assert!(Role::Admin.can_administer());
        assert!(Role::Owner.can_administer());
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Owner > Role::Admin);
        assert!(Role::Admin > Role::Member);
        assert!(Role::Member > Role::Viewer);
    }

    #[test]
    fn test_relationship_key_is_pairwise() {
        let space_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let membership = Membership::new(space_id, user_id, Role::Member);

        assert_eq!(
            membership.natural_key(RELATIONSHIP_MAP),
            Some(format!("{space_id}:{user_id}"))
        );
    }

    #[test]
    fn test_role_change_keeps_index_keys() {
        let mut membership = Membership::new(Uuid::new_v4(), Uuid::new_v4(), Role::Member);
        let before = membership.indexed_fields();
        membership.apply(&MembershipPatch {
            role: Some(Role::Admin),
        });
        assert_eq!(membership.indexed_fields(), before);
        assert_eq!(membership.role, Role::Admin);
    }
}
