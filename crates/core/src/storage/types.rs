use crate::entity::Entity;

/// Field name that matches an entity's primary id in a [`Predicate`].
pub const ID_FIELD: &str = "id";

/// A conjunction of `field = value` clauses.
///
/// Fields are the index names of an entity's natural and grouping keys, plus
/// [`ID_FIELD`]. An empty predicate matches every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Predicate {
    clauses: Vec<(String, String)>,
}

impl Predicate {
    /// Matches every entity.
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches entities whose `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::all().and_eq(field, value)
    }

    /// Adds another `field = value` clause.
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn clauses(&self) -> &[(String, String)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluates the predicate against an entity's indexed fields.
    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        if self.clauses.is_empty() {
            return true;
        }
        let fields = entity.indexed_fields();
        self.clauses.iter().all(|(field, value)| {
            if field == ID_FIELD {
                return entity.id() == *value;
            }
            fields
                .iter()
                .any(|key| key.index == field.as_str() && key.value == *value)
        })
    }
}

/// Limit and cursor of one list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Option<usize>,
    /// Id of the last entity of the previous page.
    pub cursor: Option<String>,
}

impl PageRequest {
    /// Everything, in one page.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn first(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            cursor: None,
        }
    }

    pub fn after(limit: usize, cursor: impl Into<String>) -> Self {
        Self {
            limit: Some(limit),
            cursor: Some(cursor.into()),
        }
    }

    /// Returns true if this request cannot truncate the result.
    pub fn is_unbounded(&self) -> bool {
        self.limit.is_none() && self.cursor.is_none()
    }
}

/// One page of a list call, ordered by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    pub items: Vec<E>,
    /// Cursor of the next page, `None` on the last page.
    pub next_cursor: Option<String>,
}

impl<E: Entity> Page<E> {
    /// Builds a page from entities already sorted by id and filtered past the
    /// cursor. `items` may hold one more entity than `limit`, which only
    /// signals that another page exists.
    pub fn from_sorted(mut items: Vec<E>, limit: Option<usize>) -> Self {
        let next_cursor = match limit {
            Some(limit) if items.len() > limit => {
                items.truncate(limit);
                items.last().map(|entity| entity.id())
            }
            _ => None,
        };
        Self { items, next_cursor }
    }
}

/// An entity before and after one store write.
#[derive(Debug, Clone, PartialEq)]
pub struct Change<E> {
    pub before: E,
    pub after: E,
}

/// Outcome of a create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct Written<E> {
    /// Stored state before the write; `None` on create.
    pub previous: Option<E>,
    /// Stored state after the write.
    pub entity: E,
    /// Entities whose exclusivity flag the same transaction cleared.
    pub demoted: Vec<Change<E>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{PaymentChannel, Quota, Space, SpaceStatus};
    use uuid::Uuid;

    #[test]
    fn test_empty_predicate_matches_everything() {
        let space = Space::new("acme", "Acme", Uuid::nil());
        assert!(Predicate::all().matches(&space));
    }

    #[test]
    fn test_predicate_matches_natural_and_group_keys() {
        let owner = Uuid::new_v4();
        let space = Space::new("acme", "Acme", owner);

        assert!(Predicate::eq("slug", "acme").matches(&space));
        assert!(Predicate::eq("owner", owner.to_string())
            .and_eq("status", "active")
            .matches(&space));
        assert!(!Predicate::eq("owner", owner.to_string())
            .and_eq("status", SpaceStatus::Archived.as_str())
            .matches(&space));
    }

    #[test]
    fn test_predicate_matches_id() {
        let id = Uuid::new_v4();
        let quota = Quota::new(Uuid::nil(), "seats", 5).with_id(id);
        assert!(Predicate::eq(ID_FIELD, id.to_string()).matches(&quota));
        assert!(!Predicate::eq(ID_FIELD, "other").matches(&quota));
    }

    #[test]
    fn test_predicate_unknown_field_never_matches() {
        let channel = PaymentChannel::new(Uuid::nil(), "stripe", "Main");
        assert!(!Predicate::eq("default", "anything").matches(&channel));
    }

    #[test]
    fn test_page_from_sorted_sets_cursor_when_truncated() {
        let quotas: Vec<Quota> = (1..=3)
            .map(|n| Quota::new(Uuid::nil(), format!("r{n}"), 1).with_id(Uuid::from_u128(n)))
            .collect();

        let page = Page::from_sorted(quotas.clone(), Some(2));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor, Some(Uuid::from_u128(2).to_string()));

        let last = Page::from_sorted(quotas, Some(3));
        assert_eq!(last.items.len(), 3);
        assert!(last.next_cursor.is_none());
    }

    #[test]
    fn test_page_request_all_is_unbounded() {
        assert!(PageRequest::all().is_unbounded());
        assert!(!PageRequest::first(10).is_unbounded());
        assert!(!PageRequest::after(10, "x").is_unbounded());
    }
}
