//! SQLite schema definitions and SQL query constants.
//!
//! Every entity kind shares the `records` table. Derived keys and references
//! live in side tables so the store can enforce natural-key uniqueness and
//! referential integrity without knowing the concrete entity types.

/// SQL statement to enable foreign keys and create all tables.
pub const CREATE_TABLES: &str = r#"
PRAGMA foreign_keys = ON;

-- One row per stored entity
CREATE TABLE IF NOT EXISTS records (
    kind TEXT NOT NULL,
    id TEXT NOT NULL,
    body TEXT NOT NULL,
    exclusive_scope TEXT,
    PRIMARY KEY (kind, id)
);

-- Natural (unique) and grouping keys of each record
CREATE TABLE IF NOT EXISTS record_keys (
    kind TEXT NOT NULL,
    id TEXT NOT NULL,
    field TEXT NOT NULL,
    value TEXT NOT NULL,
    is_natural INTEGER NOT NULL,
    FOREIGN KEY (kind, id) REFERENCES records(kind, id) ON DELETE CASCADE
);

-- Outgoing references of each record
CREATE TABLE IF NOT EXISTS record_refs (
    kind TEXT NOT NULL,
    id TEXT NOT NULL,
    ref_kind TEXT NOT NULL,
    ref_id TEXT NOT NULL,
    FOREIGN KEY (kind, id) REFERENCES records(kind, id) ON DELETE CASCADE,
    FOREIGN KEY (ref_kind, ref_id) REFERENCES records(kind, id)
);

-- Indexes for efficient queries
CREATE UNIQUE INDEX IF NOT EXISTS idx_record_keys_natural
    ON record_keys(kind, field, value) WHERE is_natural = 1;
CREATE INDEX IF NOT EXISTS idx_record_keys_lookup ON record_keys(kind, field, value);
CREATE INDEX IF NOT EXISTS idx_record_keys_owner ON record_keys(kind, id);
CREATE INDEX IF NOT EXISTS idx_record_refs_owner ON record_refs(kind, id);
CREATE INDEX IF NOT EXISTS idx_record_refs_target ON record_refs(ref_kind, ref_id);
CREATE INDEX IF NOT EXISTS idx_records_exclusive ON records(kind, exclusive_scope);
"#;

// Record queries
pub const INSERT_RECORD: &str = r#"
INSERT INTO records (kind, id, body, exclusive_scope)
VALUES (?1, ?2, ?3, ?4)
"#;

pub const UPDATE_RECORD: &str = r#"
UPDATE records
SET body = ?3, exclusive_scope = ?4
WHERE kind = ?1 AND id = ?2
"#;

pub const SELECT_RECORD_BY_ID: &str = r#"
SELECT body
FROM records
WHERE kind = ?1 AND id = ?2
"#;

pub const SELECT_RECORD_EXISTS: &str = r#"
SELECT EXISTS (SELECT 1 FROM records WHERE kind = ?1 AND id = ?2)
"#;

pub const DELETE_RECORD: &str = r#"
DELETE FROM records
WHERE kind = ?1 AND id = ?2
"#;

pub const SELECT_EXCLUSIVE_HOLDERS: &str = r#"
SELECT body
FROM records
WHERE kind = ?1 AND exclusive_scope = ?2 AND id != ?3
ORDER BY id
"#;

// Key queries
pub const INSERT_KEY: &str = r#"
INSERT INTO record_keys (kind, id, field, value, is_natural)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub const DELETE_KEYS: &str = r#"
DELETE FROM record_keys
WHERE kind = ?1 AND id = ?2
"#;

pub const SELECT_NATURAL_KEY_HOLDER: &str = r#"
SELECT id
FROM record_keys
WHERE kind = ?1 AND field = ?2 AND value = ?3 AND is_natural = 1 AND id != ?4
LIMIT 1
"#;

// Reference queries
pub const INSERT_REF: &str = r#"
INSERT INTO record_refs (kind, id, ref_kind, ref_id)
VALUES (?1, ?2, ?3, ?4)
"#;

pub const DELETE_REFS: &str = r#"
DELETE FROM record_refs
WHERE kind = ?1 AND id = ?2
"#;

pub const SELECT_REFERRER: &str = r#"
SELECT kind, id
FROM record_refs
WHERE ref_kind = ?1 AND ref_id = ?2 AND NOT (kind = ?1 AND id = ?2)
LIMIT 1
"#;

/// Builds the `FROM ... WHERE ...` tail of a predicate query.
///
/// Parameter `?1` is the kind. Each clause adds one or two parameters, in
/// order, which the caller binds from [`PredicateSql::params`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateSql {
    pub tail: String,
    pub params: Vec<String>,
}

impl PredicateSql {
    pub fn new(kind: &str, clauses: &[(String, String)], id_field: &str, cursor: Option<&str>) -> Self {
        let mut tail = String::from("FROM records r WHERE r.kind = ?1");
        let mut params = vec![kind.to_string()];

        if let Some(cursor) = cursor {
            params.push(cursor.to_string());
            tail.push_str(&format!(" AND r.id > ?{}", params.len()));
        }

        for (field, value) in clauses {
            if field == id_field {
                params.push(value.clone());
                tail.push_str(&format!(" AND r.id = ?{}", params.len()));
                continue;
            }
            params.push(field.clone());
            let field_param = params.len();
            params.push(value.clone());
            let value_param = params.len();
            tail.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM record_keys k WHERE k.kind = r.kind AND k.id = r.id \
                 AND k.field = ?{field_param} AND k.value = ?{value_param})"
            ));
        }

        Self { tail, params }
    }

    /// `SELECT body` ordered by id, with an optional row limit.
    pub fn select(&self, limit: Option<usize>) -> String {
        let mut sql = format!("SELECT r.body {} ORDER BY r.id", self.tail);
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        sql
    }

    pub fn count(&self) -> String {
        format!("SELECT COUNT(*) {}", self.tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_valid_sql() {
        assert!(CREATE_TABLES.contains("PRAGMA foreign_keys = ON"));
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS records"));
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS record_keys"));
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS record_refs"));
        assert!(CREATE_TABLES.contains("WHERE is_natural = 1"));
    }

    #[test]
    fn test_empty_predicate_filters_only_kind() {
        let sql = PredicateSql::new("space", &[], "id", None);
        assert_eq!(sql.tail, "FROM records r WHERE r.kind = ?1");
        assert_eq!(sql.params, vec!["space".to_string()]);
        assert_eq!(
            sql.select(None),
            "SELECT r.body FROM records r WHERE r.kind = ?1 ORDER BY r.id"
        );
    }

    #[test]
    fn test_clauses_bind_in_order() {
        let clauses = vec![
            ("owner".to_string(), "u-1".to_string()),
            ("id".to_string(), "s-1".to_string()),
        ];
        let sql = PredicateSql::new("space", &clauses, "id", Some("s-0"));

        assert_eq!(sql.params, vec!["space", "s-0", "owner", "u-1", "s-1"]);
        assert!(sql.tail.contains("r.id > ?2"));
        assert!(sql.tail.contains("k.field = ?3 AND k.value = ?4"));
        assert!(sql.tail.contains("r.id = ?5"));
    }

    #[test]
    fn test_select_with_limit_and_count() {
        let sql = PredicateSql::new("quota", &[], "id", None);
        assert!(sql.select(Some(3)).ends_with("ORDER BY r.id LIMIT 3"));
        assert!(sql.count().starts_with("SELECT COUNT(*) FROM records r"));
    }
}
