//! SQLite store implementation.
//!
//! Implements [`Store`] for every entity kind over the shared record tables.
//! Each write runs in one `IMMEDIATE` transaction, so the exclusivity,
//! uniqueness and reference checks see the same state the commit writes to.

use async_trait::async_trait;
use rusqlite::{OptionalExtension, TransactionBehavior};
use tokio_rusqlite::Connection;

use tenantry_core::entity::Entity;
use tenantry_core::storage::{
    Change, Page, PageRequest, Predicate, RepositoryError, Result, Store, Written, ID_FIELD,
};

use super::error::{map_tokio_rusqlite_error, reject, wrap_err};
use super::schema::{self, PredicateSql};
use crate::storage::record::{
    check_invariants, dangling_reference, decode_body, duplicate_key, still_referenced,
    StoredRecord,
};

/// SQLite-based store.
///
/// Provides async access to SQLite storage for all entity types.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new store with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new store with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Initialize the database schema.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

type CallResult<T> = std::result::Result<T, tokio_rusqlite::Error>;

fn load<E: Entity>(conn: &rusqlite::Connection, id: &str) -> CallResult<Option<E>> {
    let body: Option<String> = conn
        .query_row(schema::SELECT_RECORD_BY_ID, [E::KIND, id], |row| row.get(0))
        .optional()
        .map_err(wrap_err)?;
    body.map(|b| decode_body(&b)).transpose().map_err(reject)
}

fn exists(conn: &rusqlite::Connection, kind: &str, id: &str) -> CallResult<bool> {
    conn.query_row(schema::SELECT_RECORD_EXISTS, [kind, id], |row| row.get(0))
        .map_err(wrap_err)
}

/// Writes a record row and replaces its key and reference rows.
fn write_record(conn: &rusqlite::Connection, record: &StoredRecord, insert: bool) -> CallResult<()> {
    let sql = if insert {
        schema::INSERT_RECORD
    } else {
        schema::UPDATE_RECORD
    };
    conn.execute(
        sql,
        rusqlite::params![record.kind, record.id, record.body, record.exclusive],
    )
    .map_err(wrap_err)?;

    conn.execute(schema::DELETE_KEYS, [record.kind, record.id.as_str()])
        .map_err(wrap_err)?;
    let keys = record
        .natural
        .iter()
        .map(|k| (k, true))
        .chain(record.groups.iter().map(|k| (k, false)));
    for (key, is_natural) in keys {
        conn.execute(
            schema::INSERT_KEY,
            rusqlite::params![record.kind, record.id, key.index, key.value, is_natural],
        )
        .map_err(wrap_err)?;
    }

    conn.execute(schema::DELETE_REFS, [record.kind, record.id.as_str()])
        .map_err(wrap_err)?;
    for target in &record.refs {
        conn.execute(
            schema::INSERT_REF,
            rusqlite::params![record.kind, record.id, target.kind, target.id],
        )
        .map_err(wrap_err)?;
    }

    Ok(())
}

/// Validates and writes `entity` inside the caller's transaction.
///
/// Demotions are written first so the new holder's natural key is free by
/// the time it is inserted.
fn save<E: Entity>(
    conn: &rusqlite::Connection,
    entity: E,
    previous: Option<E>,
    insert: bool,
) -> CallResult<Written<E>> {
    check_invariants(&entity).map_err(reject)?;
    let id = entity.id();
    let record = StoredRecord::encode(&entity).map_err(reject)?;

    let mut demoted = Vec::new();
    if let Some(scope) = &record.exclusive {
        let mut stmt = conn
            .prepare(schema::SELECT_EXCLUSIVE_HOLDERS)
            .map_err(wrap_err)?;
        let rows = stmt
            .query_map([E::KIND, scope.as_str(), id.as_str()], |row| {
                row.get::<_, String>(0)
            })
            .map_err(wrap_err)?;
        for row in rows {
            let before: E = decode_body(&row.map_err(wrap_err)?).map_err(reject)?;
            let mut after = before.clone();
            after.clear_exclusive();
            demoted.push(Change { before, after });
        }
    }
    for change in &demoted {
        let demoted_record = StoredRecord::encode(&change.after).map_err(reject)?;
        write_record(conn, &demoted_record, false)?;
    }

    for key in &record.natural {
        let holder: Option<String> = conn
            .query_row(
                schema::SELECT_NATURAL_KEY_HOLDER,
                [E::KIND, key.index, key.value.as_str(), id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(wrap_err)?;
        if holder.is_some() {
            return Err(reject(duplicate_key(E::KIND, key)));
        }
    }

    for target in &record.refs {
        let is_self = target.kind == E::KIND && target.id == id;
        if !is_self && !exists(conn, target.kind, &target.id)? {
            return Err(reject(dangling_reference(E::KIND, &id, target)));
        }
    }

    write_record(conn, &record, insert)?;

    Ok(Written {
        previous,
        entity,
        demoted,
    })
}

#[async_trait]
impl<E: Entity> Store<E> for SqliteStore {
    async fn create(&self, entity: &E) -> Result<Written<E>> {
        let entity = entity.clone();

        self.conn
            .call(move |conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(wrap_err)?;
                let id = entity.id();
                if exists(&tx, E::KIND, &id)? {
                    return Err(reject(RepositoryError::AlreadyExists {
                        entity_type: E::KIND,
                        key: format!("id={id}"),
                    }));
                }
                let written = save(&tx, entity, None, true)?;
                tx.commit().map_err(wrap_err)?;
                Ok(written)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, E::KIND))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<E>> {
        let id = id.to_string();

        self.conn
            .call(move |conn| load(conn, &id))
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, E::KIND))
    }

    async fn get_by(&self, predicate: &Predicate) -> Result<Option<E>> {
        let page = Store::<E>::list(self, predicate, PageRequest::first(1)).await?;
        Ok(page.items.into_iter().next())
    }

    async fn list(&self, predicate: &Predicate, page: PageRequest) -> Result<Page<E>> {
        let sql = PredicateSql::new(
            E::KIND,
            predicate.clauses(),
            ID_FIELD,
            page.cursor.as_deref(),
        );
        // One extra row tells whether another page exists.
        let fetch = page
            .limit
            .map(|limit| limit.saturating_add(1).min(i64::MAX as usize));

        let items = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql.select(fetch)).map_err(wrap_err)?;
                let rows = stmt
                    .query_map(rusqlite::params_from_iter(sql.params.iter()), |row| {
                        row.get::<_, String>(0)
                    })
                    .map_err(wrap_err)?;

                let mut items = Vec::new();
                for row_result in rows {
                    let body = row_result.map_err(wrap_err)?;
                    items.push(decode_body::<E>(&body).map_err(reject)?);
                }
                Ok(items)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, E::KIND))?;

        Ok(Page::from_sorted(items, page.limit))
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64> {
        let sql = PredicateSql::new(E::KIND, predicate.clauses(), ID_FIELD, None);

        let count = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    &sql.count(),
                    rusqlite::params_from_iter(sql.params.iter()),
                    |row| row.get::<_, i64>(0),
                )
                .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, E::KIND))?;

        Ok(count.max(0) as u64)
    }

    async fn update(&self, id: &str, patch: &E::Patch) -> Result<Written<E>> {
        let id = id.to_string();
        let patch = patch.clone();

        self.conn
            .call(move |conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(wrap_err)?;
                let current: E = load(&tx, &id)?
                    .ok_or_else(|| reject(RepositoryError::not_found(E::KIND, &id)))?;

                let mut next = current.clone();
                next.apply(&patch);
                let written = save(&tx, next, Some(current), false)?;
                tx.commit().map_err(wrap_err)?;
                Ok(written)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, E::KIND))
    }

    async fn delete(&self, id: &str) -> Result<E> {
        let id = id.to_string();

        self.conn
            .call(move |conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(wrap_err)?;
                let current: E = load(&tx, &id)?
                    .ok_or_else(|| reject(RepositoryError::not_found(E::KIND, &id)))?;

                let referrer: Option<(String, String)> = tx
                    .query_row(schema::SELECT_REFERRER, [E::KIND, id.as_str()], |row| {
                        Ok((row.get(0)?, row.get(1)?))
                    })
                    .optional()
                    .map_err(wrap_err)?;
                if let Some((by_kind, by_id)) = referrer {
                    return Err(reject(still_referenced(E::KIND, &id, &by_kind, &by_id)));
                }

                tx.execute(schema::DELETE_RECORD, [E::KIND, id.as_str()])
                    .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok(current)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, E::KIND))
    }
}
