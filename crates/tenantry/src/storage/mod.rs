//! Storage implementations and cached repositories.
//!
//! Stores implement `tenantry_core::storage::Store` for every entity type and
//! are the single source of truth. [`CachedRepository`] layers the cache-aside
//! protocol on top of any of them.
//!
//! # Feature Flags
//!
//! - `sqlite` (default): durable store backed by SQLite
//!
//! The in-memory store is always available.

pub mod cached;
pub mod inmemory;
mod record;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use cached::{CachedRepository, IndexMap};
pub use inmemory::InMemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
