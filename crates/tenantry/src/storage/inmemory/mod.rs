//! In-memory storage backend.
//!
//! Stores every entity kind in one record table wrapped in `Arc<RwLock<_>>`.
//! Useful for tests and development where persistence is not required.
//!
//! # Example
//!
//! ```rust,ignore
//! use tenantry::storage::inmemory::InMemoryStore;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let spaces = CachedRepository::<Space, _>::new(store, cache, populator, ttl);
//! ```

mod store;

pub use store::InMemoryStore;
