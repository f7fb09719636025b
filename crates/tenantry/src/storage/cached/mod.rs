//! Cached repositories.
//!
//! [`CachedRepository`] implements the cache-aside protocol once, generically
//! over [`tenantry_core::entity::Entity`]:
//!
//! - **Reads**: check the index maps first, on miss read the store and fill
//!   the cache in the background
//! - **Writes**: persist to the store, then invalidate in the background
//!
//! Entity-specific lookups (`get_by_slug`, `get_default`, ...) are thin
//! inherent impls on the concrete repository types in the sibling modules.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::new("tenantry.db").await?);
//! let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new(10_000));
//! let populator = Populator::new(PopulatorConfig::default());
//!
//! let spaces = CachedRepository::<Space, _>::new(store, cache, populator, TtlPolicy::default());
//! let space = spaces.get_by_slug("acme").await?;
//! ```

mod billing;
mod channel;
mod group;
mod index_map;
mod membership;
mod quota;
mod repository;
mod setting;
mod space;

#[cfg(all(test, feature = "memory"))]
pub(crate) mod testing;

pub use index_map::IndexMap;
pub use repository::CachedRepository;
