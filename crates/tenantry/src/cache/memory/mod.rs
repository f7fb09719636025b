//! Process-local index maps, bounded by LRU eviction.
//!
//! Suited to a single instance and to tests; a fleet should share Redis.

mod cache;

pub use cache::MemoryCache;
