//! Backends for the index maps.
//!
//! Each backend implements [`Cache`] from `tenantry_core::cache`. The
//! repositories hold an `Arc<dyn Cache>`, so one binary can carry both and
//! pick at startup.
//!
//! - `memory` (default): bounded LRU in the current process
//! - `redis`: shared maps behind a Redis server
//!
//! [`Cache`]: tenantry_core::cache::Cache

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!("tenantry needs a cache backend: enable the `memory` or `redis` feature");

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

#[cfg(feature = "memory")]
pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;
