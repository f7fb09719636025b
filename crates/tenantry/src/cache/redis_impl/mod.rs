//! Index maps kept in Redis so every instance sees the same cache.

mod cache;
mod error;

pub use cache::RedisCache;
