//! Functional core for tenantry.
//!
//! Pure types and functions shared by the cache-aside repositories: the
//! [`entity::Entity`] contract and the concrete platform entities, store and
//! cache traits, cache key construction, TTL policy and the invalidation
//! planner. Nothing in this crate performs I/O.

pub mod cache;
pub mod entity;
pub mod storage;
