//! tenantry - cache-aside repositories for a multi-tenant platform.
//!
//! The store is the source of truth; caches only ever speed reads up. See
//! [`storage::CachedRepository`] for the protocol and [`populator`] for how
//! cache work is taken off the request path.

pub mod cache;
pub mod cli;
pub mod config;
pub mod output;
pub mod populator;
pub mod state;
pub mod storage;

pub use config::{Config, ConfigError};
pub use populator::{Populator, PopulatorConfig};
pub use state::{connect_cache, EntityStore, Repositories};
pub use storage::{CachedRepository, IndexMap};
