use std::{env, str::FromStr, time::Duration};

use thiserror::Error;

use tenantry_core::cache::TtlPolicy;

use crate::populator::PopulatorConfig;

/// Errors raised by [`Config::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
    #[error("{name} must not be empty")]
    Empty { name: &'static str },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of memory cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// TTL of relationship caches in seconds (default: 7,200)
    pub ttl_relationship_seconds: u64,
    /// TTL of slowly-changing entity caches in seconds (default: 14,400)
    pub ttl_entity_seconds: u64,
    /// TTL of configuration caches in seconds (default: 21,600)
    pub ttl_configuration_seconds: u64,
    /// Number of background populator workers (default: 4)
    pub populator_workers: usize,
    /// Queue bound per populator worker (default: 1,024)
    pub populator_queue_capacity: usize,
    /// Path to SQLite database file (default: "tenantry.db")
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    pub redis_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `CACHE_TTL_RELATIONSHIP_SECONDS` - Relationship TTL (default: 7,200)
    /// - `CACHE_TTL_ENTITY_SECONDS` - Entity TTL (default: 14,400)
    /// - `CACHE_TTL_CONFIGURATION_SECONDS` - Configuration TTL (default: 21,600)
    /// - `POPULATOR_WORKERS` - Background workers (default: 4)
    /// - `POPULATOR_QUEUE_CAPACITY` - Per-worker queue bound (default: 1,024)
    /// - `SQLITE_PATH` - SQLite database path (default: "tenantry.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            cache_max_entries: parse_or(lookup("CACHE_MAX_ENTRIES"), 10_000),
            ttl_relationship_seconds: parse_or(lookup("CACHE_TTL_RELATIONSHIP_SECONDS"), 7_200),
            ttl_entity_seconds: parse_or(lookup("CACHE_TTL_ENTITY_SECONDS"), 14_400),
            ttl_configuration_seconds: parse_or(lookup("CACHE_TTL_CONFIGURATION_SECONDS"), 21_600),
            populator_workers: parse_or(lookup("POPULATOR_WORKERS"), 4),
            populator_queue_capacity: parse_or(lookup("POPULATOR_QUEUE_CAPACITY"), 1_024),
            sqlite_path: lookup("SQLITE_PATH").unwrap_or_else(|| "tenantry.db".to_string()),
            redis_url: lookup("REDIS_URL").unwrap_or_else(|| "redis://localhost:6379".to_string()),
        }
    }

    /// Rejects values that would leave a component unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("CACHE_MAX_ENTRIES", self.cache_max_entries as u64),
            ("CACHE_TTL_RELATIONSHIP_SECONDS", self.ttl_relationship_seconds),
            ("CACHE_TTL_ENTITY_SECONDS", self.ttl_entity_seconds),
            ("CACHE_TTL_CONFIGURATION_SECONDS", self.ttl_configuration_seconds),
            ("POPULATOR_WORKERS", self.populator_workers as u64),
            ("POPULATOR_QUEUE_CAPACITY", self.populator_queue_capacity as u64),
        ];
        if let Some((name, _)) = counts.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero { name });
        }
        if self.sqlite_path.trim().is_empty() {
            return Err(ConfigError::Empty { name: "SQLITE_PATH" });
        }
        Ok(())
    }

    /// TTLs per entity class.
    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy::new(
            Duration::from_secs(self.ttl_relationship_seconds),
            Duration::from_secs(self.ttl_entity_seconds),
            Duration::from_secs(self.ttl_configuration_seconds),
        )
    }

    pub fn populator(&self) -> PopulatorConfig {
        PopulatorConfig {
            workers: self.populator_workers,
            queue_capacity: self.populator_queue_capacity,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
