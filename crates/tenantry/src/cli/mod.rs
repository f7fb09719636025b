//! CLI command definitions.

pub mod channels;
pub mod quotas;
pub mod spaces;

use clap::{Parser, Subcommand, ValueEnum};

/// Operator CLI for tenantry repositories.
#[derive(Debug, Parser)]
#[command(name = "tenantry")]
#[command(version, about = "Operator CLI for tenantry repositories", long_about = None)]
pub struct Cli {
    /// SQLite database path. Overrides `SQLITE_PATH`.
    #[arg(long)]
    pub sqlite_path: Option<String>,

    /// Cache backend.
    #[arg(long, env = "TENANTRY_CACHE", default_value = "memory")]
    pub cache: CacheBackend,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Cache backend options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CacheBackend {
    /// In-process LRU cache.
    #[default]
    Memory,
    /// Redis at `REDIS_URL` (requires the `redis` feature).
    Redis,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Space management.
    Spaces(spaces::SpacesCommand),
    /// Payment channel management.
    Channels(channels::ChannelsCommand),
    /// Quota management.
    Quotas(quotas::QuotasCommand),
}
