//! Quota CLI commands.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Quota management commands.
#[derive(Debug, Parser)]
pub struct QuotasCommand {
    #[command(subcommand)]
    pub action: QuotasAction,
}

/// Available quota actions.
#[derive(Debug, Subcommand)]
pub enum QuotasAction {
    /// List the quotas of a space.
    List {
        /// Space ID.
        #[arg(long)]
        space: Uuid,
    },
    /// Create a new quota.
    Create {
        /// Space ID.
        #[arg(long)]
        space: Uuid,
        /// Metered resource, e.g. "seats".
        #[arg(long)]
        resource: String,
        /// Maximum usage.
        #[arg(long)]
        limit: u64,
    },
    /// Record usage against a quota.
    Consume {
        /// Quota ID.
        id: Uuid,
        /// Units to consume.
        #[arg(long, default_value_t = 1)]
        amount: u64,
    },
}
