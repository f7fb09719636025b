//! Payment channel CLI commands.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Payment channel management commands.
#[derive(Debug, Parser)]
pub struct ChannelsCommand {
    #[command(subcommand)]
    pub action: ChannelsAction,
}

/// Available payment channel actions.
#[derive(Debug, Subcommand)]
pub enum ChannelsAction {
    /// List the channels of a tenant.
    List {
        /// Tenant (space) ID.
        #[arg(long)]
        tenant: Uuid,
    },
    /// Create a new channel.
    Create {
        /// Tenant (space) ID.
        #[arg(long)]
        tenant: Uuid,
        /// Payment provider, e.g. "stripe".
        #[arg(long)]
        provider: String,
        /// Display name.
        #[arg(long)]
        name: String,
        /// Make it the provider's default, demoting the current one.
        #[arg(long)]
        default: bool,
    },
    /// Show the default channel of a provider.
    Default {
        /// Tenant (space) ID.
        #[arg(long)]
        tenant: Uuid,
        /// Payment provider.
        #[arg(long)]
        provider: String,
    },
    /// Make a channel its provider's default.
    SetDefault {
        /// Channel ID.
        id: Uuid,
    },
}
