//! Space CLI commands.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Space management commands.
#[derive(Debug, Parser)]
pub struct SpacesCommand {
    #[command(subcommand)]
    pub action: SpacesAction,
}

/// Available space actions.
#[derive(Debug, Subcommand)]
pub enum SpacesAction {
    /// List the spaces of an owner.
    List {
        /// Owner user ID.
        #[arg(long)]
        owner: Uuid,
    },
    /// Create a new space.
    Create {
        /// Unique slug.
        #[arg(long)]
        slug: String,
        /// Display name.
        #[arg(long)]
        name: String,
        /// Owner user ID.
        #[arg(long)]
        owner: Uuid,
        /// Space description.
        #[arg(long)]
        description: Option<String>,
    },
    /// Get space by ID or slug.
    Get {
        /// Space ID.
        #[arg(required_unless_present = "slug", conflicts_with = "slug")]
        id: Option<Uuid>,
        /// Space slug.
        #[arg(long)]
        slug: Option<String>,
    },
    /// Delete space by ID.
    Delete {
        /// Space ID.
        id: Uuid,
    },
}
