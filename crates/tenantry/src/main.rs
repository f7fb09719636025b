//! tenantry CLI entry point.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tenantry::cli::channels::ChannelsAction;
use tenantry::cli::quotas::QuotasAction;
use tenantry::cli::spaces::SpacesAction;
use tenantry::cli::{Cli, Commands, OutputFormat};
use tenantry::output::{format_output, pretty};
use tenantry::storage::SqliteStore;
use tenantry::{connect_cache, Config, Repositories};
use tenantry_core::entity::{PaymentChannel, Quota, Space};

type Repos = Repositories<SqliteStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tenantry=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env();
    if let Some(path) = cli.sqlite_path.clone() {
        config.sqlite_path = path;
    }
    config.validate().context("invalid configuration")?;

    let store = SqliteStore::new(&config.sqlite_path)
        .await
        .with_context(|| format!("failed to open {}", config.sqlite_path))?;
    let cache = connect_cache(cli.cache, &config).await?;
    let repos = Repositories::new(Arc::new(store), cache, &config);

    let result = run(&cli, &repos).await;

    // Let scheduled cache work finish before exiting.
    repos.shutdown().await;
    result
}

async fn run(cli: &Cli, repos: &Repos) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Spaces(cmd) => run_spaces(cli, repos, &cmd.action).await,
        Commands::Channels(cmd) => run_channels(cli, repos, &cmd.action).await,
        Commands::Quotas(cmd) => run_quotas(cli, repos, &cmd.action).await,
    }
}

async fn run_spaces(cli: &Cli, repos: &Repos, action: &SpacesAction) -> anyhow::Result<()> {
    match action {
        SpacesAction::List { owner } => {
            let spaces = repos.spaces.list_by_owner(*owner).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", format_output(&spaces, cli.format)),
                OutputFormat::Pretty => println!("{}", pretty::format_spaces(&spaces)),
            }
        }
        SpacesAction::Create {
            slug,
            name,
            owner,
            description,
        } => {
            let mut space = Space::new(slug.as_str(), name.as_str(), *owner);
            space.description = description.clone();
            let space = repos.spaces.create(space).await?;
            print_space(cli, &space, "Created:\n");
        }
        SpacesAction::Get { id, slug } => {
            let space = match (id, slug) {
                (Some(id), _) => repos.spaces.get_by_id(&id.to_string()).await?,
                (None, Some(slug)) => repos.spaces.get_by_slug(slug).await?,
                (None, None) => anyhow::bail!("either an ID or --slug is required"),
            };
            let space = space.context("space not found")?;
            print_space(cli, &space, "");
        }
        SpacesAction::Delete { id } => {
            repos.spaces.delete(&id.to_string()).await?;
            if !cli.quiet {
                println!("Deleted space {id}");
            }
        }
    }
    Ok(())
}

async fn run_channels(cli: &Cli, repos: &Repos, action: &ChannelsAction) -> anyhow::Result<()> {
    match action {
        ChannelsAction::List { tenant } => {
            let channels = repos.channels.list_for_tenant(*tenant).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", format_output(&channels, cli.format)),
                OutputFormat::Pretty => println!("{}", pretty::format_channels(&channels)),
            }
        }
        ChannelsAction::Create {
            tenant,
            provider,
            name,
            default,
        } => {
            let mut channel = PaymentChannel::new(*tenant, provider.as_str(), name.as_str());
            if *default {
                channel = channel.as_default();
            }
            let channel = repos.channels.create(channel).await?;
            print_channel(cli, &channel, "Created:\n");
        }
        ChannelsAction::Default { tenant, provider } => {
            let channel = repos
                .channels
                .get_default(provider, *tenant)
                .await?
                .with_context(|| format!("no default {provider} channel for tenant {tenant}"))?;
            print_channel(cli, &channel, "");
        }
        ChannelsAction::SetDefault { id } => {
            let channel = repos.channels.set_default(&id.to_string()).await?;
            print_channel(cli, &channel, "Default:\n");
        }
    }
    Ok(())
}

async fn run_quotas(cli: &Cli, repos: &Repos, action: &QuotasAction) -> anyhow::Result<()> {
    match action {
        QuotasAction::List { space } => {
            let quotas = repos.quotas.list_for_space(*space).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", format_output(&quotas, cli.format)),
                OutputFormat::Pretty => println!("{}", pretty::format_quotas(&quotas)),
            }
        }
        QuotasAction::Create {
            space,
            resource,
            limit,
        } => {
            let quota = repos
                .quotas
                .create(Quota::new(*space, resource.as_str(), *limit))
                .await?;
            print_quota(cli, &quota, "Created:\n");
        }
        QuotasAction::Consume { id, amount } => {
            let quota = repos.quotas.consume(&id.to_string(), *amount).await?;
            print_quota(cli, &quota, "Consumed:\n");
        }
    }
    Ok(())
}

fn print_space(cli: &Cli, space: &Space, heading: &str) {
    match cli.format {
        OutputFormat::Json => println!("{}", format_output(space, cli.format)),
        OutputFormat::Pretty => println!("{heading}{}", pretty::format_space(space)),
    }
}

fn print_channel(cli: &Cli, channel: &PaymentChannel, heading: &str) {
    match cli.format {
        OutputFormat::Json => println!("{}", format_output(channel, cli.format)),
        OutputFormat::Pretty => println!("{heading}{}", pretty::format_channel(channel)),
    }
}

fn print_quota(cli: &Cli, quota: &Quota, heading: &str) {
    match cli.format {
        OutputFormat::Json => println!("{}", format_output(quota, cli.format)),
        OutputFormat::Pretty => println!("{heading}{}", pretty::format_quota(quota)),
    }
}
