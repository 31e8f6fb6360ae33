//! xeninv CLI
//!
//! Dynamic inventory for XenServer / Xen Orchestra deployments: connects,
//! fetches one API snapshot, synthesizes the inventory graph and prints it
//! as JSON.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing::info;
use tracing_subscriber::EnvFilter;

use xeninv_client::{SnapshotCache, TransportConfig, XenSession, fetch_snapshot};
use xeninv_core::{Config, Snapshot, synthesize};

#[derive(Parser)]
#[command(name = "xeninv")]
#[command(about = "XenServer / Xen Orchestra dynamic inventory", long_about = None)]
struct Cli {
    /// Path to the inventory configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full inventory graph as JSON
    List,
    /// Print the variables of a single inventory entry
    Host {
        /// Entry key (UUID or name label, depending on configuration)
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    let snapshot = obtain_snapshot(&config).await?;
    let graph = synthesize(&snapshot, &config)?;

    match cli.command {
        Commands::List => println!("{}", serde_json::to_string_pretty(&graph)?),
        Commands::Host { name } => {
            let entry = graph
                .entry(&name)
                .ok_or_else(|| eyre!("no inventory entry named '{name}'"))?;
            println!("{}", serde_json::to_string_pretty(&entry.vars)?);
        }
    }

    Ok(())
}

/// Produce the API snapshot, via the cache when enabled.
async fn obtain_snapshot(config: &Config) -> Result<Snapshot> {
    let cache = config.cache.then(|| {
        SnapshotCache::new(
            &config.cache_dir(),
            Duration::from_secs(config.cache_ttl_secs),
        )
    });

    if let Some(cache) = &cache
        && let Some(snapshot) = cache.load()?
    {
        info!("serving inventory from cached snapshot");
        return Ok(snapshot);
    }

    let transport = TransportConfig {
        use_ssl: config.use_ssl,
        validate_certs: config.validate_certs,
    };
    let session =
        XenSession::connect(&config.api_host, &config.user, &config.password, transport).await?;

    let snapshot = fetch_snapshot(&session).await?;
    session.logout().await;

    if let Some(cache) = &cache {
        cache.store(&snapshot)?;
    }

    Ok(snapshot)
}
