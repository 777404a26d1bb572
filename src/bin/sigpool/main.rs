//! sigpool CLI entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use color_eyre::eyre::eyre;
use sigpool::{AppConfig, ContentClient, PaywallGate, SignaturePool};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing on stderr; stdout carries the JSON output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    info!("sigpool v{}", env!("CARGO_PKG_VERSION"));

    // Build configuration
    let config = cli.to_config()?;

    match cli.command {
        Command::InitConfig { path } => {
            write_default_config(&path)?;
            info!("Wrote default configuration to {}", path.display());
        }
        Command::Acquire { count } => {
            let pool = SignaturePool::from_config(&config)?;
            for _ in 0..count {
                let authorization = pool.acquire().await?;
                println!("{}", serde_json::to_string(&authorization)?);
            }
            let stats = pool.stats();
            info!(
                "Acquired {count} authorizations (hits={}, fallbacks={}, pooled={})",
                stats.hits,
                stats.fallbacks,
                pool.len()
            );
        }
        Command::Unlock { source_url } => {
            let pool = SignaturePool::from_config(&config)?;
            let gate = PaywallGate::new(pool, ContentClient::new(&config.content)?);
            let outcome = gate.unlock(&source_url).await;
            match outcome.articles() {
                Some(articles) => println!("{}", serde_json::to_string_pretty(articles)?),
                None => return Err(eyre!("{outcome}")),
            }
        }
    }

    Ok(())
}

/// Write the built-in defaults, ignoring CLI and environment overrides so
/// secrets such as the user signature never land in the file.
fn write_default_config(path: &Path) -> sigpool::Result<()> {
    AppConfig::default().to_file(path)
}
