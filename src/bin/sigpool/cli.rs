//! Command-line interface definition.

use clap::{Parser, Subcommand};
use sigpool::config::AppConfig;
use std::path::PathBuf;
use url::Url;

/// Prefetching pool of co-signed payment authorizations.
#[derive(Parser, Debug)]
#[command(name = "sigpool")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the restaker signing endpoint.
    #[arg(long, global = true, env = "SIGPOOL_SIGNER_URL")]
    pub signer_url: Option<Url>,

    /// Wallet address of the paying user.
    #[arg(long, global = true, env = "SIGPOOL_USER_ADDRESS")]
    pub user_address: Option<String>,

    /// Wallet signature authorizing the restaker to co-sign payments.
    #[arg(long, global = true, env = "SIGPOOL_USER_SIGNATURE", hide_env_values = true)]
    pub user_signature: Option<String>,

    /// Endpoint serving paywalled articles.
    #[arg(long, global = true, env = "SIGPOOL_ARTICLES_URL")]
    pub articles_url: Option<Url>,

    /// Authorizations requested per refill batch.
    #[arg(long, global = true, env = "SIGPOOL_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// How long to wait for a refill before signing on demand, in milliseconds.
    #[arg(long, global = true, env = "SIGPOOL_WAIT_TIMEOUT_MS")]
    pub wait_timeout_ms: Option<u64>,

    /// Start a refill as soon as the pool is created.
    #[arg(long, global = true)]
    pub prefetch: bool,

    /// Log level.
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Path to configuration file.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Acquire authorizations and print them as JSON lines.
    Acquire {
        /// Number of authorizations to acquire.
        #[arg(long, short = 'n', default_value = "1")]
        count: usize,
    },

    /// Pay for and fetch the articles behind a source URL.
    Unlock {
        /// Article source URL.
        source_url: String,
    },

    /// Write the default configuration to a file.
    InitConfig {
        /// Destination path.
        path: PathBuf,
    },
}

impl Cli {
    /// Build the effective configuration: file (explicit or default path),
    /// then CLI and environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn to_config(&self) -> color_eyre::Result<AppConfig> {
        // Start with default config or load from file
        let mut config = if let Some(ref path) = self.config {
            AppConfig::from_file(path)?
        } else {
            match AppConfig::default_path() {
                Some(path) if path.exists() => AppConfig::from_file(&path)?,
                _ => AppConfig::default(),
            }
        };

        // Override with CLI arguments
        if let Some(ref url) = self.signer_url {
            config.signer.endpoint = Some(url.clone());
        }
        if let Some(ref address) = self.user_address {
            config.signer.user_address.clone_from(address);
        }
        if let Some(ref signature) = self.user_signature {
            config.signer.user_signature.clone_from(signature);
        }
        if let Some(ref url) = self.articles_url {
            config.content.articles_url = Some(url.clone());
        }
        if let Some(batch_size) = self.batch_size {
            config.pool.batch_size = batch_size;
        }
        if let Some(wait_timeout_ms) = self.wait_timeout_ms {
            config.pool.wait_timeout_ms = wait_timeout_ms;
        }
        if self.prefetch {
            config.pool.prefetch_on_start = true;
        }
        config.log_level.clone_from(&self.log_level);

        Ok(config)
    }
}
