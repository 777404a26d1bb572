//! Configuration for sigpool.

use crate::payment::{PaymentTarget, DEFAULT_AMOUNT, DEFAULT_CHAIN_ID, DEFAULT_SERVICE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Signing endpoint configuration.
    #[serde(default)]
    pub signer: SignerConfig,

    /// Prefetch pool configuration.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Content endpoint configuration.
    #[serde(default)]
    pub content: ContentConfig,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Signing endpoint and payment target configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Base URL of the restaker signing endpoint.
    #[serde(default)]
    pub endpoint: Option<Url>,

    /// Wallet address of the paying user.
    #[serde(default)]
    pub user_address: String,

    /// Wallet signature authorizing the restaker to co-sign payments.
    #[serde(default)]
    pub user_signature: String,

    /// Service (payee) address.
    #[serde(default = "default_service")]
    pub service: String,

    /// Payment amount, as a decimal string.
    #[serde(default = "default_amount")]
    pub amount: String,

    /// Chain the payment settles on.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Prefetch pool tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of authorizations requested per refill batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// How long `acquire` waits for a refill before falling back, in milliseconds.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_ms: u64,

    /// Keep the successful part of a batch when some of its requests fail.
    #[serde(default = "default_salvage")]
    pub salvage_partial_batches: bool,

    /// Start a refill as soon as the pool is created.
    #[serde(default)]
    pub prefetch_on_start: bool,
}

/// Content endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Endpoint serving paywalled articles.
    #[serde(default)]
    pub articles_url: Option<Url>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            signer: SignerConfig::default(),
            pool: PoolConfig::default(),
            content: ContentConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            user_address: String::new(),
            user_signature: String::new(),
            service: default_service(),
            amount: default_amount(),
            chain_id: default_chain_id(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            wait_timeout_ms: default_wait_timeout(),
            salvage_partial_batches: default_salvage(),
            prefetch_on_start: false,
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            articles_url: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service() -> String {
    DEFAULT_SERVICE.to_string()
}

fn default_amount() -> String {
    DEFAULT_AMOUNT.to_string()
}

const fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_batch_size() -> usize {
    5
}

const fn default_wait_timeout() -> u64 {
    3_000
}

const fn default_salvage() -> bool {
    true
}

impl SignerConfig {
    /// The fixed (service, amount, chain id) tuple every pooled entry is issued for.
    #[must_use]
    pub fn target(&self) -> PaymentTarget {
        PaymentTarget {
            service: self.service.clone(),
            amount: self.amount.clone(),
            chain_id: self.chain_id,
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PoolConfig {
    /// How long `acquire` waits for a refill.
    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Reject settings the pool cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for a zero batch size or a zero wait timeout.
    pub fn validate(&self) -> crate::Result<()> {
        if self.batch_size == 0 {
            return Err(crate::Error::Config(
                "pool.batch_size must be at least 1".to_string(),
            ));
        }
        if self.wait_timeout_ms == 0 {
            return Err(crate::Error::Config(
                "pool.wait_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl ContentConfig {
    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    /// Default location of the configuration file, if a config directory exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "sigpool")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &std::path::Path) -> crate::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
