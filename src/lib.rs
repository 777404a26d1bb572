//! # sigpool
//!
//! Prefetching pool of co-signed payment authorizations for paywalled content.
//!
//! Unlocking an article requires a payment proof signed by both the user and a
//! restaker co-signer. Getting one signed is a slow network round-trip, so
//! sigpool keeps a few ready in a pool, refills it in batches, and falls back
//! to a direct request when the pool runs dry.
//!
//! ```rust,ignore
//! use sigpool::{AppConfig, ContentClient, PaywallGate, SignaturePool};
//!
//! let config = AppConfig::from_file("sigpool.toml".as_ref())?;
//! let pool = SignaturePool::from_config(&config)?;
//! let gate = PaywallGate::new(pool, ContentClient::new(&config.content)?);
//!
//! let outcome = gate.unlock("https://cat-blog.example/articles").await;
//! println!("{outcome}");
//! ```

pub mod config;
pub mod content;
pub mod error;
pub mod event;
pub mod payment;

pub use config::{AppConfig, ContentConfig, PoolConfig, SignerConfig};
pub use content::{Article, ContentClient, PaywallGate, UnlockOutcome};
pub use error::{Error, Result};
pub use event::{PoolEvent, PoolEventsChannel};
pub use payment::{
    AuthorizationSource, PaymentTarget, PoolStats, RestakerSigner, SignaturePool,
    SignedAuthorization,
};
