//! Paywall gate: spend one pooled authorization to unlock content.

use crate::content::client::{Article, ContentClient};
use crate::payment::SignaturePool;
use std::fmt;
use tracing::{info, warn};

/// Result of an unlock attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// Payment accepted; the gated articles.
    Unlocked(Vec<Article>),
    /// Content stays locked. The cause is logged, not exposed.
    Locked,
}

impl UnlockOutcome {
    /// Returns true if the content was unlocked.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked(_))
    }

    /// The unlocked articles, if any.
    #[must_use]
    pub fn articles(&self) -> Option<&[Article]> {
        match self {
            Self::Unlocked(articles) => Some(articles),
            Self::Locked => None,
        }
    }
}

impl fmt::Display for UnlockOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlocked(articles) => write!(f, "Unlocked {} articles", articles.len()),
            Self::Locked => write!(f, "Could not unlock content"),
        }
    }
}

/// Unlocks paywalled content with authorizations from a shared pool.
#[derive(Clone)]
pub struct PaywallGate {
    pool: SignaturePool,
    content: ContentClient,
}

impl PaywallGate {
    /// Create a gate over an existing pool and content client.
    #[must_use]
    pub fn new(pool: SignaturePool, content: ContentClient) -> Self {
        Self { pool, content }
    }

    /// The pool this gate draws from.
    #[must_use]
    pub fn pool(&self) -> &SignaturePool {
        &self.pool
    }

    /// Pay for and fetch the articles behind `source_url`.
    ///
    /// Never returns an error: any failure keeps the content locked.
    pub async fn unlock(&self, source_url: &str) -> UnlockOutcome {
        let authorization = match self.pool.acquire().await {
            Ok(authorization) => authorization,
            Err(e) => {
                warn!("Could not obtain payment authorization: {e}");
                return UnlockOutcome::Locked;
            }
        };

        match self
            .content
            .fetch_articles(&authorization, source_url)
            .await
        {
            Ok(articles) => {
                info!("Unlocked {} articles from {source_url}", articles.len());
                UnlockOutcome::Unlocked(articles)
            }
            Err(e) => {
                warn!("Content request for {source_url} failed: {e}");
                UnlockOutcome::Locked
            }
        }
    }
}
