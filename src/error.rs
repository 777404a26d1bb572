//! Error types for sigpool.

use thiserror::Error;

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the signature pool and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is missing or invalid. Never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A call to the signing endpoint failed (network, status or malformed body).
    #[error("Signing request failed: {0}")]
    Signing(String),

    /// The content endpoint rejected or failed the articles request.
    #[error("Content request failed: {0}")]
    Content(String),

    /// I/O error while reading or writing configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for configuration errors, which callers must not retry.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
