//! Sources of fresh payment authorizations.
//!
//! The pool only knows the [`AuthorizationSource`] trait. [`RestakerSigner`]
//! is the production implementation, asking the external restaker service to
//! co-sign a payment for the fixed target.

use crate::config::SignerConfig;
use crate::error::{Error, Result};
use crate::payment::types::{SignRequest, SignResponse, SignedAuthorization};
use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

/// Path of the signing route, relative to the configured endpoint.
const SIGN_PATH: &str = "sign";

/// Something that can produce one fresh [`SignedAuthorization`] per call.
#[async_trait]
pub trait AuthorizationSource: Send + Sync {
    /// Request a new authorization for the source's payment target.
    ///
    /// # Errors
    ///
    /// Returns `Error::Signing` if the authorization could not be obtained.
    async fn request_authorization(&self) -> Result<SignedAuthorization>;
}

/// HTTP client for the restaker signing endpoint.
#[derive(Debug, Clone)]
pub struct RestakerSigner {
    client: reqwest::Client,
    endpoint: Url,
    request: SignRequest,
}

impl RestakerSigner {
    /// Create a signer from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no endpoint is configured or the HTTP client
    /// cannot be built. No network call is made.
    pub fn new(config: &SignerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;
        Self::with_client(config, client)
    }

    /// Create a signer that reuses an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no endpoint is configured.
    pub fn with_client(config: &SignerConfig, client: reqwest::Client) -> Result<Self> {
        let base = config
            .endpoint
            .as_ref()
            .ok_or_else(|| Error::Config("signing endpoint URL is not configured".to_string()))?;
        let endpoint = join_path(base, SIGN_PATH)?;
        let request = SignRequest::new(
            &config.target(),
            &config.user_address,
            &config.user_signature,
        );

        Ok(Self {
            client,
            endpoint,
            request,
        })
    }

    /// Full URL the signer POSTs to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AuthorizationSource for RestakerSigner {
    async fn request_authorization(&self) -> Result<SignedAuthorization> {
        debug!("Requesting authorization from {}", self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&self.request)
            .send()
            .await
            .map_err(|e| {
                warn!("Signing request to {} failed: {e}", self.endpoint);
                Error::Signing(format!("request to {} failed: {e}", self.endpoint))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Signing endpoint returned {status}");
            return Err(Error::Signing(format!(
                "signing endpoint returned {status}"
            )));
        }

        let body: SignResponse = response
            .json()
            .await
            .map_err(|e| Error::Signing(format!("malformed signing response: {e}")))?;

        body.into_authorization()
    }
}

/// Join `path` onto `base`, treating `base` as a directory.
fn join_path(base: &Url, path: &str) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path)
        .map_err(|e| Error::Config(format!("invalid signing endpoint {base}: {e}")))
}
