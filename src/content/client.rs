//! HTTP client for the paywalled articles endpoint.

use crate::config::ContentConfig;
use crate::error::{Error, Result};
use crate::payment::{SignedAuthorization, RESTAKER_PAYMENT_HEADER, USER_PAYMENT_HEADER};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// One article returned by the content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Article body.
    pub content: String,
    /// Publication time as reported by the service.
    pub timestamp: String,
    /// Article author.
    pub author: String,
}

/// Body POSTed to the articles endpoint: the payment proof plus the source URL.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequest<'a> {
    /// Payment proof paying for this request.
    #[serde(flatten)]
    pub authorization: &'a SignedAuthorization,
    /// Upstream article source to read from.
    pub url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    articles: Vec<Article>,
}

/// Client for the content service that verifies payment proofs.
#[derive(Debug, Clone)]
pub struct ContentClient {
    client: reqwest::Client,
    articles_url: Url,
}

impl ContentClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no articles URL is configured.
    pub fn new(config: &ContentConfig) -> Result<Self> {
        let articles_url = config
            .articles_url
            .clone()
            .ok_or_else(|| Error::Config("articles URL is not configured".to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            articles_url,
        })
    }

    /// Endpoint the client POSTs to.
    #[must_use]
    pub fn articles_url(&self) -> &Url {
        &self.articles_url
    }

    /// Fetch the articles behind `source_url`, paying with `authorization`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Content` on network failure, a non-success status, or
    /// a malformed body.
    pub async fn fetch_articles(
        &self,
        authorization: &SignedAuthorization,
        source_url: &str,
    ) -> Result<Vec<Article>> {
        debug!(
            "Fetching articles from {source_url} with authorization {}",
            authorization.message_hash
        );

        let request = ArticleRequest {
            authorization,
            url: source_url,
        };
        let response = self
            .client
            .post(self.articles_url.clone())
            .header(USER_PAYMENT_HEADER, &authorization.user_signature)
            .header(RESTAKER_PAYMENT_HEADER, &authorization.restaker_signature)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Content(format!("request to {} failed: {e}", self.articles_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Content(format!(
                "content endpoint returned {status}"
            )));
        }

        let body: ArticlesResponse = response
            .json()
            .await
            .map_err(|e| Error::Content(format!("malformed articles response: {e}")))?;

        Ok(body.articles)
    }
}
