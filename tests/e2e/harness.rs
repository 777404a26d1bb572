//! Test harness around mock signing and content services.
//!
//! The `TestHarness` starts an `httpmock` server standing in for both the
//! restaker signing endpoint (`POST /sign`) and the articles endpoint
//! (`POST /articles`), and builds an `AppConfig` pointing at it.

#![allow(clippy::expect_used)]

use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::{json, Value};
use sigpool::payment::DEFAULT_SERVICE;
use sigpool::{AppConfig, PoolConfig, SignedAuthorization};
use std::time::Duration;
use url::Url;

/// Wallet address the harness pays from.
pub const USER_ADDRESS: &str = "0x1111111111111111111111111111111111111111";

/// Standing wallet signature sent as `userSig`.
pub const USER_SIG: &str = "0xfeedfacefeedface";

/// Restaker address returned by the mock signer.
pub const RESTAKER_ADDRESS: &str = "0x2222222222222222222222222222222222222222";

/// Test environment with one mock server.
pub struct TestHarness {
    server: MockServer,
}

impl TestHarness {
    /// Start a fresh mock server.
    pub async fn setup() -> Self {
        Self {
            server: MockServer::start_async().await,
        }
    }

    /// Configuration pointing the signer and content client at the mock.
    pub fn config(&self) -> AppConfig {
        self.config_with_pool(PoolConfig {
            wait_timeout_ms: 5_000,
            ..PoolConfig::default()
        })
    }

    /// Configuration with custom pool settings.
    pub fn config_with_pool(&self, pool: PoolConfig) -> AppConfig {
        let mut config = AppConfig {
            pool,
            ..AppConfig::default()
        };
        config.signer.endpoint = Some(self.url("/"));
        config.signer.user_address = USER_ADDRESS.to_string();
        config.signer.user_signature = USER_SIG.to_string();
        config.content.articles_url = Some(self.url("/articles"));
        config
    }

    /// Signing endpoint that answers every request with `sign_response()`.
    pub async fn mock_signer(&self) -> Mock<'_> {
        self.mock_signer_delayed(Duration::ZERO).await
    }

    /// Signing endpoint that answers after `delay`.
    pub async fn mock_signer_delayed(&self, delay: Duration) -> Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(POST).path("/sign").json_body(sign_request());
                then.status(200).delay(delay).json_body(sign_response());
            })
            .await
    }

    /// Signing endpoint that fails every request with `status`.
    pub async fn mock_signer_status(&self, status: u16) -> Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(POST).path("/sign");
                then.status(status).body("restaker unavailable");
            })
            .await
    }

    /// Signing endpoint that returns `body` verbatim.
    pub async fn mock_signer_body(&self, body: Value) -> Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(POST).path("/sign");
                then.status(200).json_body(body);
            })
            .await
    }

    /// Articles endpoint that accepts the harness authorization.
    pub async fn mock_articles(&self, articles: Value) -> Mock<'_> {
        let expected = expected_authorization();
        self.server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/articles")
                    .header("user-payment-signature", expected.user_signature.as_str())
                    .header(
                        "restaker-payment-signature",
                        expected.restaker_signature.as_str(),
                    );
                then.status(200).json_body(json!({ "articles": articles }));
            })
            .await
    }

    /// Articles endpoint that rejects every request with `status`.
    pub async fn mock_articles_status(&self, status: u16) -> Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(POST).path("/articles");
                then.status(status).json_body(json!({ "message": "Invalid Signature" }));
            })
            .await
    }

    fn url(&self, path: &str) -> Url {
        Url::parse(&self.server.url(path)).expect("mock server url")
    }
}

/// Body the signer is expected to send.
pub fn sign_request() -> Value {
    json!({
        "userAddress": USER_ADDRESS,
        "serviceAddress": DEFAULT_SERVICE,
        "amount": "1",
        "chainId": "84532",
        "userSig": USER_SIG,
    })
}

/// Body the mock signer returns.
pub fn sign_response() -> Value {
    let expected = expected_authorization();
    json!({
        "userSignature": expected.user_signature,
        "signature": expected.restaker_signature,
        "userAddress": expected.user_address,
        "messageHash": expected.message_hash,
        "restaker": expected.restaker_address,
    })
}

/// Authorization decoded from `sign_response()`.
pub fn expected_authorization() -> SignedAuthorization {
    SignedAuthorization {
        user_signature: format!("0x{}", "a1".repeat(65)),
        restaker_signature: format!("0x{}", "b2".repeat(65)),
        user_address: USER_ADDRESS.to_string(),
        message_hash: format!("0x{}", "c3".repeat(32)),
        restaker_address: RESTAKER_ADDRESS.to_string(),
    }
}
