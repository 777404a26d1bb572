//! Restaker signer against a mock signing endpoint.

#![allow(clippy::expect_used)]

use super::harness::{expected_authorization, TestHarness};
use serde_json::json;
use sigpool::{AuthorizationSource, Error, RestakerSigner};

#[tokio::test]
async fn test_signer_sends_wire_contract() {
    let harness = TestHarness::setup().await;
    let mock = harness.mock_signer().await;

    let signer = RestakerSigner::new(&harness.config().signer).expect("signer");
    let auth = signer.request_authorization().await.expect("signed");

    assert_eq!(auth, expected_authorization());
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_server_error_is_signing_error() {
    let harness = TestHarness::setup().await;
    let _mock = harness.mock_signer_status(500).await;

    let signer = RestakerSigner::new(&harness.config().signer).expect("signer");
    let err = signer.request_authorization().await.expect_err("500");

    assert!(matches!(err, Error::Signing(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_missing_fields_are_signing_error() {
    let harness = TestHarness::setup().await;
    let _mock = harness
        .mock_signer_body(json!({ "signature": "0xabcd" }))
        .await;

    let signer = RestakerSigner::new(&harness.config().signer).expect("signer");
    let err = signer.request_authorization().await.expect_err("malformed");

    assert!(matches!(err, Error::Signing(_)));
}

#[tokio::test]
async fn test_bad_message_hash_is_signing_error() {
    let harness = TestHarness::setup().await;
    let expected = expected_authorization();
    let _mock = harness
        .mock_signer_body(json!({
            "userSignature": expected.user_signature,
            "signature": expected.restaker_signature,
            "userAddress": expected.user_address,
            "messageHash": "not-a-hash",
            "restaker": expected.restaker_address,
        }))
        .await;

    let signer = RestakerSigner::new(&harness.config().signer).expect("signer");
    let err = signer.request_authorization().await.expect_err("bad hash");

    assert!(err.to_string().contains("messageHash"));
}
