//! Signature pool end to end, with the real HTTP signer.

#![allow(clippy::expect_used)]

use super::harness::{expected_authorization, TestHarness};
use sigpool::{AppConfig, Error, PoolConfig, SignaturePool};
use std::time::Duration;

/// A refill batch appends every response verbatim.
#[tokio::test]
async fn test_refill_batch_populates_pool() {
    let harness = TestHarness::setup().await;
    let mock = harness.mock_signer().await;
    let pool = SignaturePool::from_config(&harness.config()).expect("pool");

    let first = pool.acquire().await.expect("acquired");

    assert_eq!(first, expected_authorization());
    assert_eq!(pool.len(), 4);
    mock.assert_hits_async(5).await;

    for _ in 0..4 {
        assert_eq!(pool.acquire().await.expect("pooled"), expected_authorization());
    }
    // Drained without another round-trip.
    mock.assert_hits_async(5).await;
    assert_eq!(pool.stats().hits, 4);
}

/// A signer slower than the wait timeout still yields an authorization.
#[tokio::test]
async fn test_slow_signer_falls_back() {
    let harness = TestHarness::setup().await;
    let mock = harness
        .mock_signer_delayed(Duration::from_millis(300))
        .await;
    let config = harness.config_with_pool(PoolConfig {
        wait_timeout_ms: 50,
        ..PoolConfig::default()
    });
    let pool = SignaturePool::from_config(&config).expect("pool");

    let auth = pool.acquire().await.expect("fallback");

    assert_eq!(auth, expected_authorization());
    assert_eq!(pool.stats().fallbacks, 1);
    assert_eq!(mock.hits_async().await, 6);
}

/// A failing fallback surfaces as a signing error and leaves the pool alone.
#[tokio::test]
async fn test_server_error_propagates() {
    let harness = TestHarness::setup().await;
    let mock = harness.mock_signer_status(500).await;
    let pool = SignaturePool::from_config(&harness.config()).expect("pool");

    let err = pool.acquire().await.expect_err("500 everywhere");

    assert!(matches!(err, Error::Signing(_)));
    assert!(pool.is_empty());
    assert!(!pool.is_refilling());
    mock.assert_hits_async(6).await;
}

/// Missing endpoint configuration fails before any request is sent.
#[tokio::test]
async fn test_missing_endpoint_is_fatal() {
    let harness = TestHarness::setup().await;
    let mock = harness.mock_signer().await;

    let mut config: AppConfig = harness.config();
    config.signer.endpoint = None;

    let err = SignaturePool::from_config(&config).err().expect("config error");
    assert!(matches!(err, Error::Config(_)));
    mock.assert_hits_async(0).await;
}

/// Concurrent callers on a multi-threaded runtime share a single batch.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_batch() {
    let harness = TestHarness::setup().await;
    let mock = harness
        .mock_signer_delayed(Duration::from_millis(100))
        .await;
    let pool = SignaturePool::from_config(&harness.config()).expect("pool");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire().await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task").expect("acquired");
    }

    mock.assert_hits_async(5).await;
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.stats().fallbacks, 0);
}

/// With prefetch on, the pool is warm before the first caller arrives.
#[tokio::test]
async fn test_prefetch_on_start() {
    let harness = TestHarness::setup().await;
    let mock = harness.mock_signer().await;
    let config = harness.config_with_pool(PoolConfig {
        prefetch_on_start: true,
        ..PoolConfig::default()
    });

    let pool = SignaturePool::from_config(&config).expect("pool");
    let mut events = pool.subscribe();
    assert!(pool.is_refilling());

    while !matches!(
        events.recv().await.expect("event"),
        sigpool::PoolEvent::RefillCompleted { .. }
    ) {}

    assert_eq!(pool.len(), 5);
    pool.acquire().await.expect("pooled");
    assert_eq!(pool.stats().hits, 1);
    mock.assert_hits_async(5).await;
}
