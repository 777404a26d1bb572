//! Prefetching pool of signed payment authorizations.
//!
//! Co-signing a payment takes a slow round-trip through the restaker, so the
//! pool keeps a small FIFO of ready authorizations and refills it in batches
//! in the background. Callers that find the pool empty attach to the refill
//! in flight and fall back to a direct request if it does not land in time.

use crate::config::{AppConfig, PoolConfig};
use crate::error::Result;
use crate::event::{create_event_channel, PoolEvent, PoolEventsChannel, PoolEventsSender};
use crate::payment::signer::{AuthorizationSource, RestakerSigner};
use crate::payment::types::SignedAuthorization;
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Pool statistics for monitoring.
#[derive(Debug, Default, Clone)]
pub struct PoolStats {
    /// Acquires served straight from the pool.
    pub hits: u64,
    /// Acquires that found the pool empty.
    pub misses: u64,
    /// Acquires that bypassed the pool with an on-demand request.
    pub fallbacks: u64,
    /// Refill batches that appended entries.
    pub batches_completed: u64,
    /// Refill batches that appended nothing.
    pub batches_failed: u64,
    /// Entries appended by refills.
    pub entries_added: u64,
}

impl PoolStats {
    /// Calculate hit rate as a percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Pooled entries and the refill-in-flight flag, always locked together.
#[derive(Default)]
struct PoolState {
    entries: VecDeque<SignedAuthorization>,
    refilling: bool,
    /// Bumped by `clear`; a refill started under an older generation is discarded.
    generation: u64,
}

enum Checkout {
    Ready(SignedAuthorization),
    Pending { start_refill: bool },
}

struct Shared {
    source: Arc<dyn AuthorizationSource>,
    config: PoolConfig,
    state: Mutex<PoolState>,
    refilled: Notify,
    stats: Mutex<PoolStats>,
    events: PoolEventsSender,
}

/// Prefetch cache of payment authorizations for one payment target.
///
/// Cloning is cheap and every clone shares the same pool.
#[derive(Clone)]
pub struct SignaturePool {
    shared: Arc<Shared>,
}

impl SignaturePool {
    /// Create an empty pool backed by `source`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `config` fails validation.
    pub fn new(source: Arc<dyn AuthorizationSource>, config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let (events, _) = create_event_channel();

        info!(
            "Signature pool initialized (batch_size={}, wait_timeout={:?}, salvage={})",
            config.batch_size,
            config.wait_timeout(),
            config.salvage_partial_batches
        );

        Ok(Self {
            shared: Arc::new(Shared {
                source,
                config,
                state: Mutex::new(PoolState::default()),
                refilled: Notify::new(),
                stats: Mutex::new(PoolStats::default()),
                events,
            }),
        })
    }

    /// Create a pool backed by the restaker signing endpoint in `config`.
    ///
    /// Starts a refill right away when `pool.prefetch_on_start` is set.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the signing endpoint is missing or the pool
    /// settings are invalid. No network call is made before that check.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let signer = RestakerSigner::new(&config.signer)?;
        let pool = Self::new(Arc::new(signer), config.pool.clone())?;
        if config.pool.prefetch_on_start {
            pool.warm_up();
        }
        Ok(pool)
    }

    /// Take one authorization.
    ///
    /// Serves the oldest pooled entry if there is one. Otherwise starts a
    /// refill (unless one is already in flight), waits up to the configured
    /// timeout for an entry, and finally requests one directly.
    ///
    /// # Errors
    ///
    /// Returns `Error::Signing` if the direct request fails. The pool is left
    /// untouched in that case.
    pub async fn acquire(&self) -> Result<SignedAuthorization> {
        let start_refill = match self.shared.checkout() {
            Checkout::Ready(auth) => {
                self.shared.stats.lock().hits += 1;
                debug!("Served authorization {} from pool", auth.message_hash);
                return Ok(auth);
            }
            Checkout::Pending { start_refill } => start_refill,
        };

        self.shared.stats.lock().misses += 1;
        if start_refill {
            self.spawn_refill();
        }

        let wait = self.shared.config.wait_timeout();
        match tokio::time::timeout(wait, self.shared.wait_for_entry()).await {
            Ok(Some(auth)) => {
                debug!("Served authorization {} after refill", auth.message_hash);
                return Ok(auth);
            }
            Ok(None) => debug!("Refill left no entry for this caller, falling back"),
            Err(_) => debug!("No pooled authorization after {wait:?}, falling back"),
        }

        self.fallback().await
    }

    /// Start a refill if the pool is empty and none is in flight.
    ///
    /// Returns `true` if a refill was started. Must be called from within a
    /// tokio runtime; otherwise nothing is started.
    pub fn warm_up(&self) -> bool {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime available, skipping pool warm-up");
            return false;
        };
        if !self.shared.begin_refill() {
            return false;
        }
        let shared = Arc::clone(&self.shared);
        handle.spawn(async move { shared.refill_batch().await });
        true
    }

    /// Append externally obtained authorizations to the back of the pool.
    pub fn extend<I>(&self, authorizations: I)
    where
        I: IntoIterator<Item = SignedAuthorization>,
    {
        self.shared.state.lock().entries.extend(authorizations);
        self.shared.refilled.notify_waiters();
    }

    /// Drop every pooled authorization.
    ///
    /// A refill already in flight discards its batch instead of appending it.
    pub fn clear(&self) {
        let dropped = {
            let mut state = self.shared.state.lock();
            let dropped = state.entries.len();
            state.entries.clear();
            state.generation = state.generation.wrapping_add(1);
            dropped
        };
        debug!("Cleared {dropped} pooled authorizations");
    }

    /// Number of pooled authorizations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    /// Check if the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().entries.is_empty()
    }

    /// Check if a refill batch is in flight.
    #[must_use]
    pub fn is_refilling(&self) -> bool {
        self.shared.state.lock().refilling
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.shared.stats.lock().clone()
    }

    /// Subscribe to pool events.
    #[must_use]
    pub fn subscribe(&self) -> PoolEventsChannel {
        self.shared.events.subscribe()
    }

    /// Pool settings.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    fn spawn_refill(&self) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { shared.refill_batch().await });
    }

    async fn fallback(&self) -> Result<SignedAuthorization> {
        self.shared.stats.lock().fallbacks += 1;
        let _ = self.shared.events.send(PoolEvent::FallbackUsed);

        self.shared
            .source
            .request_authorization()
            .await
            .map_err(|e| {
                warn!("On-demand authorization failed: {e}");
                e
            })
    }
}

impl Shared {
    /// Pop the oldest entry, or mark a refill as in flight.
    fn checkout(&self) -> Checkout {
        let mut state = self.state.lock();
        if let Some(auth) = state.entries.pop_front() {
            return Checkout::Ready(auth);
        }
        let start_refill = !state.refilling;
        state.refilling = true;
        Checkout::Pending { start_refill }
    }

    fn begin_refill(&self) -> bool {
        let mut state = self.state.lock();
        if state.refilling || !state.entries.is_empty() {
            return false;
        }
        state.refilling = true;
        true
    }

    /// Wait until an entry can be taken, or the refill ends without one.
    async fn wait_for_entry(&self) -> Option<SignedAuthorization> {
        loop {
            let notified = self.refilled.notified();
            tokio::pin!(notified);
            // Register before inspecting the state so a wake-up between the
            // check and the await is not lost.
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if let Some(auth) = state.entries.pop_front() {
                    return Some(auth);
                }
                if !state.refilling {
                    return None;
                }
            }

            notified.await;
        }
    }

    async fn refill_batch(&self) {
        let guard = RefillGuard::begin(self);
        let batch_size = self.config.batch_size;

        info!("Refilling signature pool with {batch_size} authorizations");
        let _ = self.events.send(PoolEvent::RefillStarted { batch_size });

        let mut pending: FuturesUnordered<_> = (0..batch_size)
            .map(|_| self.source.request_authorization())
            .collect();

        let mut signed = Vec::with_capacity(batch_size);
        let mut failures = Vec::new();
        while let Some(result) = pending.next().await {
            match result {
                Ok(auth) => signed.push(auth),
                Err(e) => {
                    warn!("Refill request failed: {e}");
                    failures.push(e);
                }
            }
        }

        let failed = failures.len();
        if signed.is_empty() || (failed > 0 && !self.config.salvage_partial_batches) {
            warn!(
                "Refill batch failed ({failed}/{batch_size} requests), discarding {} authorizations",
                signed.len()
            );
            self.stats.lock().batches_failed += 1;
            let message = failures
                .first()
                .map_or_else(String::new, ToString::to_string);
            let _ = self.events.send(PoolEvent::RefillFailed { failed, message });
            return;
        }

        let added = signed.len();
        if !guard.complete(signed) {
            info!("Pool cleared during refill, discarding {added} authorizations");
            return;
        }
        {
            let mut stats = self.stats.lock();
            stats.batches_completed += 1;
            stats.entries_added += added as u64;
        }

        info!("Signature pool refilled with {added} authorizations ({failed} failed)");
        let _ = self.events.send(PoolEvent::RefillCompleted { added, failed });
    }
}

/// Clears the refill flag and wakes waiters however the refill ends.
///
/// The flag is cleared exactly once, in the same locked step that appends the
/// batch. Once it is clear another caller may claim the next refill, and
/// nothing here touches the flag again.
struct RefillGuard<'a> {
    shared: &'a Shared,
    generation: u64,
    finished: bool,
}

impl<'a> RefillGuard<'a> {
    fn begin(shared: &'a Shared) -> Self {
        let generation = shared.state.lock().generation;
        Self {
            shared,
            generation,
            finished: false,
        }
    }

    /// Append `batch` and end the refill. Returns `false` if the pool was
    /// cleared since the refill began and the batch was dropped.
    fn complete(mut self, batch: Vec<SignedAuthorization>) -> bool {
        let kept = {
            let mut state = self.shared.state.lock();
            let kept = state.generation == self.generation;
            if kept {
                state.entries.extend(batch);
            }
            state.refilling = false;
            kept
        };
        self.finished = true;
        kept
    }
}

impl Drop for RefillGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.shared.state.lock().refilling = false;
        }
        self.shared.refilled.notify_waiters();
    }
}
