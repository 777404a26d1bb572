//! Pool event system.

use tokio::sync::broadcast;

/// Events emitted by the signature pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    /// A refill batch was started.
    RefillStarted {
        /// Number of authorizations requested.
        batch_size: usize,
    },

    /// A refill batch finished and its entries were appended.
    RefillCompleted {
        /// Entries appended to the pool.
        added: usize,
        /// Requests in the batch that failed (non-zero only when salvaging).
        failed: usize,
    },

    /// A refill batch failed and nothing was appended.
    RefillFailed {
        /// Requests in the batch that failed.
        failed: usize,
        /// First failure reported by the batch.
        message: String,
    },

    /// An `acquire` call bypassed the pool with an on-demand request.
    FallbackUsed,
}

/// Channel for receiving pool events.
pub type PoolEventsChannel = broadcast::Receiver<PoolEvent>;

/// Sender for pool events.
pub type PoolEventsSender = broadcast::Sender<PoolEvent>;

/// Create a new event channel pair.
#[must_use]
pub fn create_event_channel() -> (PoolEventsSender, PoolEventsChannel) {
    broadcast::channel(256)
}
