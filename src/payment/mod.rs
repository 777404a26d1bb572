//! Payment authorization pool for sigpool.
//!
//! This module keeps co-signed payment authorizations ready ahead of demand:
//! 1. Serve the oldest pooled authorization if there is one
//! 2. Otherwise refill the pool with one batch of concurrent signing requests
//! 3. Fall back to a direct signing request if the refill does not land in time
//!
//! # Architecture
//!
//! ```text
//! acquire() called
//!        │
//!        ▼
//! ┌─────────────────────┐
//! │ Check pool          │
//! └─────────┬───────────┘
//!           │
//!    ┌──────┴──────┐
//!    │             │
//!  ENTRY         EMPTY
//!    │             │
//!    ▼             ▼
//!  Serve      Start refill (once)
//!  oldest          │
//!           ┌──────┴──────┐
//!           │             │
//!       LANDED       TIMED OUT / DRAINED
//!           │             │
//!           ▼             ▼
//!     Serve entry   Direct signing request
//! ```

mod pool;
mod signer;
mod types;

pub use pool::{PoolStats, SignaturePool};
pub use signer::{AuthorizationSource, RestakerSigner};
pub use types::{
    PaymentTarget, SignRequest, SignResponse, SignedAuthorization, DEFAULT_AMOUNT,
    DEFAULT_CHAIN_ID, DEFAULT_SERVICE, RESTAKER_PAYMENT_HEADER, USER_PAYMENT_HEADER,
};
