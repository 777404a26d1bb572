//! Paywalled content access.
//!
//! The content service verifies the two payment signatures and serves the
//! gated articles. [`PaywallGate`] draws one authorization from a
//! [`SignaturePool`](crate::payment::SignaturePool) per request and turns any
//! failure into a plain "locked" outcome.

mod client;
mod gate;

pub use client::{Article, ArticleRequest, ContentClient};
pub use gate::{PaywallGate, UnlockOutcome};
