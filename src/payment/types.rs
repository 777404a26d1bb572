//! Payment authorization types and the signing endpoint wire format.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Payee address every authorization is issued for by default.
pub const DEFAULT_SERVICE: &str = "0xefDD4C11efD4df6F1173150e89102D343ae50AA4";

/// Default payment amount per authorization.
pub const DEFAULT_AMOUNT: &str = "1";

/// Default settlement chain (Base Sepolia).
pub const DEFAULT_CHAIN_ID: u64 = 84_532;

/// Header carrying the user's payment signature on content requests.
pub const USER_PAYMENT_HEADER: &str = "user-payment-signature";

/// Header carrying the restaker's payment signature on content requests.
pub const RESTAKER_PAYMENT_HEADER: &str = "restaker-payment-signature";

const HASH_LEN: usize = 32;
const ADDRESS_LEN: usize = 20;

/// The (service, amount, chain id) tuple an authorization is valid for.
///
/// A pool is built for exactly one target, which makes all of its entries
/// interchangeable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTarget {
    /// Service (payee) address.
    pub service: String,
    /// Payment amount as a decimal string.
    pub amount: String,
    /// Settlement chain id.
    pub chain_id: u64,
}

impl Default for PaymentTarget {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
            amount: DEFAULT_AMOUNT.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

/// One usable payment proof, co-signed by the user and the restaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedAuthorization {
    /// Signature by the user's wallet over `message_hash`.
    pub user_signature: String,
    /// Signature by the restaker over `message_hash`.
    pub restaker_signature: String,
    /// Address of the paying user.
    pub user_address: String,
    /// Hash of the payment request both signatures attest to.
    pub message_hash: String,
    /// Address of the co-signing restaker.
    pub restaker_address: String,
}

/// Body POSTed to the signing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    /// Address of the paying user.
    pub user_address: String,
    /// Service (payee) address.
    pub service_address: String,
    /// Payment amount.
    pub amount: String,
    /// Settlement chain id, sent as a string.
    pub chain_id: String,
    /// User's standing authorization for the restaker.
    pub user_sig: String,
}

impl SignRequest {
    /// Build the request for `target` on behalf of `user_address`.
    #[must_use]
    pub fn new(target: &PaymentTarget, user_address: &str, user_sig: &str) -> Self {
        Self {
            user_address: user_address.to_string(),
            service_address: target.service.clone(),
            amount: target.amount.clone(),
            chain_id: target.chain_id.to_string(),
            user_sig: user_sig.to_string(),
        }
    }
}

/// Body returned by the signing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    /// User signature over the message hash.
    pub user_signature: String,
    /// Restaker signature over the message hash.
    pub signature: String,
    /// Address of the paying user.
    pub user_address: String,
    /// Hash of the payment request.
    pub message_hash: String,
    /// Address of the restaker.
    pub restaker: String,
}

impl SignResponse {
    /// Validate the response and convert it into a pooled authorization.
    ///
    /// # Errors
    ///
    /// Returns `Error::Signing` if any field is empty or not well-formed hex.
    pub fn into_authorization(self) -> Result<SignedAuthorization> {
        check_hex("userSignature", &self.user_signature, None)?;
        check_hex("signature", &self.signature, None)?;
        check_hex("userAddress", &self.user_address, Some(ADDRESS_LEN))?;
        check_hex("messageHash", &self.message_hash, Some(HASH_LEN))?;
        check_hex("restaker", &self.restaker, Some(ADDRESS_LEN))?;

        Ok(SignedAuthorization {
            user_signature: self.user_signature,
            restaker_signature: self.signature,
            user_address: self.user_address,
            message_hash: self.message_hash,
            restaker_address: self.restaker,
        })
    }
}

/// Checks a `0x`-prefixed hex field, optionally of an exact byte length.
fn check_hex(field: &str, value: &str, expected_len: Option<usize>) -> Result<()> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| Error::Signing(format!("malformed {field}: missing 0x prefix")))?;
    let bytes = hex::decode(digits)
        .map_err(|e| Error::Signing(format!("malformed {field}: {e}")))?;

    if bytes.is_empty() {
        return Err(Error::Signing(format!("malformed {field}: empty")));
    }
    if let Some(len) = expected_len {
        if bytes.len() != len {
            return Err(Error::Signing(format!(
                "malformed {field}: expected {len} bytes, got {}",
                bytes.len()
            )));
        }
    }
    Ok(())
}
