//! Cryptographic utilities for spend-token signing.
//!
//! Spend tokens travel through QR codes on citizen devices, so the opaque
//! token string carries an HMAC over the token id. A terminal cannot forge
//! a token string without the service secret, and verification runs in
//! constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use tcc_core::TokenId;

type HmacSha256 = Hmac<Sha256>;

/// URI scheme prefix for signed spend-token strings.
const TOKEN_PREFIX: &str = "tcc://";

/// Compute HMAC-SHA256 and return hex-encoded result.
///
/// # Panics
///
/// This function will never panic in practice. The `expect` call is guarded
/// by the invariant that HMAC-SHA256 accepts keys of any size per RFC 2104.
#[must_use]
pub fn hmac_sha256_hex(secret: &str, message: &str) -> String {
    // INVARIANT: HMAC-SHA256 accepts keys of any size per RFC 2104, so
    // `new_from_slice` only fails if the Hmac implementation is broken.
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC-SHA256 accepts any key size");
    mac.update(message.as_bytes());
    let result = mac.finalize();

    hex::encode(result.into_bytes())
}

/// Constant-time string comparison to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Signs and verifies the opaque spend-token strings embedded in QR codes.
///
/// Format: `tcc://<token_id>.<hmac-sha256-hex>`.
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
}

impl TokenSigner {
    /// Create a signer from the configured secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Produce the signed opaque string for a token id.
    #[must_use]
    pub fn sign(&self, token_id: &TokenId) -> String {
        let id = token_id.to_string();
        let sig = hmac_sha256_hex(&self.secret, &id);
        format!("{TOKEN_PREFIX}{id}.{sig}")
    }

    /// Verify a signed token string and extract the token id.
    ///
    /// Returns `None` for any malformed or mis-signed input; callers must
    /// not distinguish the failure modes to the client.
    #[must_use]
    pub fn verify(&self, token_string: &str) -> Option<TokenId> {
        let rest = token_string.strip_prefix(TOKEN_PREFIX)?;
        let (id, sig) = rest.split_once('.')?;

        let expected = hmac_sha256_hex(&self.secret, id);
        if !constant_time_eq(&expected, sig) {
            return None;
        }

        id.parse().ok()
    }
}
