//! Spend-token types.
//!
//! A spend token is a short-lived, single-use credential authorizing a
//! debit of a fixed TCC amount. The citizen's app requests one, presents it
//! as a QR code, and the merchant terminal submits it for redemption.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, TokenId};

/// A single-use spend credential.
///
/// State machine: `Issued -> Redeemed` exactly once, or `Issued -> Expired`
/// after `expires_at`. `Redeemed` and `Expired` are terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendToken {
    /// Unique token ID (ULID for time-ordering).
    pub token_id: TokenId,

    /// The account that will be debited on redemption.
    pub account_id: AccountId,

    /// TCC amount the token authorizes.
    pub tcc_amount: i64,

    /// Euro value of the purchase, in cents.
    pub euro_cents: i64,

    /// One-time random value bound to the token. Generated server-side;
    /// a token string without its nonce (or vice versa) is not redeemable.
    pub nonce: String,

    /// When the token was issued.
    pub issued_at: DateTime<Utc>,

    /// When the token stops being redeemable.
    pub expires_at: DateTime<Utc>,

    /// Current lifecycle status.
    pub status: TokenStatus,
}

impl SpendToken {
    /// Issue a new token with a fresh server-generated nonce.
    #[must_use]
    pub fn issue(account_id: AccountId, tcc_amount: i64, euro_cents: i64, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            token_id: TokenId::generate(),
            account_id,
            tcc_amount,
            euro_cents,
            nonce: uuid::Uuid::new_v4().to_string(),
            issued_at: now,
            expires_at: now + ttl,
            status: TokenStatus::Issued,
        }
    }

    /// Check whether the token is past its expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Lifecycle status of a spend token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    /// Issued and not yet redeemed or expired.
    Issued,

    /// Redeemed against a successful ledger debit. Terminal.
    Redeemed,

    /// TTL elapsed before redemption. Terminal.
    Expired,
}
