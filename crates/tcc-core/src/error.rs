//! Error types for TCC ledger operations.

use crate::ids::IdError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger, token, and reimbursement operations.
///
/// Every validation failure carries a specific kind so callers can present
/// precise messages; none of these are retried automatically except
/// `Conflict`, which the store retries a bounded number of times before
/// surfacing.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The transaction amount is zero or has the wrong sign for its kind.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A spend would drive the balance negative.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance in TCC.
        balance: i64,
        /// Required amount in TCC.
        required: i64,
    },

    /// The spend token is past its expiry.
    #[error("token expired: {token_id}")]
    TokenExpired {
        /// The expired token.
        token_id: String,
    },

    /// The spend token was already redeemed.
    #[error("token already redeemed: {token_id}")]
    TokenAlreadyRedeemed {
        /// The token that was replayed.
        token_id: String,
    },

    /// The presented nonce does not match the one bound to the token.
    #[error("nonce mismatch for token {token_id}")]
    NonceMismatch {
        /// The token whose nonce did not match.
        token_id: String,
    },

    /// A nonce was presented a second time.
    #[error("replay detected: nonce already used")]
    ReplayDetected,

    /// Optimistic-concurrency retries were exhausted.
    #[error("conflict: concurrent update on account {account_id}")]
    Conflict {
        /// The contended account.
        account_id: String,
    },

    /// No active reward rule configuration is available.
    #[error("reward rule configuration unavailable")]
    ConfigUnavailable,

    /// Account not found.
    #[error("account not found: {account_id}")]
    AccountNotFound {
        /// The account that was not found.
        account_id: String,
    },

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
