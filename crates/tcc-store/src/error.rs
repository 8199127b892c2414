//! Error types for TCC ledger storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity kind that was looked up.
        entity: &'static str,
        /// The identifier that was not found.
        id: String,
    },

    /// The transaction amount is zero or otherwise invalid.
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

    /// Optimistic-concurrency retries exhausted on an account.
    #[error("conflict: concurrent update on account {account_id}")]
    Conflict {
        /// The contended account.
        account_id: String,
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
        /// The replayed token.
        token_id: String,
    },

    /// The presented nonce does not match the token's nonce.
    #[error("nonce mismatch for token {token_id}")]
    NonceMismatch {
        /// The token whose nonce did not match.
        token_id: String,
    },

    /// A nonce was presented a second time.
    #[error("replay detected: nonce already used")]
    ReplayDetected,

    /// The batch is not in the `Pending` state.
    #[error("batch {batch_id} is not pending")]
    BatchNotPending {
        /// The batch in a terminal state.
        batch_id: String,
    },

    /// The shop already has an open (pending) batch.
    #[error("shop {shop_id} already has an open batch")]
    OpenBatchExists {
        /// The shop with the open batch.
        shop_id: String,
    },
}
