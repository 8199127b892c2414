//! Client error types.

/// Errors that can occur when using the TCC ledger client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Insufficient TCC balance.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// The spend token could not be validated (unknown, mis-signed, or
    /// wrong nonce; the server does not say which).
    #[error("token not redeemable")]
    TokenNotRedeemable,

    /// The spend token is past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// The spend token was already redeemed.
    #[error("token already redeemed")]
    TokenAlreadyRedeemed,

    /// A single-use nonce was presented a second time.
    #[error("replay detected")]
    ReplayDetected,
}
