//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - invalid state transition or concurrent update.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Insufficient TCC balance.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// The spend token cannot be redeemed. Covers unknown tokens, bad
    /// signatures, and nonce mismatches with one indistinguishable
    /// response, so a caller cannot probe for valid token ids.
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

    /// No active reward configuration.
    #[error("reward configuration unavailable")]
    ConfigUnavailable,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::InsufficientBalance { balance, required } => (
                StatusCode::PAYMENT_REQUIRED,
                "insufficient_balance",
                self.to_string(),
                Some(serde_json::json!({
                    "balance": balance,
                    "required": required
                })),
            ),
            Self::TokenNotRedeemable => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "token_not_redeemable",
                self.to_string(),
                None,
            ),
            Self::TokenExpired => (StatusCode::GONE, "token_expired", self.to_string(), None),
            Self::TokenAlreadyRedeemed => (
                StatusCode::CONFLICT,
                "token_already_redeemed",
                self.to_string(),
                None,
            ),
            Self::ReplayDetected => (
                StatusCode::CONFLICT,
                "replay_detected",
                self.to_string(),
                None,
            ),
            Self::ConfigUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "config_unavailable",
                self.to_string(),
                None,
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<tcc_store::StoreError> for ApiError {
    fn from(err: tcc_store::StoreError) -> Self {
        use tcc_store::StoreError;

        match err {
            // Unknown tokens map to the same response as a nonce mismatch.
            StoreError::NotFound { entity: "token", .. } | StoreError::NonceMismatch { .. } => {
                Self::TokenNotRedeemable
            }
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{entity} not found: {id}")),
            StoreError::InvalidAmount(msg) => Self::BadRequest(msg),
            StoreError::InsufficientBalance { balance, required } => {
                Self::InsufficientBalance { balance, required }
            }
            StoreError::Conflict { account_id } => {
                Self::Conflict(format!("concurrent update on account {account_id}"))
            }
            StoreError::TokenExpired { .. } => Self::TokenExpired,
            StoreError::TokenAlreadyRedeemed { .. } => Self::TokenAlreadyRedeemed,
            StoreError::ReplayDetected => Self::ReplayDetected,
            StoreError::BatchNotPending { batch_id } => {
                Self::Conflict(format!("batch {batch_id} is not pending"))
            }
            StoreError::OpenBatchExists { shop_id } => {
                Self::Conflict(format!("shop {shop_id} already has an open batch"))
            }
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<tcc_core::LedgerError> for ApiError {
    fn from(err: tcc_core::LedgerError) -> Self {
        use tcc_core::LedgerError;

        match err {
            LedgerError::InvalidAmount(msg) => Self::BadRequest(msg),
            LedgerError::InsufficientBalance { balance, required } => {
                Self::InsufficientBalance { balance, required }
            }
            LedgerError::TokenExpired { .. } => Self::TokenExpired,
            LedgerError::TokenAlreadyRedeemed { .. } => Self::TokenAlreadyRedeemed,
            LedgerError::NonceMismatch { .. } => Self::TokenNotRedeemable,
            LedgerError::ReplayDetected => Self::ReplayDetected,
            LedgerError::Conflict { account_id } => {
                Self::Conflict(format!("concurrent update on account {account_id}"))
            }
            LedgerError::ConfigUnavailable => Self::ConfigUnavailable,
            LedgerError::AccountNotFound { account_id } => {
                Self::NotFound(format!("account not found: {account_id}"))
            }
            LedgerError::InvalidId(e) => Self::BadRequest(e.to_string()),
        }
    }
}
