//! Request and response types for the TCC ledger API.

use serde::{Deserialize, Serialize};

use tcc_core::EarnEvent;

/// Earn-event request.
#[derive(Debug, Clone, Serialize)]
pub struct EarnRequest {
    /// The citizen account to credit.
    pub account_id: String,
    /// The qualifying action.
    pub event: EarnEvent,
    /// Caller-provided idempotency key (e.g. the receipt or report id).
    pub idempotency_key: String,
}

/// Earn-event response.
#[derive(Debug, Clone, Deserialize)]
pub struct EarnResponse {
    /// TCC credited for the event.
    pub tcc_awarded: i64,
    /// Balance after the credit.
    pub new_balance: i64,
    /// The journal entry id, absent when the event awarded zero TCC.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// True when the idempotency key had already been committed.
    pub replayed: bool,
}

/// Token issuance request.
#[derive(Debug, Clone, Serialize)]
pub struct IssueTokenRequest {
    /// Purchase amount in euro cents.
    pub euro_cents: i64,
}

/// Token issuance response.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueTokenResponse {
    /// The signed opaque token string (QR payload).
    pub token: String,
    /// Single-use nonce to present at redemption.
    pub nonce: String,
    /// TCC reserved by the token.
    pub tcc_amount: i64,
    /// Expiry timestamp (RFC 3339).
    pub expires_at: String,
}

/// Token redemption request.
#[derive(Debug, Clone, Serialize)]
pub struct RedeemTokenRequest {
    /// The signed opaque token string scanned from the QR code.
    pub token: String,
    /// The single-use nonce.
    pub nonce: String,
    /// The redeeming shop.
    pub shop_id: String,
}

/// Token redemption response.
#[derive(Debug, Clone, Deserialize)]
pub struct RedeemTokenResponse {
    /// Citizen balance after the debit.
    pub new_balance: i64,
    /// TCC transferred to the shop.
    pub tcc_amount: i64,
    /// The spend journal entry id.
    pub transaction_id: String,
}

/// Wallet account response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    /// The wallet account ID.
    pub account_id: String,
    /// Current balance in TCC.
    pub balance: i64,
    /// Total TCC ever earned.
    pub lifetime_earned: i64,
    /// Total TCC ever spent.
    pub lifetime_spent: i64,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

/// Shop accrual response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccrualResponse {
    /// The shop ID.
    pub shop_id: String,
    /// TCC redeemed at the shop but not yet batched.
    pub pending: i64,
    /// Total TCC ever redeemed at the shop.
    pub lifetime_earned: i64,
}

/// Reimbursement batch response.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchResponse {
    /// The batch ID.
    pub batch_id: String,
    /// The shop being reimbursed.
    pub shop_id: String,
    /// TCC snapshotted into the batch.
    pub credits_included: i64,
    /// Euro payout value in cents.
    pub euro_cents: i64,
    /// Batch status (pending / processed / failed).
    pub status: String,
    /// Bank payout reference, once processed.
    #[serde(default)]
    pub payout_reference: Option<String>,
    /// Failure reason, when failed.
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// List of reimbursement batches.
#[derive(Debug, Clone, Deserialize)]
pub struct ListBatchesResponse {
    /// Batches (newest first).
    pub batches: Vec<BatchResponse>,
}

/// API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// The error payload.
    pub error: ApiErrorBody,
}

/// API error payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Optional structured details.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
