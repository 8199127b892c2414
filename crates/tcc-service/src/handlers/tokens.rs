//! Spend-token issuance and redemption handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use tcc_core::{ShopId, SpendToken};
use tcc_store::Store;

use crate::auth::{AuthCitizen, ServiceAuth};
use crate::error::ApiError;
use crate::state::AppState;

/// Token issuance request.
#[derive(Debug, Deserialize)]
pub struct IssueTokenRequest {
    /// Purchase amount in euro cents.
    pub euro_cents: i64,
}

/// Token issuance response.
#[derive(Debug, Serialize)]
pub struct IssueTokenResponse {
    /// The signed opaque token string (QR payload).
    pub token: String,
    /// Single-use nonce; the terminal must present it at redemption.
    pub nonce: String,
    /// TCC reserved by the token (euro amount, ceiling-rounded).
    pub tcc_amount: i64,
    /// Expiry timestamp.
    pub expires_at: String,
}

/// Issue a signed single-use spend token for the authenticated citizen.
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    auth: AuthCitizen,
    Json(body): Json<IssueTokenRequest>,
) -> Result<Json<IssueTokenResponse>, ApiError> {
    if body.euro_cents <= 0 {
        return Err(ApiError::BadRequest(format!(
            "euro_cents must be positive, got {}",
            body.euro_cents
        )));
    }

    let config = state.reward_config()?;
    let tcc_amount = config.euro_to_tcc_ceil(body.euro_cents)?;
    if tcc_amount <= 0 {
        return Err(ApiError::BadRequest(
            "conversion rate yields a zero-value token".into(),
        ));
    }

    let account = state
        .store
        .get_account(&auth.account_id)?
        .ok_or_else(|| ApiError::NotFound("account not found".into()))?;

    // Non-binding pre-check: the balance can still change before
    // redemption, where the binding check runs.
    if account.balance < tcc_amount {
        return Err(ApiError::InsufficientBalance {
            balance: account.balance,
            required: tcc_amount,
        });
    }

    let token = SpendToken::issue(
        auth.account_id,
        tcc_amount,
        body.euro_cents,
        Duration::seconds(state.config.token_ttl_seconds),
    );
    state.store.put_token(&token)?;

    tracing::info!(
        account_id = %auth.account_id,
        token_id = %token.token_id,
        tcc_amount = %tcc_amount,
        euro_cents = %body.euro_cents,
        expires_at = %token.expires_at,
        "Spend token issued"
    );

    Ok(Json(IssueTokenResponse {
        token: state.signer.sign(&token.token_id),
        nonce: token.nonce,
        tcc_amount,
        expires_at: token.expires_at.to_rfc3339(),
    }))
}

/// Token redemption request (from a merchant terminal).
#[derive(Debug, Deserialize)]
pub struct RedeemTokenRequest {
    /// The signed opaque token string scanned from the QR code.
    pub token: String,
    /// The single-use nonce presented alongside the token.
    pub nonce: String,
    /// The redeeming shop.
    pub shop_id: String,
}

/// Token redemption response.
#[derive(Debug, Serialize)]
pub struct RedeemTokenResponse {
    /// Citizen balance after the debit.
    pub new_balance: i64,
    /// TCC transferred to the shop.
    pub tcc_amount: i64,
    /// The spend journal entry id.
    pub transaction_id: String,
}

/// Redeem a spend token, debiting the citizen and crediting the shop.
pub async fn redeem_token(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Json(body): Json<RedeemTokenRequest>,
) -> Result<Json<RedeemTokenResponse>, ApiError> {
    let shop_id: ShopId = body
        .shop_id
        .parse()
        .map_err(|_| ApiError::BadRequest("invalid shop_id".into()))?;

    // A bad signature, an unknown id, and a nonce mismatch all surface as
    // the same error; the terminal learns nothing about which check failed.
    let token_id = state
        .signer
        .verify(&body.token)
        .ok_or(ApiError::TokenNotRedeemable)?;

    let outcome = state
        .store
        .redeem_token(&token_id, &body.nonce, &shop_id, Utc::now())?;

    tracing::info!(
        token_id = %token_id,
        shop_id = %shop_id,
        service = %auth.service_name,
        tcc_amount = %outcome.shop_credit,
        "Spend token redeemed"
    );

    Ok(Json(RedeemTokenResponse {
        new_balance: outcome.new_balance,
        tcc_amount: outcome.shop_credit,
        transaction_id: outcome.transaction.id.to_string(),
    }))
}
