//! Earn-event ingestion handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use tcc_core::{compute_earn_amount, AccountId, EarnEvent, TransactionKind};
use tcc_store::Store;

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Earn-event request.
#[derive(Debug, Deserialize)]
pub struct EarnRequest {
    /// The citizen account to credit.
    pub account_id: String,
    /// The qualifying action.
    pub event: EarnEvent,
    /// Caller-provided idempotency key (e.g. the receipt or report id).
    pub idempotency_key: String,
}

/// Earn-event response.
#[derive(Debug, Serialize)]
pub struct EarnResponse {
    /// TCC credited for the event.
    pub tcc_awarded: i64,
    /// Balance after the credit.
    pub new_balance: i64,
    /// The journal entry id, absent when the event awarded zero TCC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// True when the idempotency key had already been committed.
    pub replayed: bool,
}

/// Ingest an earn event and credit the computed TCC reward.
pub async fn report_earn(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Json(body): Json<EarnRequest>,
) -> Result<Json<EarnResponse>, ApiError> {
    let account_id: AccountId = body
        .account_id
        .parse()
        .map_err(|_| ApiError::BadRequest("invalid account_id".into()))?;

    if body.idempotency_key.is_empty() {
        return Err(ApiError::BadRequest("idempotency_key is required".into()));
    }

    let config = state.reward_config()?;
    let amount = compute_earn_amount(&body.event, &config)?;

    let euro_cents = match &body.event {
        EarnEvent::Purchase { euro_cents, .. } => Some(*euro_cents),
        EarnEvent::CheckIn { .. } | EarnEvent::CivicReport => None,
    };

    // A fully boosted-down event can legitimately award zero; there is
    // nothing to journal in that case.
    if amount == 0 {
        let account = state
            .store
            .get_account(&account_id)?
            .ok_or_else(|| ApiError::NotFound(format!("account not found: {account_id}")))?;

        return Ok(Json(EarnResponse {
            tcc_awarded: 0,
            new_balance: account.balance,
            transaction_id: None,
            replayed: false,
        }));
    }

    let applied = state.store.apply_transaction(
        &account_id,
        TransactionKind::Earn,
        amount,
        euro_cents,
        &body.idempotency_key,
    )?;

    tracing::info!(
        account_id = %account_id,
        service = %auth.service_name,
        tcc_awarded = %amount,
        config_version = %config.version,
        replayed = %applied.replayed,
        "Earn event processed"
    );

    Ok(Json(EarnResponse {
        tcc_awarded: applied.transaction.amount,
        new_balance: applied.new_balance,
        transaction_id: Some(applied.transaction.id.to_string()),
        replayed: applied.replayed,
    }))
}
