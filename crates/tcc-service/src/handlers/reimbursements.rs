//! Shop reimbursement batch handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use tcc_core::{BatchId, ReimbursementBatch, ShopId};
use tcc_store::Store;

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Batch response.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    /// The batch ID.
    pub batch_id: String,
    /// The shop being reimbursed.
    pub shop_id: String,
    /// TCC snapshotted into the batch.
    pub credits_included: i64,
    /// Euro payout value in cents (floored at the configured rate).
    pub euro_cents: i64,
    /// Batch status.
    pub status: String,
    /// Bank payout reference, once processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout_reference: Option<String>,
    /// Failure reason, when failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Settlement timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<String>,
}

impl From<&ReimbursementBatch> for BatchResponse {
    fn from(batch: &ReimbursementBatch) -> Self {
        Self {
            batch_id: batch.batch_id.to_string(),
            shop_id: batch.shop_id.to_string(),
            credits_included: batch.credits_included,
            euro_cents: batch.euro_cents,
            status: format!("{:?}", batch.status).to_lowercase(),
            payout_reference: batch.payout_reference.clone(),
            failure_reason: batch.failure_reason.clone(),
            created_at: batch.created_at.to_rfc3339(),
            processed_at: batch.processed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Batch creation request.
#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    /// The shop whose pending accrual should be batched.
    pub shop_id: String,
}

/// Snapshot a shop's pending accrual into a new reimbursement batch.
pub async fn create_batch(
    State(state): State<Arc<AppState>>,
    auth: ServiceAuth,
    Json(body): Json<CreateBatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let shop_id: ShopId = body
        .shop_id
        .parse()
        .map_err(|_| ApiError::BadRequest("invalid shop_id".into()))?;

    let config = state.reward_config()?;
    let batch = state.store.create_batch(&shop_id, config.tcc_per_euro)?;

    tracing::info!(
        batch_id = %batch.batch_id,
        shop_id = %shop_id,
        service = %auth.service_name,
        credits = %batch.credits_included,
        euro_cents = %batch.euro_cents,
        "Reimbursement batch created"
    );

    Ok(Json(BatchResponse::from(&batch)))
}

/// Batch settlement request.
#[derive(Debug, Deserialize)]
pub struct MarkProcessedRequest {
    /// Bank transfer reference for the payout.
    pub payout_reference: String,
}

/// Mark a pending batch as paid out.
pub async fn mark_processed(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(batch_id): Path<String>,
    Json(body): Json<MarkProcessedRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let batch_id: BatchId = batch_id
        .parse()
        .map_err(|_| ApiError::BadRequest("invalid batch_id".into()))?;

    let batch = state
        .store
        .mark_batch_processed(&batch_id, &body.payout_reference)?;

    tracing::info!(
        batch_id = %batch_id,
        payout_reference = %body.payout_reference,
        "Reimbursement batch processed"
    );

    Ok(Json(BatchResponse::from(&batch)))
}

/// Batch failure request.
#[derive(Debug, Deserialize)]
pub struct MarkFailedRequest {
    /// Why the payout failed.
    pub reason: String,
}

/// Mark a pending batch as failed, restoring its credits to the shop.
pub async fn mark_failed(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(batch_id): Path<String>,
    Json(body): Json<MarkFailedRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let batch_id: BatchId = batch_id
        .parse()
        .map_err(|_| ApiError::BadRequest("invalid batch_id".into()))?;

    let batch = state.store.mark_batch_failed(&batch_id, &body.reason)?;

    tracing::warn!(
        batch_id = %batch_id,
        reason = %body.reason,
        restored_credits = %batch.credits_included,
        "Reimbursement batch failed"
    );

    Ok(Json(BatchResponse::from(&batch)))
}

/// Batch list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListBatchesQuery {
    /// The shop to list batches for.
    pub shop_id: String,
}

/// List batches response.
#[derive(Debug, Serialize)]
pub struct ListBatchesResponse {
    /// Batches (newest first).
    pub batches: Vec<BatchResponse>,
}

/// List a shop's reimbursement batches.
pub async fn list_batches(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Query(query): Query<ListBatchesQuery>,
) -> Result<Json<ListBatchesResponse>, ApiError> {
    let shop_id: ShopId = query
        .shop_id
        .parse()
        .map_err(|_| ApiError::BadRequest("invalid shop_id".into()))?;

    let batches = state.store.list_batches_by_shop(&shop_id)?;

    Ok(Json(ListBatchesResponse {
        batches: batches.iter().map(BatchResponse::from).collect(),
    }))
}

/// Shop accrual response.
#[derive(Debug, Serialize)]
pub struct AccrualResponse {
    /// The shop ID.
    pub shop_id: String,
    /// TCC redeemed at the shop but not yet batched.
    pub pending: i64,
    /// Total TCC ever redeemed at the shop.
    pub lifetime_earned: i64,
}

/// Get a shop's pending accrual.
pub async fn get_accrual(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(shop_id): Path<String>,
) -> Result<Json<AccrualResponse>, ApiError> {
    let shop_id: ShopId = shop_id
        .parse()
        .map_err(|_| ApiError::BadRequest("invalid shop_id".into()))?;

    // A shop with no redemptions yet simply has a zero accrual.
    let accrual = state.store.get_shop_accrual(&shop_id)?;

    Ok(Json(AccrualResponse {
        shop_id: shop_id.to_string(),
        pending: accrual.as_ref().map_or(0, |a| a.pending),
        lifetime_earned: accrual.as_ref().map_or(0, |a| a.lifetime_earned),
    }))
}
