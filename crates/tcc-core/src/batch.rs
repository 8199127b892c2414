//! Reimbursement batch types.
//!
//! A batch snapshots a shop's pending accrual into a payable euro amount.
//! Batches are all-or-nothing against the external payout channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BatchId, ShopId};

/// A snapshot of a shop's accrued TCC converted into a payable euro amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReimbursementBatch {
    /// Unique batch ID (ULID for time-ordering).
    pub batch_id: BatchId,

    /// The shop being reimbursed.
    pub shop_id: ShopId,

    /// TCC credits snapshotted into this batch.
    pub credits_included: i64,

    /// Payable euro amount, in cents (floored at the conversion rate).
    pub euro_cents: i64,

    /// Current status.
    pub status: BatchStatus,

    /// External payout reference, set when processed.
    pub payout_reference: Option<String>,

    /// Failure reason, set when the payout failed.
    pub failure_reason: Option<String>,

    /// When the batch was created.
    pub created_at: DateTime<Utc>,

    /// When the batch was processed or failed.
    pub processed_at: Option<DateTime<Utc>>,
}

impl ReimbursementBatch {
    /// Create a new pending batch snapshotting `credits_included` TCC.
    #[must_use]
    pub fn new(shop_id: ShopId, credits_included: i64, euro_cents: i64) -> Self {
        Self {
            batch_id: BatchId::generate(),
            shop_id,
            credits_included,
            euro_cents,
            status: BatchStatus::Pending,
            payout_reference: None,
            failure_reason: None,
            created_at: Utc::now(),
            processed_at: None,
        }
    }
}

/// Status of a reimbursement batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Awaiting payout by the external finance process.
    Pending,

    /// Paid out. Terminal.
    Processed,

    /// Payout failed; the credits were restored to the shop's accrual.
    Failed,
}
