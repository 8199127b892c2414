//! Ledger transaction types.
//!
//! Every balance change appends one immutable journal entry. Entries are
//! never updated or deleted after commit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, TransactionId};

/// An immutable ledger journal entry.
///
/// `amount` is signed: positive for earn/refund, negative for spend. The
/// `idempotency_key` is unique per logical operation and is how the store
/// deduplicates retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Unique transaction ID (ULID for time-ordering).
    pub id: TransactionId,

    /// The account whose balance was affected.
    pub account_id: AccountId,

    /// Kind of transaction.
    pub kind: TransactionKind,

    /// Signed amount in TCC. Positive = credit, negative = debit.
    pub amount: i64,

    /// Euro value of the underlying operation, in cents, when known.
    pub euro_cents: Option<i64>,

    /// Caller-supplied key ensuring the operation is applied at most once.
    pub idempotency_key: String,

    /// When the transaction was committed.
    pub created_at: DateTime<Utc>,
}

impl LedgerTransaction {
    /// Create a new earn entry. `amount` must be positive.
    #[must_use]
    pub fn earn(
        account_id: AccountId,
        amount: i64,
        euro_cents: Option<i64>,
        idempotency_key: String,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            account_id,
            kind: TransactionKind::Earn,
            amount: amount.abs(),
            euro_cents,
            idempotency_key,
            created_at: Utc::now(),
        }
    }

    /// Create a new spend entry. The stored amount is always negative.
    #[must_use]
    pub fn spend(
        account_id: AccountId,
        amount: i64,
        euro_cents: Option<i64>,
        idempotency_key: String,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            account_id,
            kind: TransactionKind::Spend,
            amount: -amount.abs(),
            euro_cents,
            idempotency_key,
            created_at: Utc::now(),
        }
    }

    /// Create a new refund entry. `amount` must be positive.
    #[must_use]
    pub fn refund(
        account_id: AccountId,
        amount: i64,
        euro_cents: Option<i64>,
        idempotency_key: String,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            account_id,
            kind: TransactionKind::Refund,
            amount: amount.abs(),
            euro_cents,
            idempotency_key,
            created_at: Utc::now(),
        }
    }
}

/// Kind of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Credit for a qualifying civic or commerce action.
    Earn,

    /// Debit via a redeemed spend token.
    Spend,

    /// Credit reversing a prior spend.
    Refund,
}

impl TransactionKind {
    /// Check if this kind adds TCC (positive balance change).
    #[must_use]
    pub const fn is_credit(&self) -> bool {
        matches!(self, Self::Earn | Self::Refund)
    }

    /// Check if this kind removes TCC (negative balance change).
    #[must_use]
    pub const fn is_debit(&self) -> bool {
        matches!(self, Self::Spend)
    }
}
