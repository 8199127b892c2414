//! Account types for the TCC ledger.
//!
//! A citizen holds one `Account`; each participating shop holds one
//! `ShopAccrual` tracking TCC awaiting reimbursement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, ShopId};

/// A citizen wallet account.
///
/// `balance` is always the sum of all committed ledger transactions for the
/// account and is never negative. `version` is bumped on every balance
/// change and backs the store's compare-and-swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The account ID (from the citizen registry).
    pub account_id: AccountId,

    /// Current balance in whole TCC.
    pub balance: i64,

    /// Optimistic-concurrency counter, incremented on every balance change.
    pub version: u64,

    /// Lifetime TCC credited (earn + refund).
    pub lifetime_earned: i64,

    /// Lifetime TCC debited via spends.
    pub lifetime_spent: i64,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with zero balance.
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            balance: 0,
            version: 0,
            lifetime_earned: 0,
            lifetime_spent: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the account can cover a debit of `amount` TCC.
    #[must_use]
    pub fn has_sufficient_balance(&self, amount: i64) -> bool {
        self.balance >= amount
    }
}

/// A shop's accrued-but-unpaid TCC, awaiting reimbursement batching.
///
/// `pending` is credited on every redeemed spend token and zeroed when a
/// batch snapshots it. Conservation invariant: the sum of credits across a
/// shop's non-failed batches plus `pending` equals `lifetime_earned`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopAccrual {
    /// The shop ID (from the shop/market registry).
    pub shop_id: ShopId,

    /// TCC accrued since the last batch.
    pub pending: i64,

    /// Lifetime TCC accrued across all redemptions.
    pub lifetime_earned: i64,

    /// When the accrual was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ShopAccrual {
    /// Create a new empty accrual for a shop.
    #[must_use]
    pub fn new(shop_id: ShopId) -> Self {
        Self {
            shop_id,
            pending: 0,
            lifetime_earned: 0,
            updated_at: Utc::now(),
        }
    }
}
