//! `RocksDB` storage layer for the TCC token ledger.
//!
//! This crate provides persistent storage for accounts, ledger
//! transactions, spend tokens, anti-replay nonces, shop accruals, and
//! reimbursement batches, using `RocksDB` with column families.
//!
//! # Architecture
//!
//! - `accounts`: wallet balances with optimistic-concurrency versions
//! - `transactions` / `transactions_by_account`: append-only journal + index
//! - `idempotency`: (account, idempotency key) -> committed transaction id
//! - `tokens`: spend-token lifecycle records
//! - `nonces`: persisted anti-replay table (first-use timestamps)
//! - `shop_accruals` / `batches` / `batches_by_shop`: reimbursement state
//! - `reward_config`: the single active `RewardRuleConfig`
//!
//! Compound operations (`apply_transaction`, `redeem_token`,
//! `create_batch`, `mark_batch_failed`) commit all of their writes in one
//! `WriteBatch`, so a crash can never leave a token redeemed without its
//! debit or a batch created without the accrual reset.
//!
//! # Example
//!
//! ```no_run
//! use tcc_store::{RocksStore, Store};
//! use tcc_core::{Account, AccountId, TransactionKind};
//!
//! let store = RocksStore::open("/tmp/tcc-ledger-db").unwrap();
//!
//! let account_id = AccountId::generate();
//! store.put_account(&Account::new(account_id)).unwrap();
//!
//! let applied = store
//!     .apply_transaction(&account_id, TransactionKind::Earn, 24, Some(1000), "earn:abc")
//!     .unwrap();
//! assert_eq!(applied.new_balance, 24);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use chrono::{DateTime, Utc};

use tcc_core::{
    Account, AccountId, BatchId, LedgerTransaction, ReimbursementBatch, RewardRuleConfig,
    ShopAccrual, ShopId, SpendToken, TokenId, TransactionId, TransactionKind,
};

/// Outcome of `Store::apply_transaction`.
#[derive(Debug, Clone)]
pub struct AppliedTransaction {
    /// The committed journal entry (the original one when replayed).
    pub transaction: LedgerTransaction,

    /// Account balance after the operation.
    pub new_balance: i64,

    /// True when the idempotency key had already been committed and the
    /// balance delta was therefore not re-applied.
    pub replayed: bool,
}

/// Outcome of `Store::redeem_token`.
#[derive(Debug, Clone)]
pub struct RedeemOutcome {
    /// The spend journal entry created by the redemption.
    pub transaction: LedgerTransaction,

    /// Citizen balance after the debit.
    pub new_balance: i64,

    /// TCC credited to the shop's pending accrual.
    pub shop_credit: i64,
}

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Insert or update an account record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_account(&self, account: &Account) -> Result<()>;

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>>;

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    /// Apply a ledger transaction atomically and idempotently.
    ///
    /// If `idempotency_key` has already been committed for this account the
    /// previously created transaction is returned with `replayed = true`
    /// and no balance delta is re-applied. Concurrent writers are detected
    /// via the account `version` and retried a bounded number of times.
    ///
    /// `amount` is an absolute value; the sign is derived from `kind`.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidAmount` if `amount` is not positive.
    /// - `StoreError::NotFound` if the account doesn't exist.
    /// - `StoreError::InsufficientBalance` if a spend exceeds the balance.
    /// - `StoreError::Conflict` if version retries are exhausted.
    fn apply_transaction(
        &self,
        account_id: &AccountId,
        kind: TransactionKind,
        amount: i64,
        euro_cents: Option<i64>,
        idempotency_key: &str,
    ) -> Result<AppliedTransaction>;

    /// Get a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, transaction_id: &TransactionId)
        -> Result<Option<LedgerTransaction>>;

    /// List transactions for an account, ordered by time (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_account(
        &self,
        account_id: &AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerTransaction>>;

    // =========================================================================
    // Spend-Token Operations
    // =========================================================================

    /// Persist a newly issued spend token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_token(&self, token: &SpendToken) -> Result<()>;

    /// Get a spend token by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_token(&self, token_id: &TokenId) -> Result<Option<SpendToken>>;

    /// Redeem a spend token: validate status, expiry, and nonce, then in a
    /// single atomic unit mark the token redeemed, apply the ledger debit
    /// (idempotency key = token id), record the nonce, and credit the
    /// shop's pending accrual. A failed debit leaves the token `Issued`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the token doesn't exist.
    /// - `StoreError::TokenExpired` / `TokenAlreadyRedeemed`.
    /// - `StoreError::NonceMismatch` / `ReplayDetected`.
    /// - `StoreError::InsufficientBalance` propagated from the debit.
    fn redeem_token(
        &self,
        token_id: &TokenId,
        nonce: &str,
        shop_id: &ShopId,
        now: DateTime<Utc>,
    ) -> Result<RedeemOutcome>;

    /// Transition every `Issued` token past its expiry to `Expired`.
    ///
    /// Returns the number of tokens expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn expire_due_tokens(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Check whether a nonce has been recorded by the anti-replay guard.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn has_nonce(&self, nonce: &str) -> Result<bool>;

    // =========================================================================
    // Reimbursement Operations
    // =========================================================================

    /// Get a shop's accrual record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_shop_accrual(&self, shop_id: &ShopId) -> Result<Option<ShopAccrual>>;

    /// Snapshot a shop's pending accrual into a new `Pending` batch and
    /// reset the accrual to zero in the same atomic step. The euro value
    /// is floored at `tcc_per_euro`.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidAmount` if the pending accrual is zero.
    /// - `StoreError::OpenBatchExists` if a pending batch already exists.
    fn create_batch(&self, shop_id: &ShopId, tcc_per_euro: i64) -> Result<ReimbursementBatch>;

    /// Get a batch by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_batch(&self, batch_id: &BatchId) -> Result<Option<ReimbursementBatch>>;

    /// Transition a `Pending` batch to `Processed`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the batch doesn't exist.
    /// - `StoreError::BatchNotPending` if it is already terminal.
    fn mark_batch_processed(
        &self,
        batch_id: &BatchId,
        payout_reference: &str,
    ) -> Result<ReimbursementBatch>;

    /// Transition a `Pending` batch to `Failed` and restore its credits to
    /// the shop's pending accrual atomically, so they can be re-batched.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the batch doesn't exist.
    /// - `StoreError::BatchNotPending` if it is already terminal.
    fn mark_batch_failed(&self, batch_id: &BatchId, reason: &str) -> Result<ReimbursementBatch>;

    /// List batches for a shop, ordered by time (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_batches_by_shop(&self, shop_id: &ShopId) -> Result<Vec<ReimbursementBatch>>;

    // =========================================================================
    // Reward Configuration
    // =========================================================================

    /// Store the active reward rule configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_reward_config(&self, config: &RewardRuleConfig) -> Result<()>;

    /// Get the active reward rule configuration, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_reward_config(&self) -> Result<Option<RewardRuleConfig>>;
}
