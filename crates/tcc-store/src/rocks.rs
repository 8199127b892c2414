//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store`
//! trait. Compound operations serialize through a writer lock and commit
//! through a single `WriteBatch`; the account `version` field provides a
//! compare-and-swap so a stale read outside the lock is detected and
//! retried rather than applied.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use tcc_core::{
    Account, AccountId, BatchId, BatchStatus, LedgerTransaction, ReimbursementBatch,
    RewardRuleConfig, ShopAccrual, ShopId, SpendToken, TokenId, TokenStatus, TransactionId,
    TransactionKind,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{AppliedTransaction, RedeemOutcome, Store};

/// How many times a stale-version read is retried before `Conflict`.
const MAX_COMMIT_RETRIES: usize = 3;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    // Serializes compound read-modify-write commits. Held only around
    // local RocksDB access, never across external I/O.
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Database("writer lock poisoned".into()))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Look up the transaction previously committed for an idempotency key.
    fn lookup_idempotent(
        &self,
        account_id: &AccountId,
        idempotency_key: &str,
    ) -> Result<Option<LedgerTransaction>> {
        let cf_idem = self.cf(cf::IDEMPOTENCY)?;
        let key = keys::idempotency_key(account_id, idempotency_key);

        let Some(value) = self
            .db
            .get_cf(&cf_idem, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let bytes: [u8; 16] = value.as_slice().try_into().map_err(|_| {
            StoreError::Serialization("idempotency record is not a 16-byte id".into())
        })?;
        let tx_id = TransactionId::from_bytes(bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.get_transaction(&tx_id)?
            .ok_or_else(|| {
                StoreError::Database(format!(
                    "idempotency record points at missing transaction {tx_id}"
                ))
            })
            .map(Some)
    }

    /// Stage the full set of writes for one committed ledger transaction.
    fn stage_ledger_commit(
        &self,
        batch: &mut WriteBatch,
        account: &Account,
        transaction: &LedgerTransaction,
    ) -> Result<()> {
        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_tx_by_account = self.cf(cf::TRANSACTIONS_BY_ACCOUNT)?;
        let cf_idem = self.cf(cf::IDEMPOTENCY)?;

        batch.put_cf(
            &cf_accounts,
            keys::account_key(&account.account_id),
            Self::serialize(account)?,
        );
        batch.put_cf(
            &cf_tx,
            keys::transaction_key(&transaction.id),
            Self::serialize(transaction)?,
        );
        batch.put_cf(
            &cf_tx_by_account,
            keys::account_transaction_key(&account.account_id, &transaction.id),
            [], // Index entry (empty value)
        );
        batch.put_cf(
            &cf_idem,
            keys::idempotency_key(&account.account_id, &transaction.idempotency_key),
            transaction.id.to_bytes(),
        );

        Ok(())
    }

    /// Apply a balance delta to an account, bumping the version.
    fn advance_account(account: &mut Account, delta: i64) {
        account.balance += delta;
        account.version += 1;
        if delta > 0 {
            account.lifetime_earned += delta;
        } else {
            account.lifetime_spent += -delta;
        }
        account.updated_at = Utc::now();
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Account Operations
    // =========================================================================

    fn put_account(&self, account: &Account) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(&account.account_id);
        let value = Self::serialize(account)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(account_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    fn apply_transaction(
        &self,
        account_id: &AccountId,
        kind: TransactionKind,
        amount: i64,
        euro_cents: Option<i64>,
        idempotency_key: &str,
    ) -> Result<AppliedTransaction> {
        if amount <= 0 {
            return Err(StoreError::InvalidAmount(format!(
                "transaction amount must be positive, got {amount}"
            )));
        }

        for _ in 0..MAX_COMMIT_RETRIES {
            // Snapshot read outside the lock; the version check below
            // detects a concurrent commit in between.
            let snapshot = self.get_account(account_id)?.ok_or(StoreError::NotFound {
                entity: "account",
                id: account_id.to_string(),
            })?;

            if let Some(tx) = self.lookup_idempotent(account_id, idempotency_key)? {
                return Ok(AppliedTransaction {
                    transaction: tx,
                    new_balance: snapshot.balance,
                    replayed: true,
                });
            }

            if kind.is_debit() && snapshot.balance < amount {
                return Err(StoreError::InsufficientBalance {
                    balance: snapshot.balance,
                    required: amount,
                });
            }

            let _guard = self.write_guard()?;
            let mut account = self.get_account(account_id)?.ok_or(StoreError::NotFound {
                entity: "account",
                id: account_id.to_string(),
            })?;
            if account.version != snapshot.version {
                // Lost the race; re-read and re-validate.
                continue;
            }

            let transaction = match kind {
                TransactionKind::Earn => LedgerTransaction::earn(
                    *account_id,
                    amount,
                    euro_cents,
                    idempotency_key.to_string(),
                ),
                TransactionKind::Spend => LedgerTransaction::spend(
                    *account_id,
                    amount,
                    euro_cents,
                    idempotency_key.to_string(),
                ),
                TransactionKind::Refund => LedgerTransaction::refund(
                    *account_id,
                    amount,
                    euro_cents,
                    idempotency_key.to_string(),
                ),
            };

            Self::advance_account(&mut account, transaction.amount);

            let mut batch = WriteBatch::default();
            self.stage_ledger_commit(&mut batch, &account, &transaction)?;
            self.db
                .write(batch)
                .map_err(|e| StoreError::Database(e.to_string()))?;

            return Ok(AppliedTransaction {
                transaction,
                new_balance: account.balance,
                replayed: false,
            });
        }

        Err(StoreError::Conflict {
            account_id: account_id.to_string(),
        })
    }

    fn get_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<LedgerTransaction>> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        let key = keys::transaction_key(transaction_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_transactions_by_account(
        &self,
        account_id: &AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LedgerTransaction>> {
        let cf_by_account = self.cf(cf::TRANSACTIONS_BY_ACCOUNT)?;
        let prefix = keys::account_transactions_prefix(account_id);

        let iter = self.db.iterator_cf(
            &cf_by_account,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // Collect all matching keys first; ULIDs are time-ordered, so the
        // prefix range is already chronological.
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            all_keys.push(key.to_vec());
        }

        // Reverse to get newest first.
        all_keys.reverse();

        let mut transactions = Vec::new();
        for key in all_keys.into_iter().skip(offset) {
            if transactions.len() >= limit {
                break;
            }

            let tx_id = keys::extract_transaction_id_from_account_key(&key);
            if let Some(tx) = self.get_transaction(&tx_id)? {
                transactions.push(tx);
            }
        }

        Ok(transactions)
    }

    // =========================================================================
    // Spend-Token Operations
    // =========================================================================

    fn put_token(&self, token: &SpendToken) -> Result<()> {
        let cf = self.cf(cf::TOKENS)?;
        let key = keys::token_key(&token.token_id);
        let value = Self::serialize(token)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_token(&self, token_id: &TokenId) -> Result<Option<SpendToken>> {
        let cf = self.cf(cf::TOKENS)?;
        let key = keys::token_key(token_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn redeem_token(
        &self,
        token_id: &TokenId,
        nonce: &str,
        shop_id: &ShopId,
        now: DateTime<Utc>,
    ) -> Result<RedeemOutcome> {
        let _guard = self.write_guard()?;

        let mut token = self.get_token(token_id)?.ok_or(StoreError::NotFound {
            entity: "token",
            id: token_id.to_string(),
        })?;

        match token.status {
            TokenStatus::Redeemed => {
                return Err(StoreError::TokenAlreadyRedeemed {
                    token_id: token_id.to_string(),
                })
            }
            TokenStatus::Expired => {
                return Err(StoreError::TokenExpired {
                    token_id: token_id.to_string(),
                })
            }
            TokenStatus::Issued => {}
        }

        if token.is_expired(now) {
            // The sweep has not caught it yet; persist the transition so
            // the terminal state is durable.
            token.status = TokenStatus::Expired;
            self.put_token(&token)?;
            return Err(StoreError::TokenExpired {
                token_id: token_id.to_string(),
            });
        }

        if token.nonce != nonce {
            return Err(StoreError::NonceMismatch {
                token_id: token_id.to_string(),
            });
        }

        if self.has_nonce(nonce)? {
            return Err(StoreError::ReplayDetected);
        }

        let mut account =
            self.get_account(&token.account_id)?
                .ok_or(StoreError::NotFound {
                    entity: "account",
                    id: token.account_id.to_string(),
                })?;

        // The binding balance check. On failure the token stays Issued so
        // the operation can be legitimately retried or expire normally.
        if account.balance < token.tcc_amount {
            return Err(StoreError::InsufficientBalance {
                balance: account.balance,
                required: token.tcc_amount,
            });
        }

        let transaction = LedgerTransaction::spend(
            token.account_id,
            token.tcc_amount,
            Some(token.euro_cents),
            token.token_id.to_string(),
        );
        Self::advance_account(&mut account, transaction.amount);

        token.status = TokenStatus::Redeemed;

        let mut accrual = self
            .get_shop_accrual(shop_id)?
            .unwrap_or_else(|| ShopAccrual::new(*shop_id));
        accrual.pending += token.tcc_amount;
        accrual.lifetime_earned += token.tcc_amount;
        accrual.updated_at = Utc::now();

        let cf_tokens = self.cf(cf::TOKENS)?;
        let cf_nonces = self.cf(cf::NONCES)?;
        let cf_accruals = self.cf(cf::SHOP_ACCRUALS)?;

        // Token transition, nonce record, ledger debit, and shop accrual
        // commit as one unit; the token is never Redeemed without its debit.
        let mut batch = WriteBatch::default();
        self.stage_ledger_commit(&mut batch, &account, &transaction)?;
        batch.put_cf(
            &cf_tokens,
            keys::token_key(&token.token_id),
            Self::serialize(&token)?,
        );
        batch.put_cf(
            &cf_nonces,
            keys::nonce_key(nonce),
            now.to_rfc3339().as_bytes(),
        );
        batch.put_cf(
            &cf_accruals,
            keys::shop_accrual_key(shop_id),
            Self::serialize(&accrual)?,
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(RedeemOutcome {
            transaction,
            new_balance: account.balance,
            shop_credit: token.tcc_amount,
        })
    }

    fn expire_due_tokens(&self, now: DateTime<Utc>) -> Result<usize> {
        let _guard = self.write_guard()?;
        let cf_tokens = self.cf(cf::TOKENS)?;

        let mut batch = WriteBatch::default();
        let mut expired = 0;

        for item in self.db.iterator_cf(&cf_tokens, IteratorMode::Start) {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let mut token: SpendToken = Self::deserialize(&value)?;

            if token.status == TokenStatus::Issued && token.is_expired(now) {
                token.status = TokenStatus::Expired;
                batch.put_cf(&cf_tokens, key, Self::serialize(&token)?);
                expired += 1;
            }
        }

        if expired > 0 {
            self.db
                .write(batch)
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        Ok(expired)
    }

    fn has_nonce(&self, nonce: &str) -> Result<bool> {
        let cf = self.cf(cf::NONCES)?;
        let key = keys::nonce_key(nonce);

        let exists = self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();

        Ok(exists)
    }

    // =========================================================================
    // Reimbursement Operations
    // =========================================================================

    fn get_shop_accrual(&self, shop_id: &ShopId) -> Result<Option<ShopAccrual>> {
        let cf = self.cf(cf::SHOP_ACCRUALS)?;
        let key = keys::shop_accrual_key(shop_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn create_batch(&self, shop_id: &ShopId, tcc_per_euro: i64) -> Result<ReimbursementBatch> {
        let _guard = self.write_guard()?;

        let mut accrual = self
            .get_shop_accrual(shop_id)?
            .unwrap_or_else(|| ShopAccrual::new(*shop_id));

        if accrual.pending <= 0 {
            return Err(StoreError::InvalidAmount(format!(
                "shop {shop_id} has no pending accrual to batch"
            )));
        }

        // A shop's credits may belong to at most one open batch at a time.
        for existing in self.list_batches_by_shop(shop_id)? {
            if existing.status == BatchStatus::Pending {
                return Err(StoreError::OpenBatchExists {
                    shop_id: shop_id.to_string(),
                });
            }
        }

        let credits = accrual.pending;
        let euro_cents = if tcc_per_euro > 0 {
            credits * 100 / tcc_per_euro
        } else {
            0
        };
        let reimbursement = ReimbursementBatch::new(*shop_id, credits, euro_cents);

        accrual.pending = 0;
        accrual.updated_at = Utc::now();

        let cf_batches = self.cf(cf::BATCHES)?;
        let cf_by_shop = self.cf(cf::BATCHES_BY_SHOP)?;
        let cf_accruals = self.cf(cf::SHOP_ACCRUALS)?;

        // Snapshot and reset commit together to avoid double-counting in a
        // subsequent batch.
        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_batches,
            keys::batch_key(&reimbursement.batch_id),
            Self::serialize(&reimbursement)?,
        );
        batch.put_cf(
            &cf_by_shop,
            keys::shop_batch_key(shop_id, &reimbursement.batch_id),
            [],
        );
        batch.put_cf(
            &cf_accruals,
            keys::shop_accrual_key(shop_id),
            Self::serialize(&accrual)?,
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(reimbursement)
    }

    fn get_batch(&self, batch_id: &BatchId) -> Result<Option<ReimbursementBatch>> {
        let cf = self.cf(cf::BATCHES)?;
        let key = keys::batch_key(batch_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn mark_batch_processed(
        &self,
        batch_id: &BatchId,
        payout_reference: &str,
    ) -> Result<ReimbursementBatch> {
        let _guard = self.write_guard()?;

        let mut reimbursement = self.get_batch(batch_id)?.ok_or(StoreError::NotFound {
            entity: "batch",
            id: batch_id.to_string(),
        })?;

        if reimbursement.status != BatchStatus::Pending {
            return Err(StoreError::BatchNotPending {
                batch_id: batch_id.to_string(),
            });
        }

        reimbursement.status = BatchStatus::Processed;
        reimbursement.payout_reference = Some(payout_reference.to_string());
        reimbursement.processed_at = Some(Utc::now());

        let cf_batches = self.cf(cf::BATCHES)?;
        self.db
            .put_cf(
                &cf_batches,
                keys::batch_key(batch_id),
                Self::serialize(&reimbursement)?,
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(reimbursement)
    }

    fn mark_batch_failed(&self, batch_id: &BatchId, reason: &str) -> Result<ReimbursementBatch> {
        let _guard = self.write_guard()?;

        let mut reimbursement = self.get_batch(batch_id)?.ok_or(StoreError::NotFound {
            entity: "batch",
            id: batch_id.to_string(),
        })?;

        if reimbursement.status != BatchStatus::Pending {
            return Err(StoreError::BatchNotPending {
                batch_id: batch_id.to_string(),
            });
        }

        reimbursement.status = BatchStatus::Failed;
        reimbursement.failure_reason = Some(reason.to_string());
        reimbursement.processed_at = Some(Utc::now());

        // Restore the snapshotted credits so they are not lost and can be
        // included in a future batch.
        let mut accrual = self
            .get_shop_accrual(&reimbursement.shop_id)?
            .unwrap_or_else(|| ShopAccrual::new(reimbursement.shop_id));
        accrual.pending += reimbursement.credits_included;
        accrual.updated_at = Utc::now();

        let cf_batches = self.cf(cf::BATCHES)?;
        let cf_accruals = self.cf(cf::SHOP_ACCRUALS)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_batches,
            keys::batch_key(batch_id),
            Self::serialize(&reimbursement)?,
        );
        batch.put_cf(
            &cf_accruals,
            keys::shop_accrual_key(&reimbursement.shop_id),
            Self::serialize(&accrual)?,
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(reimbursement)
    }

    fn list_batches_by_shop(&self, shop_id: &ShopId) -> Result<Vec<ReimbursementBatch>> {
        let cf_by_shop = self.cf(cf::BATCHES_BY_SHOP)?;
        let prefix = keys::shop_batches_prefix(shop_id);

        let iter = self.db.iterator_cf(
            &cf_by_shop,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            all_keys.push(key.to_vec());
        }

        all_keys.reverse();

        let mut batches = Vec::new();
        for key in all_keys {
            let batch_id = keys::extract_batch_id_from_shop_key(&key);
            if let Some(b) = self.get_batch(&batch_id)? {
                batches.push(b);
            }
        }

        Ok(batches)
    }

    // =========================================================================
    // Reward Configuration
    // =========================================================================

    fn put_reward_config(&self, config: &RewardRuleConfig) -> Result<()> {
        let cf = self.cf(cf::REWARD_CONFIG)?;
        let value = Self::serialize(config)?;

        self.db
            .put_cf(&cf, keys::REWARD_CONFIG_KEY, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_reward_config(&self) -> Result<Option<RewardRuleConfig>> {
        let cf = self.cf(cf::REWARD_CONFIG)?;

        self.db
            .get_cf(&cf, keys::REWARD_CONFIG_KEY)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }
}
