//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Citizen wallet accounts, keyed by `account_id`.
    pub const ACCOUNTS: &str = "accounts";

    /// Ledger journal entries, keyed by `transaction_id` (ULID).
    pub const TRANSACTIONS: &str = "transactions";

    /// Index: transactions by account, keyed by
    /// `account_id || transaction_id`. Value is empty (index only).
    pub const TRANSACTIONS_BY_ACCOUNT: &str = "transactions_by_account";

    /// Idempotency records, keyed by `account_id || idempotency_key`.
    /// Value is the 16-byte transaction id the key committed.
    pub const IDEMPOTENCY: &str = "idempotency";

    /// Spend tokens, keyed by `token_id` (ULID).
    pub const TOKENS: &str = "tokens";

    /// Anti-replay nonce records, keyed by nonce string. Value is the
    /// first-use timestamp (RFC 3339).
    pub const NONCES: &str = "nonces";

    /// Shop pending-reimbursement accruals, keyed by `shop_id`.
    pub const SHOP_ACCRUALS: &str = "shop_accruals";

    /// Reimbursement batches, keyed by `batch_id` (ULID).
    pub const BATCHES: &str = "batches";

    /// Index: batches by shop, keyed by `shop_id || batch_id`.
    /// Value is empty (index only).
    pub const BATCHES_BY_SHOP: &str = "batches_by_shop";

    /// Active reward rule configuration (single record).
    pub const REWARD_CONFIG: &str = "reward_config";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ACCOUNTS,
        cf::TRANSACTIONS,
        cf::TRANSACTIONS_BY_ACCOUNT,
        cf::IDEMPOTENCY,
        cf::TOKENS,
        cf::NONCES,
        cf::SHOP_ACCRUALS,
        cf::BATCHES,
        cf::BATCHES_BY_SHOP,
        cf::REWARD_CONFIG,
    ]
}
