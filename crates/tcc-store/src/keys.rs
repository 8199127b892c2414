//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in
//! column families.

use tcc_core::{AccountId, BatchId, ShopId, TokenId, TransactionId};

/// Key under which the single active reward configuration is stored.
pub const REWARD_CONFIG_KEY: &[u8] = b"active";

/// Create an account key from an account ID.
#[must_use]
pub fn account_key(account_id: &AccountId) -> Vec<u8> {
    account_id.as_bytes().to_vec()
}

/// Create a transaction key from a transaction ID.
#[must_use]
pub fn transaction_key(transaction_id: &TransactionId) -> Vec<u8> {
    transaction_id.to_bytes().to_vec()
}

/// Create an account-transaction index key.
///
/// Format: `account_id (16 bytes) || transaction_id (16 bytes)`
///
/// Since ULIDs are time-ordered, transactions for an account sort by time.
#[must_use]
pub fn account_transaction_key(
    account_id: &AccountId,
    transaction_id: &TransactionId,
) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(account_id.as_bytes());
    key.extend_from_slice(&transaction_id.to_bytes());
    key
}

/// Create a prefix for iterating all transactions for an account.
#[must_use]
pub fn account_transactions_prefix(account_id: &AccountId) -> Vec<u8> {
    account_id.as_bytes().to_vec()
}

/// Extract the transaction ID from an account-transaction index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_transaction_id_from_account_key(key: &[u8]) -> TransactionId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    TransactionId::from_bytes(bytes).expect("valid ULID bytes")
}

/// Create an idempotency record key.
///
/// Format: `account_id (16 bytes) || idempotency_key (utf-8)` — keys are
/// unique per (account, logical operation) pair.
#[must_use]
pub fn idempotency_key(account_id: &AccountId, key: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + key.len());
    out.extend_from_slice(account_id.as_bytes());
    out.extend_from_slice(key.as_bytes());
    out
}

/// Create a token key from a token ID.
#[must_use]
pub fn token_key(token_id: &TokenId) -> Vec<u8> {
    token_id.to_bytes().to_vec()
}

/// Create a nonce key from a nonce string.
#[must_use]
pub fn nonce_key(nonce: &str) -> Vec<u8> {
    nonce.as_bytes().to_vec()
}

/// Create a shop accrual key from a shop ID.
#[must_use]
pub fn shop_accrual_key(shop_id: &ShopId) -> Vec<u8> {
    shop_id.as_bytes().to_vec()
}

/// Create a batch key from a batch ID.
#[must_use]
pub fn batch_key(batch_id: &BatchId) -> Vec<u8> {
    batch_id.to_bytes().to_vec()
}

/// Create a shop-batch index key.
///
/// Format: `shop_id (16 bytes) || batch_id (16 bytes)`.
#[must_use]
pub fn shop_batch_key(shop_id: &ShopId, batch_id: &BatchId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(shop_id.as_bytes());
    key.extend_from_slice(&batch_id.to_bytes());
    key
}

/// Create a prefix for iterating all batches for a shop.
#[must_use]
pub fn shop_batches_prefix(shop_id: &ShopId) -> Vec<u8> {
    shop_id.as_bytes().to_vec()
}

/// Extract the batch ID from a shop-batch index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_batch_id_from_shop_key(key: &[u8]) -> BatchId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    BatchId::from_bytes(bytes).expect("valid ULID bytes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_key_length() {
        let account_id = AccountId::generate();
        let key = account_key(&account_id);
        assert_eq!(key.len(), 16);
    }

    #[test]
    fn account_transaction_key_format() {
        let account_id = AccountId::generate();
        let tx_id = TransactionId::generate();
        let key = account_transaction_key(&account_id, &tx_id);

        assert_eq!(key.len(), 32);
        assert_eq!(&key[..16], account_id.as_bytes());
        assert_eq!(&key[16..], tx_id.to_bytes());
    }

    #[test]
    fn extract_transaction_id_roundtrip() {
        let account_id = AccountId::generate();
        let tx_id = TransactionId::generate();
        let key = account_transaction_key(&account_id, &tx_id);

        let extracted = extract_transaction_id_from_account_key(&key);
        assert_eq!(extracted, tx_id);
    }

    #[test]
    fn idempotency_key_is_scoped_to_account() {
        let a = AccountId::generate();
        let b = AccountId::generate();

        assert_ne!(idempotency_key(&a, "op-1"), idempotency_key(&b, "op-1"));
        assert_ne!(idempotency_key(&a, "op-1"), idempotency_key(&a, "op-2"));
    }

    #[test]
    fn extract_batch_id_roundtrip() {
        let shop_id = ShopId::generate();
        let batch_id = BatchId::generate();
        let key = shop_batch_key(&shop_id, &batch_id);

        let extracted = extract_batch_id_from_shop_key(&key);
        assert_eq!(extracted, batch_id);
    }
}
