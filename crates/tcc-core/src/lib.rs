//! Core types for the TCC token ledger and reward engine.
//!
//! This crate provides the foundational types used throughout the platform:
//!
//! - **Identifiers**: `AccountId`, `ShopId`, `TransactionId`, `TokenId`, `BatchId`
//! - **Accounts**: `Account`, `ShopAccrual`
//! - **Ledger**: `LedgerTransaction`, `TransactionKind`
//! - **Spend tokens**: `SpendToken`, `TokenStatus`
//! - **Reward rules**: `RewardRuleConfig`, `EarnEvent`, `compute_earn_amount`
//! - **Reimbursements**: `ReimbursementBatch`, `BatchStatus`
//!
//! # TCC Unit
//!
//! **TCC is integer-denominated** — a citizen balance is a whole number of
//! tokens, never fractional. Euro values are carried alongside as integer
//! cents. Both are stored as `i64` to avoid floating point precision issues.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod batch;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod rules;
pub mod token;

pub use account::{Account, ShopAccrual};
pub use batch::{BatchStatus, ReimbursementBatch};
pub use error::{LedgerError, Result};
pub use ids::{AccountId, BatchId, IdError, ShopId, TokenId, TransactionId};
pub use ledger::{LedgerTransaction, TransactionKind};
pub use rules::{
    compute_earn_amount, EarnEvent, PurchaseCategory, RewardRuleConfig, TransportMode,
};
pub use token::{SpendToken, TokenStatus};
