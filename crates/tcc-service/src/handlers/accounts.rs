//! Citizen wallet account handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use tcc_core::{Account, LedgerTransaction};
use tcc_store::Store;

use crate::auth::AuthCitizen;
use crate::error::ApiError;
use crate::state::AppState;

/// Account response.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// The wallet account ID.
    pub account_id: String,
    /// Current balance in TCC.
    pub balance: i64,
    /// Total TCC ever earned.
    pub lifetime_earned: i64,
    /// Total TCC ever spent.
    pub lifetime_spent: i64,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.account_id.to_string(),
            balance: account.balance,
            lifetime_earned: account.lifetime_earned,
            lifetime_spent: account.lifetime_spent,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// Create (register) the authenticated citizen's wallet account.
///
/// Idempotent: registering an existing wallet returns the stored account.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    auth: AuthCitizen,
) -> Result<Json<AccountResponse>, ApiError> {
    if let Some(existing) = state.store.get_account(&auth.account_id)? {
        return Ok(Json(AccountResponse::from(&existing)));
    }

    let account = Account::new(auth.account_id);
    state.store.put_account(&account)?;

    tracing::info!(account_id = %auth.account_id, "Wallet account created");

    Ok(Json(AccountResponse::from(&account)))
}

/// Get the authenticated citizen's wallet account.
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    auth: AuthCitizen,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .store
        .get_account(&auth.account_id)?
        .ok_or_else(|| ApiError::NotFound("account not found".into()))?;

    Ok(Json(AccountResponse::from(&account)))
}

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of transactions to return (default: 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Transaction response.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: String,
    /// Signed amount in TCC (positive = earn/refund, negative = spend).
    pub amount: i64,
    /// Transaction kind.
    pub kind: String,
    /// Euro amount in cents, when the operation had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub euro_cents: Option<i64>,
    /// Timestamp.
    pub created_at: String,
}

impl From<&LedgerTransaction> for TransactionResponse {
    fn from(tx: &LedgerTransaction) -> Self {
        Self {
            id: tx.id.to_string(),
            amount: tx.amount,
            kind: format!("{:?}", tx.kind).to_lowercase(),
            euro_cents: tx.euro_cents,
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// List transactions response.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// Transactions (newest first).
    pub transactions: Vec<TransactionResponse>,
    /// Whether there are more transactions.
    pub has_more: bool,
}

/// List the authenticated citizen's transaction history.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthCitizen,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    state
        .store
        .get_account(&auth.account_id)?
        .ok_or_else(|| ApiError::NotFound("account not found".into()))?;

    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(100);
    let transactions =
        state
            .store
            .list_transactions_by_account(&auth.account_id, limit + 1, query.offset)?;

    let has_more = transactions.len() > limit;
    let transactions: Vec<_> = transactions
        .iter()
        .take(limit)
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(ListTransactionsResponse {
        transactions,
        has_more,
    }))
}
