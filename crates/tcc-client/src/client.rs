//! TCC ledger HTTP client implementation.

use reqwest::Client;
use std::time::Duration;

use tcc_core::EarnEvent;

use crate::error::ClientError;
use crate::types::{
    AccountResponse, AccrualResponse, ApiErrorResponse, BatchResponse, EarnRequest, EarnResponse,
    IssueTokenRequest, IssueTokenResponse, ListBatchesResponse, RedeemTokenRequest,
    RedeemTokenResponse,
};

/// TCC ledger API client.
///
/// Used by merchant terminals and municipal services to report earn
/// events, redeem spend tokens, and manage reimbursements.
#[derive(Debug, Clone)]
pub struct TccClient {
    client: Client,
    base_url: String,
    api_key: String,
    service_name: String,
}

impl TccClient {
    /// Create a new TCC ledger client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the ledger service (e.g., `"http://tcc-ledger:8080"`)
    /// * `api_key` - Service API key for authentication
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_options(base_url, api_key, ClientOptions::default())
    }

    /// Create a new TCC ledger client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with default settings).
    #[must_use]
    pub fn with_options(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        options: ClientOptions,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            service_name: options.service_name,
        }
    }

    /// Report an earn event for a citizen account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn report_earn(
        &self,
        account_id: impl Into<String>,
        event: EarnEvent,
        idempotency_key: impl Into<String>,
    ) -> Result<EarnResponse, ClientError> {
        let url = format!("{}/v1/earn", self.base_url);
        let request = EarnRequest {
            account_id: account_id.into(),
            event,
            idempotency_key: idempotency_key.into(),
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&request)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Redeem a scanned spend token for a shop.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn redeem_token(
        &self,
        token: impl Into<String>,
        nonce: impl Into<String>,
        shop_id: impl Into<String>,
    ) -> Result<RedeemTokenResponse, ClientError> {
        let url = format!("{}/v1/spend-tokens/redeem", self.base_url);
        let request = RedeemTokenRequest {
            token: token.into(),
            nonce: nonce.into(),
            shop_id: shop_id.into(),
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&request)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Issue a spend token on behalf of an authenticated citizen.
    ///
    /// This method is typically used by the municipal wallet app, which
    /// holds the citizen's bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn issue_token(
        &self,
        citizen_bearer: &str,
        euro_cents: i64,
    ) -> Result<IssueTokenResponse, ClientError> {
        let url = format!("{}/v1/spend-tokens", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {citizen_bearer}"))
            .json(&IssueTokenRequest { euro_cents })
            .send()
            .await?;

        handle_response(response).await
    }

    /// Get a citizen's wallet account (requires the citizen's bearer token).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_account(&self, citizen_bearer: &str) -> Result<AccountResponse, ClientError> {
        let url = format!("{}/v1/accounts/me", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {citizen_bearer}"))
            .send()
            .await?;

        handle_response(response).await
    }

    /// Get a shop's pending reimbursement accrual.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_shop_accrual(
        &self,
        shop_id: impl Into<String>,
    ) -> Result<AccrualResponse, ClientError> {
        let url = format!("{}/v1/shops/{}/accrual", self.base_url, shop_id.into());

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Snapshot a shop's pending accrual into a reimbursement batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn create_reimbursement(
        &self,
        shop_id: impl Into<String>,
    ) -> Result<BatchResponse, ClientError> {
        let url = format!("{}/v1/reimbursements", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&serde_json::json!({ "shop_id": shop_id.into() }))
            .send()
            .await?;

        handle_response(response).await
    }

    /// Mark a reimbursement batch as paid out.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn mark_reimbursement_processed(
        &self,
        batch_id: impl Into<String>,
        payout_reference: impl Into<String>,
    ) -> Result<BatchResponse, ClientError> {
        let url = format!(
            "{}/v1/reimbursements/{}/processed",
            self.base_url,
            batch_id.into()
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&serde_json::json!({ "payout_reference": payout_reference.into() }))
            .send()
            .await?;

        handle_response(response).await
    }

    /// Mark a reimbursement batch as failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn mark_reimbursement_failed(
        &self,
        batch_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<BatchResponse, ClientError> {
        let url = format!(
            "{}/v1/reimbursements/{}/failed",
            self.base_url,
            batch_id.into()
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .json(&serde_json::json!({ "reason": reason.into() }))
            .send()
            .await?;

        handle_response(response).await
    }

    /// List a shop's reimbursement batches (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_reimbursements(
        &self,
        shop_id: impl Into<String>,
    ) -> Result<ListBatchesResponse, ClientError> {
        let url = format!(
            "{}/v1/reimbursements?shop_id={}",
            self.base_url,
            shop_id.into()
        );

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .header("x-service-name", &self.service_name)
            .send()
            .await?;

        handle_response(response).await
    }
}

/// Handle API response and convert errors.
async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    // Try to parse error response
    let error_body: Result<ApiErrorResponse, _> = response.json().await;

    match error_body {
        Ok(api_error) => {
            let code = api_error.error.code.as_str();
            let message = api_error.error.message.clone();

            // Map specific error codes to typed errors
            match code {
                "insufficient_balance" => {
                    let balance = api_error
                        .error
                        .details
                        .as_ref()
                        .and_then(|d| d.get("balance"))
                        .and_then(serde_json::Value::as_i64)
                        .unwrap_or(0);
                    let required = api_error
                        .error
                        .details
                        .as_ref()
                        .and_then(|d| d.get("required"))
                        .and_then(serde_json::Value::as_i64)
                        .unwrap_or(0);

                    Err(ClientError::InsufficientBalance { balance, required })
                }
                "token_not_redeemable" => Err(ClientError::TokenNotRedeemable),
                "token_expired" => Err(ClientError::TokenExpired),
                "token_already_redeemed" => Err(ClientError::TokenAlreadyRedeemed),
                "replay_detected" => Err(ClientError::ReplayDetected),
                _ => Err(ClientError::Api {
                    code: code.to_string(),
                    message,
                    status: status.as_u16(),
                }),
            }
        }
        Err(_) => Err(ClientError::Api {
            code: "unknown".to_string(),
            message: format!("HTTP {status}"),
            status: status.as_u16(),
        }),
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Service name to include in requests.
    pub service_name: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            service_name: "unknown".to_string(),
        }
    }
}

impl ClientOptions {
    /// Create options with a service name.
    #[must_use]
    pub fn with_service_name(name: impl Into<String>) -> Self {
        Self {
            service_name: name.into(),
            ..Self::default()
        }
    }
}
