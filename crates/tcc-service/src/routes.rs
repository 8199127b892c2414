//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, earn, health, reimbursements, rules, tokens};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Accounts (citizen bearer auth)
/// - `POST /v1/accounts` - Register wallet account
/// - `GET /v1/accounts/me` - Get current citizen's account
/// - `GET /v1/accounts/me/transactions` - Transaction history
///
/// ## Earn (service API key)
/// - `POST /v1/earn` - Ingest an earn event
///
/// ## Spend tokens
/// - `POST /v1/spend-tokens` - Issue a token (citizen bearer auth)
/// - `POST /v1/spend-tokens/redeem` - Redeem a token (service API key)
///
/// ## Reimbursements (service API key)
/// - `POST /v1/reimbursements` - Create a batch
/// - `POST /v1/reimbursements/:batch_id/processed` - Mark paid out
/// - `POST /v1/reimbursements/:batch_id/failed` - Mark failed
/// - `GET /v1/reimbursements?shop_id=` - List a shop's batches
/// - `GET /v1/shops/:shop_id/accrual` - Get a shop's pending accrual
///
/// ## Reward rules (service API key)
/// - `GET /v1/reward-rules` - Get the active configuration
/// - `PUT /v1/reward-rules` - Replace the configuration
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Accounts
        .route("/v1/accounts", post(accounts::create_account))
        .route("/v1/accounts/me", get(accounts::get_account))
        .route(
            "/v1/accounts/me/transactions",
            get(accounts::list_transactions),
        )
        // Earn events
        .route("/v1/earn", post(earn::report_earn))
        // Spend tokens
        .route("/v1/spend-tokens", post(tokens::issue_token))
        .route("/v1/spend-tokens/redeem", post(tokens::redeem_token))
        // Reimbursements
        .route(
            "/v1/reimbursements",
            post(reimbursements::create_batch).get(reimbursements::list_batches),
        )
        .route(
            "/v1/reimbursements/:batch_id/processed",
            post(reimbursements::mark_processed),
        )
        .route(
            "/v1/reimbursements/:batch_id/failed",
            post(reimbursements::mark_failed),
        )
        .route("/v1/shops/:shop_id/accrual", get(reimbursements::get_accrual))
        // Reward rules
        .route(
            "/v1/reward-rules",
            get(rules::get_rules).put(rules::update_rules),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
