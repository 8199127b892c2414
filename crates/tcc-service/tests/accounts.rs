//! Wallet account integration tests.

mod common;

use common::TestHarness;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn create_account_success() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/accounts")
        .add_header("authorization", harness.citizen_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["account_id"], harness.citizen_id.to_string());
    assert_eq!(body["balance"], 0);
}

#[tokio::test]
async fn create_account_is_idempotent() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;
    harness.fund_citizen(10);

    // Re-registering returns the existing account, balance intact.
    let response = harness
        .server
        .post("/v1/accounts")
        .add_header("authorization", harness.citizen_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["balance"], 10);
}

#[tokio::test]
async fn create_account_without_auth_fails() {
    let harness = TestHarness::new();

    let response = harness.server.post("/v1/accounts").await;

    response.assert_status_unauthorized();
}

// ============================================================================
// Lookup
// ============================================================================

#[tokio::test]
async fn get_account_success() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;
    harness.fund_citizen(42);

    let response = harness
        .server
        .get("/v1/accounts/me")
        .add_header("authorization", harness.citizen_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["balance"], 42);
    assert_eq!(body["lifetime_earned"], 42);
    assert_eq!(body["lifetime_spent"], 0);
}

#[tokio::test]
async fn get_account_unregistered_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/accounts/me")
        .add_header("authorization", TestHarness::other_citizen_auth_header())
        .await;

    response.assert_status_not_found();
}

// ============================================================================
// Transaction history
// ============================================================================

#[tokio::test]
async fn list_transactions_empty() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;

    let response = harness
        .server
        .get("/v1/accounts/me/transactions")
        .add_header("authorization", harness.citizen_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["transactions"].as_array().unwrap().is_empty());
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn list_transactions_paginated_newest_first() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;
    harness.fund_citizen(10);
    std::thread::sleep(std::time::Duration::from_millis(2));
    harness.fund_citizen(20);

    let response = harness
        .server
        .get("/v1/accounts/me/transactions?limit=1&offset=0")
        .add_header("authorization", harness.citizen_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["amount"], 20); // newest first
    assert_eq!(body["has_more"], true);
}
