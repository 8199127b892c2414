//! Spend-token integration tests.

mod common;

use common::TestHarness;
use serde_json::json;
use tcc_core::ShopId;

/// Issue a token for the harness citizen, returning the response body.
async fn issue_token(harness: &TestHarness, euro_cents: i64) -> serde_json::Value {
    let response = harness
        .server
        .post("/v1/spend-tokens")
        .add_header("authorization", harness.citizen_auth_header())
        .json(&json!({"euro_cents": euro_cents}))
        .await;

    response.assert_status_ok();
    response.json()
}

// ============================================================================
// Issuance
// ============================================================================

#[tokio::test]
async fn issue_token_converts_with_ceiling() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;
    harness.fund_citizen(50);

    // EUR 12.01 at 2 TCC/EUR = 24.02, ceiling -> 25.
    let body = issue_token(&harness, 1201).await;

    assert_eq!(body["tcc_amount"], 25);
    assert!(body["token"].as_str().unwrap().starts_with("tcc://"));
    assert!(!body["nonce"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn issue_token_requires_balance() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;
    harness.fund_citizen(5);

    let response = harness
        .server
        .post("/v1/spend-tokens")
        .add_header("authorization", harness.citizen_auth_header())
        .json(&json!({"euro_cents": 1200}))
        .await;

    response.assert_status(axum::http::StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_balance");
}

#[tokio::test]
async fn issue_token_rejects_non_positive_amount() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;

    let response = harness
        .server
        .post("/v1/spend-tokens")
        .add_header("authorization", harness.citizen_auth_header())
        .json(&json!({"euro_cents": 0}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn issue_token_rejects_oversized_amount() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;
    harness.fund_citizen(50);

    // The euro-to-TCC conversion must refuse amounts it cannot scale
    // within i64 instead of wrapping.
    let response = harness
        .server
        .post("/v1/spend-tokens")
        .add_header("authorization", harness.citizen_auth_header())
        .json(&json!({"euro_cents": i64::MAX / 2}))
        .await;

    response.assert_status_bad_request();
}

// ============================================================================
// Redemption
// ============================================================================

#[tokio::test]
async fn redeem_to_zero_scenario() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;
    harness.fund_citizen(24);

    // EUR 12 at 2 TCC/EUR = exactly 24 TCC.
    let issued = issue_token(&harness, 1200).await;
    assert_eq!(issued["tcc_amount"], 24);

    let shop_id = ShopId::generate();
    let response = harness
        .server
        .post("/v1/spend-tokens/redeem")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({
            "token": issued["token"],
            "nonce": issued["nonce"],
            "shop_id": shop_id.to_string()
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["new_balance"], 0);
    assert_eq!(body["tcc_amount"], 24);

    // The shop accrued the redeemed TCC.
    let accrual = harness
        .server
        .get(&format!("/v1/shops/{shop_id}/accrual"))
        .add_header("x-api-key", harness.service_api_key.clone())
        .await;
    accrual.assert_status_ok();
    let accrual: serde_json::Value = accrual.json();
    assert_eq!(accrual["pending"], 24);
}

#[tokio::test]
async fn double_redeem_yields_one_success() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;
    harness.fund_citizen(50);

    let issued = issue_token(&harness, 1000).await;
    let shop_id = ShopId::generate().to_string();
    let request = json!({
        "token": issued["token"],
        "nonce": issued["nonce"],
        "shop_id": shop_id
    });

    harness
        .server
        .post("/v1/spend-tokens/redeem")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&request)
        .await
        .assert_status_ok();

    let second = harness
        .server
        .post("/v1/spend-tokens/redeem")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&request)
        .await;

    second.assert_status(axum::http::StatusCode::CONFLICT);
    let body: serde_json::Value = second.json();
    assert_eq!(body["error"]["code"], "token_already_redeemed");
}

#[tokio::test]
async fn unknown_token_and_wrong_nonce_are_indistinguishable() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;
    harness.fund_citizen(50);

    let issued = issue_token(&harness, 1000).await;
    let shop_id = ShopId::generate().to_string();

    // Wrong nonce on a real token.
    let wrong_nonce = harness
        .server
        .post("/v1/spend-tokens/redeem")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({
            "token": issued["token"],
            "nonce": "11111111-1111-4111-8111-111111111111",
            "shop_id": shop_id
        }))
        .await;

    // A token string that was never issued (bad signature).
    let unknown_token = harness
        .server
        .post("/v1/spend-tokens/redeem")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({
            "token": "tcc://01ARZ3NDEKTSV4RRFFQ69G5FAV.deadbeef",
            "nonce": issued["nonce"],
            "shop_id": shop_id
        }))
        .await;

    // Same status, same code: a probing terminal learns nothing.
    assert_eq!(wrong_nonce.status_code(), unknown_token.status_code());
    let a: serde_json::Value = wrong_nonce.json();
    let b: serde_json::Value = unknown_token.json();
    assert_eq!(a["error"]["code"], b["error"]["code"]);
    assert_eq!(a["error"]["code"], "token_not_redeemable");
}

#[tokio::test]
async fn wrong_nonce_leaves_token_redeemable() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;
    harness.fund_citizen(50);

    let issued = issue_token(&harness, 1000).await;
    let shop_id = ShopId::generate().to_string();

    harness
        .server
        .post("/v1/spend-tokens/redeem")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({
            "token": issued["token"],
            "nonce": "11111111-1111-4111-8111-111111111111",
            "shop_id": shop_id
        }))
        .await
        .assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);

    // The correct nonce still redeems.
    harness
        .server
        .post("/v1/spend-tokens/redeem")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({
            "token": issued["token"],
            "nonce": issued["nonce"],
            "shop_id": shop_id
        }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn redeem_requires_service_key() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;
    harness.fund_citizen(50);

    let issued = issue_token(&harness, 1000).await;

    // Citizens cannot redeem their own tokens.
    let response = harness
        .server
        .post("/v1/spend-tokens/redeem")
        .add_header("authorization", harness.citizen_auth_header())
        .json(&json!({
            "token": issued["token"],
            "nonce": issued["nonce"],
            "shop_id": ShopId::generate().to_string()
        }))
        .await;

    response.assert_status_unauthorized();
}
