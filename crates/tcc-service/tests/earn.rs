//! Earn-event integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

/// Install a reward configuration with a +20% bio category boost.
async fn install_boosted_rules(harness: &TestHarness) {
    harness
        .server
        .put("/v1/reward-rules")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({
            "tcc_per_euro": 2,
            "base_multipliers": {"bio": 2, "km_zero": 2, "generic": 1},
            "default_multiplier": 1,
            "category_boosts": {"bio": 20},
            "checkin_base": 5,
            "civic_report_reward": 10,
            "updated_by": "tests"
        }))
        .await
        .assert_status_ok();
}

// ============================================================================
// Purchases
// ============================================================================

#[tokio::test]
async fn bio_purchase_awards_boosted_tcc() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;
    install_boosted_rules(&harness).await;

    // EUR 10 bio purchase, multiplier 2, +20% category boost -> 24 TCC.
    let response = harness
        .server
        .post("/v1/earn")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({
            "account_id": harness.citizen_id.to_string(),
            "event": {"type": "purchase", "euro_cents": 1000, "area": "centro", "category": "bio"},
            "idempotency_key": "receipt-001"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["tcc_awarded"], 24);
    assert_eq!(body["new_balance"], 24);
    assert_eq!(body["replayed"], false);
    assert!(body["transaction_id"].is_string());
}

#[tokio::test]
async fn earn_is_idempotent() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;

    let request = json!({
        "account_id": harness.citizen_id.to_string(),
        "event": {"type": "civic_report"},
        "idempotency_key": "report-42"
    });

    let first = harness
        .server
        .post("/v1/earn")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&request)
        .await;
    first.assert_status_ok();
    let first: serde_json::Value = first.json();

    let second = harness
        .server
        .post("/v1/earn")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&request)
        .await;
    second.assert_status_ok();
    let second: serde_json::Value = second.json();

    assert_eq!(second["replayed"], true);
    assert_eq!(second["transaction_id"], first["transaction_id"]);
    // Credited exactly once.
    assert_eq!(second["new_balance"], first["new_balance"]);
}

#[tokio::test]
async fn zero_value_purchase_is_rejected() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;

    let response = harness
        .server
        .post("/v1/earn")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({
            "account_id": harness.citizen_id.to_string(),
            "event": {"type": "purchase", "euro_cents": 0, "area": "centro", "category": "generic"},
            "idempotency_key": "receipt-zero"
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn oversized_purchase_is_rejected() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;

    // An amount too large to scale within i64 is rejected outright rather
    // than wrapping into an arbitrary award.
    let response = harness
        .server
        .post("/v1/earn")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({
            "account_id": harness.citizen_id.to_string(),
            "event": {
                "type": "purchase",
                "euro_cents": i64::MAX / 2,
                "area": "centro",
                "category": "bio"
            },
            "idempotency_key": "receipt-huge"
        }))
        .await;

    response.assert_status_bad_request();
}

// ============================================================================
// Check-ins and civic reports
// ============================================================================

#[tokio::test]
async fn walking_checkin_beats_driving() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;

    let earn = |transport: &str, key: &str| {
        let body = json!({
            "account_id": harness.citizen_id.to_string(),
            "event": {"type": "check_in", "transport": transport},
            "idempotency_key": key
        });
        let server = &harness.server;
        let api_key = harness.service_api_key.clone();
        async move {
            let response = server
                .post("/v1/earn")
                .add_header("x-api-key", api_key)
                .json(&body)
                .await;
            response.assert_status_ok();
            let body: serde_json::Value = response.json();
            body["tcc_awarded"].as_i64().unwrap()
        }
    };

    let walking = earn("walking", "checkin-1").await;
    let car = earn("car", "checkin-2").await;

    assert_eq!(walking, 10); // base 5 + walking bonus 5
    assert_eq!(car, 5); // base only
    assert!(walking > car);
}

#[tokio::test]
async fn civic_report_awards_flat_reward() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;

    let response = harness
        .server
        .post("/v1/earn")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({
            "account_id": harness.citizen_id.to_string(),
            "event": {"type": "civic_report"},
            "idempotency_key": "report-1"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["tcc_awarded"], 10);
}

// ============================================================================
// Validation and auth
// ============================================================================

#[tokio::test]
async fn earn_requires_service_key() {
    let harness = TestHarness::new();
    harness.create_citizen_account().await;

    // A citizen bearer token is not enough for the earn surface.
    let response = harness
        .server
        .post("/v1/earn")
        .add_header("authorization", harness.citizen_auth_header())
        .json(&json!({
            "account_id": harness.citizen_id.to_string(),
            "event": {"type": "civic_report"},
            "idempotency_key": "report-1"
        }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn earn_for_unknown_account_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/earn")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({
            "account_id": "00000000-0000-4000-8000-000000000000",
            "event": {"type": "civic_report"},
            "idempotency_key": "report-1"
        }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn earn_with_invalid_account_id_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/earn")
        .add_header("x-api-key", harness.service_api_key.clone())
        .json(&json!({
            "account_id": "not-a-uuid",
            "event": {"type": "civic_report"},
            "idempotency_key": "report-1"
        }))
        .await;

    response.assert_status_bad_request();
}
