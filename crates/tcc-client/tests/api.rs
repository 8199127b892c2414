//! Client SDK tests against a mocked ledger service.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tcc_client::{ClientError, TccClient};
use tcc_core::{EarnEvent, PurchaseCategory};

fn purchase_event() -> EarnEvent {
    EarnEvent::Purchase {
        euro_cents: 1000,
        area: "centro".to_string(),
        category: PurchaseCategory::Bio,
    }
}

#[tokio::test]
async fn report_earn_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/earn"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tcc_awarded": 24,
            "new_balance": 24,
            "transaction_id": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "replayed": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TccClient::new(server.uri(), "test-key");
    let response = client
        .report_earn("account-1", purchase_event(), "receipt-1")
        .await
        .unwrap();

    assert_eq!(response.tcc_awarded, 24);
    assert_eq!(response.new_balance, 24);
    assert!(!response.replayed);
}

#[tokio::test]
async fn redeem_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/spend-tokens/redeem"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "new_balance": 0,
            "tcc_amount": 24,
            "transaction_id": "01ARZ3NDEKTSV4RRFFQ69G5FAV"
        })))
        .mount(&server)
        .await;

    let client = TccClient::new(server.uri(), "test-key");
    let response = client
        .redeem_token("tcc://id.sig", "nonce-1", "shop-1")
        .await
        .unwrap();

    assert_eq!(response.new_balance, 0);
    assert_eq!(response.tcc_amount, 24);
}

#[tokio::test]
async fn redeem_maps_already_redeemed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/spend-tokens/redeem"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {"code": "token_already_redeemed", "message": "token already redeemed"}
        })))
        .mount(&server)
        .await;

    let client = TccClient::new(server.uri(), "test-key");
    let result = client.redeem_token("tcc://id.sig", "nonce-1", "shop-1").await;

    assert!(matches!(result, Err(ClientError::TokenAlreadyRedeemed)));
}

#[tokio::test]
async fn redeem_maps_not_redeemable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/spend-tokens/redeem"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": {"code": "token_not_redeemable", "message": "token not redeemable"}
        })))
        .mount(&server)
        .await;

    let client = TccClient::new(server.uri(), "test-key");
    let result = client.redeem_token("tcc://id.sig", "bad-nonce", "shop-1").await;

    assert!(matches!(result, Err(ClientError::TokenNotRedeemable)));
}

#[tokio::test]
async fn insufficient_balance_carries_details() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/spend-tokens/redeem"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({
            "error": {
                "code": "insufficient_balance",
                "message": "insufficient balance",
                "details": {"balance": 5, "required": 24}
            }
        })))
        .mount(&server)
        .await;

    let client = TccClient::new(server.uri(), "test-key");
    let result = client.redeem_token("tcc://id.sig", "nonce-1", "shop-1").await;

    match result {
        Err(ClientError::InsufficientBalance { balance, required }) => {
            assert_eq!(balance, 5);
            assert_eq!(required, 24);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn unknown_error_code_falls_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/earn"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": "config_unavailable", "message": "reward configuration unavailable"}
        })))
        .mount(&server)
        .await;

    let client = TccClient::new(server.uri(), "test-key");
    let result = client
        .report_earn("account-1", purchase_event(), "receipt-1")
        .await;

    match result {
        Err(ClientError::Api { code, status, .. }) => {
            assert_eq!(code, "config_unavailable");
            assert_eq!(status, 503);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_tolerated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = TccClient::new(server.uri(), "test-key");
    let result = client.get_account("bearer-token").await;

    match result {
        Err(ClientError::Api { code, status, .. }) => {
            assert_eq!(code, "unknown");
            assert_eq!(status, 500);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
