// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the HTTP API
//!
//! Requests go through the full router (path validation, cached fetches,
//! envelopes and error mapping) against mock backends.

mod helpers;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use helpers::{app, sample_repository, FailingRepository, MockRpc};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn get(router: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_invalid_account_id_is_bad_request() {
    let router = app(Arc::new(sample_repository()), Arc::new(MockRpc::new()));

    for uri in [
        "/v1/account/Alice.near",
        "/v1/account/a",
        "/v1/account/alice..near/contract",
        "/v1/account/alice.near/action/bad-method",
    ] {
        let (status, body) = get(&router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid"), "{uri}: {body}");
    }
}

/// Identity comes from the indexer, balances from RPC
#[tokio::test]
async fn test_account_merges_database_and_rpc() {
    let rpc = Arc::new(MockRpc::new().with_view("1000000000000000000000000"));
    let router = app(Arc::new(sample_repository()), rpc.clone());

    let (status, body) = get(&router, "/v1/account/alice.near").await;
    assert_eq!(status, StatusCode::OK);

    let account = &body["account"][0];
    assert_eq!(account["account_id"], "alice.near");
    assert_eq!(account["amount"], "1000000000000000000000000");
    assert_eq!(account["storage_usage"], 182);
    assert_eq!(account["created"]["transaction_hash"], "CreateTx");
    assert_eq!(account["created"]["block_timestamp"], "1600000000000000000");
    assert_eq!(account["deleted"], Value::Null);

    // Second request is served from the cache
    get(&router, "/v1/account/alice.near").await;
    assert_eq!(rpc.view_calls.load(Ordering::SeqCst), 1);
}

/// An RPC outage nulls the live fields but keeps the response
#[tokio::test]
async fn test_account_with_rpc_down_has_null_balances() {
    let rpc = Arc::new(MockRpc::new().with_view("5").failing());
    let router = app(Arc::new(sample_repository()), rpc);

    let (status, body) = get(&router, "/v1/account/alice.near").await;
    assert_eq!(status, StatusCode::OK);

    let account = &body["account"][0];
    assert_eq!(account["amount"], Value::Null);
    assert_eq!(account["code_hash"], Value::Null);
    assert_eq!(account["created"]["transaction_hash"], "CreateTx");
}

#[tokio::test]
async fn test_unknown_account_is_empty_array() {
    let router = app(Arc::new(sample_repository()), Arc::new(MockRpc::new()));

    let (status, body) = get(&router, "/v1/account/nobody.near").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "account": [] }));
}

/// Database-backed resources fail the request
#[tokio::test]
async fn test_database_failure_is_internal_error() {
    let repo = Arc::new(FailingRepository::default());
    let router = app(repo.clone(), Arc::new(MockRpc::new().with_view("1")));

    for uri in [
        "/v1/account/alice.near",
        "/v1/account/alice.near/deployments",
        "/v1/account/alice.near/inventory",
        "/v1/account/alice.near/tokens",
        "/v1/account/alice.near/action/set_greeting",
    ] {
        let (status, body) = get(&router, uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }

    // Failures are not cached
    get(&router, "/v1/account/alice.near/tokens").await;
    assert!(repo.calls.load(Ordering::SeqCst) >= 6);
}

#[tokio::test]
async fn test_contract_locked_flag() {
    let locked = Arc::new(MockRpc::new().with_code("AGFzbQ==", "CodeHash").with_keys(false));
    let router = app(Arc::new(sample_repository()), locked);

    let (status, body) = get(&router, "/v1/account/alice.near/contract").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "contract": [{
            "account_id": "alice.near",
            "code_hash": "CodeHash",
            "code_size": 4,
            "locked": true,
        }]})
    );

    let unlocked = Arc::new(MockRpc::new().with_code("AGFzbQ==", "CodeHash").with_keys(true));
    let router = app(Arc::new(sample_repository()), unlocked);
    let (_, body) = get(&router, "/v1/account/alice.near/contract").await;
    assert_eq!(body["contract"][0]["locked"], false);
}

#[tokio::test]
async fn test_contract_without_code_is_empty_array() {
    let router = app(Arc::new(sample_repository()), Arc::new(MockRpc::new().with_keys(true)));

    let (status, body) = get(&router, "/v1/account/alice.near/contract").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "contract": [] }));
}

#[tokio::test]
async fn test_deployments_inventory_and_tokens() {
    let router = app(Arc::new(sample_repository()), Arc::new(MockRpc::new()));

    let (_, body) = get(&router, "/v1/account/alice.near/deployments").await;
    let deployments = body["deployments"].as_array().unwrap();
    assert_eq!(deployments.len(), 2);
    assert_eq!(deployments[0]["transaction_hash"], "Deploy1");
    assert_eq!(deployments[1]["block_timestamp"], "500");

    let (_, body) = get(&router, "/v1/account/alice.near/inventory").await;
    let inventory = &body["inventory"][0];
    assert_eq!(inventory["fts"].as_array().unwrap().len(), 1);
    assert_eq!(inventory["fts"][0]["ft_meta"]["symbol"], "USDT");
    assert_eq!(inventory["nfts"][0]["quantity"], 3);

    let (_, body) = get(&router, "/v1/account/alice.near/tokens").await;
    assert_eq!(
        body,
        json!({ "tokens": [{ "fts": ["usdt.near", "wrap.near"], "nfts": ["paras.near"] }] })
    );
}

#[tokio::test]
async fn test_latest_action() {
    let router = app(Arc::new(sample_repository()), Arc::new(MockRpc::new()));

    let (_, body) = get(&router, "/v1/account/alice.near/action/set_greeting").await;
    assert_eq!(body["action"][0]["predecessor_account_id"], "carol.near");
    assert_eq!(body["action"][0]["args"], json!({ "greeting": "hello" }));

    let (status, body) = get(&router, "/v1/account/alice.near/action/ft_transfer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "action": [] }));
}

#[tokio::test]
async fn test_health_reports_counters() {
    let router = app(Arc::new(sample_repository()), Arc::new(MockRpc::new()));
    get(&router, "/v1/account/alice.near/tokens").await;
    get(&router, "/v1/account/alice.near/tokens").await;

    let (status, body) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["repository"], "memory");
    assert_eq!(body["fetcher"]["hits"], 1);
    assert_eq!(body["fetcher"]["producer_calls"], 1);
}
