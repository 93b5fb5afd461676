//! End-to-end admission scenarios against a running gateway.

use admission_gateway::config::GatewayConfig;
use serde_json::{json, Value};

mod common;

fn tamper(token: &str) -> String {
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let signature = &mut parts[2];
    let middle = signature.len() / 2;
    let replacement = if &signature[middle..middle + 1] == "A" { "B" } else { "A" };
    signature.replace_range(middle..middle + 1, replacement);
    parts.join(".")
}

#[tokio::test]
async fn test_enroll_then_admin_operation() {
    let gateway = common::start_gateway(GatewayConfig::default()).await;
    let token = gateway.enroll("alice", "admin").await;

    let res = gateway
        .client
        .post(gateway.url("/records"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Dune", "author": "Frank Herbert", "price": 999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["author"], "Frank Herbert");

    let res = gateway
        .client
        .get(gateway.url("/records"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let records: Vec<Value> = res.json().await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_eleventh_rapid_request_is_throttled() {
    let gateway = common::start_gateway(GatewayConfig::default()).await;
    let token = gateway.enroll("carol", "admin").await;

    for i in 0..10 {
        let res = gateway
            .client
            .get(gateway.url("/records"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200, "request {} should be admitted", i + 1);
    }

    let res = gateway
        .client
        .get(gateway.url("/records"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 429);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Too many requests" }));

    // Another caller is unaffected.
    let other = gateway.enroll("dave", "admin").await;
    let res = gateway
        .client
        .get(gateway.url("/records"))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn test_tampered_token_is_unauthorized() {
    let gateway = common::start_gateway(GatewayConfig::default()).await;
    let token = gateway.enroll("alice", "admin").await;

    let res = gateway
        .client
        .get(gateway.url("/records"))
        .bearer_auth(tamper(&token))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
    let body: Value = res.json().await.unwrap();
    assert!(body.is_string());
}

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    let gateway = common::start_gateway(GatewayConfig::default()).await;

    let res = gateway
        .client
        .get(gateway.url("/records"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!("missing or invalid Authorization header"));
}

#[tokio::test]
async fn test_wrong_role_is_forbidden() {
    let gateway = common::start_gateway(GatewayConfig::default()).await;
    let token = gateway.enroll("erin", "guest").await;

    let res = gateway
        .client
        .delete(gateway.url("/records"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!("forbidden"));
}

#[tokio::test]
async fn test_enrollment_rejects_bad_bodies() {
    let gateway = common::start_gateway(GatewayConfig::default()).await;

    let res = gateway
        .client
        .post(gateway.url("/auth/token"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    assert_eq!(res.json::<Value>().await.unwrap(), json!("invalid data"));

    let res = gateway
        .client
        .post(gateway.url("/auth/token"))
        .json(&json!({ "name": "", "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!("all fields (name and role) are required")
    );
}

#[tokio::test]
async fn test_custom_admin_role() {
    let mut config = GatewayConfig::default();
    config.auth.admin_role = "librarian".into();
    let gateway = common::start_gateway(config).await;

    let admin = gateway.enroll("alice", "admin").await;
    let librarian = gateway.enroll("lib", "librarian").await;

    let res = gateway
        .client
        .delete(gateway.url("/records"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);

    let res = gateway
        .client
        .delete(gateway.url("/records"))
        .bearer_auth(&librarian)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
}
