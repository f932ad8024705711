//! Preflight, route matching and auth gate behavior over real HTTP.

use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn test_preflight_on_any_path() {
    let gw = common::spawn_gateway().await;

    for path in ["/api/users", "/api/products/p1", "/not/a/route"] {
        let resp = gw
            .client
            .request(reqwest::Method::OPTIONS, gw.url(path))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let headers = resp.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "GET, POST, PUT, DELETE, OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type, Authorization");
        assert!(resp.bytes().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_unknown_route() {
    let gw = common::spawn_gateway().await;
    let resp = gw.client.get(gw.url("/api/orders")).send().await.unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "error": "Route not found" }));
}

#[tokio::test]
async fn test_auth_gate() {
    let gw = common::spawn_gateway().await;

    let resp = gw.client.get(gw.url("/api/products")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No token provided");

    let resp = gw
        .client
        .get(gw.url("/api/products"))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid token");

    // Exempt, but still a POST-only endpoint
    let resp = gw.client.get(gw.url("/api/auth/login")).send().await.unwrap();
    assert_eq!(resp.status(), 405);

    // Logout is not exempt
    let resp = gw.client.post(gw.url("/api/auth/logout")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_request_id_round_trip() {
    let gw = common::spawn_gateway().await;

    let resp = gw
        .client
        .get(gw.url("/api/users"))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "req-42");

    let resp = gw.client.get(gw.url("/api/users")).send().await.unwrap();
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_oversized_body_answers_with_envelope() {
    let mut config = api_gateway::GatewayConfig::default();
    config.security.max_body_size = 64;
    let gw = common::spawn_gateway_with(config).await;
    let oversized = "x".repeat(1024);

    // Preflight never reads the body
    let resp = gw
        .client
        .request(reqwest::Method::OPTIONS, gw.url("/api/users"))
        .body(oversized.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");

    // Auth gate runs before the body is read
    let resp = gw
        .client
        .get(gw.url("/api/users"))
        .body(oversized.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "error": "No token provided" }));

    let resp = gw
        .client
        .post(gw.url("/api/auth/signup"))
        .header("content-type", "application/json")
        .body(oversized)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "error": "Failed to read request body" }));
}
