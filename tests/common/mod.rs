//! Shared utilities for integration testing.

use std::sync::Arc;

use api_gateway::config::GatewayConfig;
use api_gateway::lifecycle::Shutdown;
use api_gateway::{build_dispatcher, AppServices, HttpServer};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// A gateway running on an ephemeral port.
pub struct TestGateway {
    pub base_url: String,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a gateway with in-memory stores and default settings.
pub async fn spawn_gateway() -> TestGateway {
    spawn_gateway_with(GatewayConfig::default()).await
}

pub async fn spawn_gateway_with(mut config: GatewayConfig) -> TestGateway {
    config.auth.jwt_secret = "integration-test-secret".to_string();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let services = AppServices::in_memory(&config.auth);
    let dispatcher = Arc::new(build_dispatcher(&config, &services).unwrap());

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let server = HttpServer::new(config, dispatcher);
    tokio::spawn(async move {
        server.run(listener, receiver).await.unwrap();
    });

    TestGateway {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        shutdown,
    }
}

/// Sign up and log in, returning `(uid, token)`.
#[allow(dead_code)]
pub async fn signup_and_login(gw: &TestGateway, email: &str, password: &str) -> (String, String) {
    let resp = gw
        .client
        .post(gw.url("/api/auth/signup"))
        .json(&json!({ "email": email, "password": password, "name": "Test User" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let uid = body["data"]["uid"].as_str().unwrap().to_string();

    let resp = gw
        .client
        .post(gw.url("/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();

    (uid, token)
}
