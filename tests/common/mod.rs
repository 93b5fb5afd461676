//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use admission_gateway::config::GatewayConfig;
use admission_gateway::security::KeyMaterial;
use admission_gateway::store::MemoryStore;
use admission_gateway::{HttpServer, Shutdown};
use tokio::net::TcpListener;

pub const SIGNING_PEM: &str = include_str!("../fixtures/signing_key.pem");
pub const VERIFYING_PEM: &str = include_str!("../fixtures/verifying_key.pem");
pub const FOREIGN_SIGNING_PEM: &str = include_str!("../fixtures/foreign_signing_key.pem");
pub const FOREIGN_VERIFYING_PEM: &str = include_str!("../fixtures/foreign_verifying_key.pem");

pub fn test_keys() -> KeyMaterial {
    KeyMaterial::from_pem(SIGNING_PEM.as_bytes(), VERIFYING_PEM.as_bytes()).unwrap()
}

/// A gateway running on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Enroll and return the bare token.
    pub async fn enroll(&self, name: &str, role: &str) -> String {
        let res = self
            .client
            .post(self.url("/auth/token"))
            .json(&serde_json::json!({ "name": name, "role": role }))
            .send()
            .await
            .expect("gateway unreachable");
        assert_eq!(res.status(), 200);
        res.json::<String>().await.unwrap()
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the gateway with `config` (bind address is ignored).
pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, &test_keys(), Arc::new(MemoryStore::new()));
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap();
    TestGateway {
        addr,
        shutdown,
        client,
    }
}
