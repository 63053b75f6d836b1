use blindchat::config::{Config, ResponderProvider};
use blindchat::gateway::run_gateway_with_listener;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub struct GatewayTestServer {
    port: u16,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
    client: reqwest::Client,
    _workspace: TempDir,
}

impl GatewayTestServer {
    /// Start a gateway backed by the offline echo responder.
    pub async fn start() -> Self {
        Self::start_with(|config| config.responder.provider = ResponderProvider::Echo).await
    }

    pub async fn start_with(configure: impl FnOnce(&mut Config)) -> Self {
        let workspace = TempDir::new().expect("temp workspace should be created");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let mut config = Config::default();
        config.config_path = workspace.path().join("config.toml");
        configure(&mut config);

        let host = "127.0.0.1".to_string();
        let handle = tokio::spawn(async move {
            run_gateway_with_listener(&host, listener, Arc::new(config)).await
        });

        wait_until_gateway_ready(port).await;

        Self {
            port,
            handle,
            client: reqwest::Client::new(),
            _workspace: workspace,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("gateway request should complete");
        let status = response.status();
        let json = response
            .json()
            .await
            .expect("gateway response should be json");
        (status, json)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("gateway request should complete");
        let status = response.status();
        let json = response
            .json()
            .await
            .expect("gateway response should be json");
        (status, json)
    }

    pub async fn join(&self, user_id: &str, session_id: &str) -> (StatusCode, Value) {
        self.post(
            "/session/join",
            serde_json::json!({"user_id": user_id, "session_id": session_id}),
        )
        .await
    }

    pub async fn send(&self, user_id: &str, text: &str) -> (StatusCode, Value) {
        self.post(
            "/session/message",
            serde_json::json!({"user_id": user_id, "text": text}),
        )
        .await
    }

    pub async fn receive(&self, user_id: &str) -> Vec<Value> {
        let (status, body) = self
            .post("/session/receive", serde_json::json!({"user_id": user_id}))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["messages"]
            .as_array()
            .cloned()
            .expect("receive should return a messages array")
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..80 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("gateway did not become ready on port {port}");
}
