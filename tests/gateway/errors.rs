use super::gateway_harness::GatewayTestServer;
use reqwest::StatusCode;
use serde_json::Value;

fn error_message(body: &Value) -> &str {
    body.get("error")
        .and_then(Value::as_str)
        .expect("error responses should carry an error string")
}

#[tokio::test]
async fn registry_failures_map_to_status_codes() {
    let server = GatewayTestServer::start().await;

    server.join("bob", "human-room").await;
    let (status, body) = server.send("bob", "hello?").await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert!(error_message(&body).contains("waiting"));

    server.join("carol", "human-room").await;
    let (status, body) = server.join("mallory", "human-room").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(error_message(&body).contains("human-room"));

    let (status, _) = server.send("ghost", "boo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server.join("ai-impostor", "room1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_message(&body).contains("reserved"));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let server = GatewayTestServer::start().await;

    let response = reqwest::Client::new()
        .post(server.url("/session/join"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("malformed request should complete");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("error should be json");
    assert!(!error_message(&body).is_empty());

    let (status, _) = server
        .post(
            "/session/answer",
            serde_json::json!({"user_id": "alice", "guess": "robot"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = GatewayTestServer::start().await;
    server.join("alice", "room1").await;

    let huge = "x".repeat(70_000);
    let response = reqwest::Client::new()
        .post(server.url("/session/message"))
        .json(&serde_json::json!({"user_id": "alice", "text": huge}))
        .send()
        .await
        .expect("oversized request should complete");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
