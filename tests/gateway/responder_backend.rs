use super::gateway_harness::GatewayTestServer;
use blindchat::chat::FALLBACK_REPLY;
use blindchat::config::ResponderProvider;
use reqwest::StatusCode;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn compatible_backend_answers_with_transcript_context() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "messages": [
                {"role": "system"},
                {"role": "user", "content": "what's up"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "not much, you?"}}]
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let base_url = upstream.uri();
    let server = GatewayTestServer::start_with(move |config| {
        config.responder.provider = ResponderProvider::Compatible;
        config.responder.base_url = Some(base_url);
        config.responder.api_key = Some("sk-test-key".into());
        config.responder.model = "test-model".into();
    })
    .await;

    server.join("alice", "room1").await;
    let (status, _) = server.send("alice", "what's up").await;
    assert_eq!(status, StatusCode::OK);

    let messages = server.receive("alice").await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["text"], "not much, you?");
}

#[tokio::test]
async fn upstream_failure_still_produces_one_reply() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&upstream)
        .await;

    let base_url = upstream.uri();
    let server = GatewayTestServer::start_with(move |config| {
        config.responder.provider = ResponderProvider::Compatible;
        config.responder.base_url = Some(base_url);
        config.responder.api_key = Some("sk-test-key".into());
    })
    .await;

    server.join("alice", "room1").await;
    let (status, _) = server.send("alice", "hello?").await;
    assert_eq!(status, StatusCode::OK);

    let messages = server.receive("alice").await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["text"], FALLBACK_REPLY);
    assert_eq!(messages[0]["author"], "automated");

    let (_, info) = server.get("/session/info?user_id=alice").await;
    assert_eq!(info["message_count"], 2);
}
