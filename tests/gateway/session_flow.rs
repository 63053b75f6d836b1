use super::gateway_harness::GatewayTestServer;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn automated_session_scenario() {
    let server = GatewayTestServer::start().await;

    let (status, joined) = server.join("alice", "room1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["status"], "joined");
    assert_eq!(joined["participants"], 2);
    assert_eq!(joined["kind"], "automated");

    let (status, sent) = server.send("alice", "hi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["status"], "sent");

    let (_, info) = server.get("/session/info?user_id=alice").await;
    assert_eq!(info["message_count"], 2);

    let messages = server.receive("alice").await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["author"], "automated");
    assert_eq!(messages[0]["text"], "you said: hi");
    assert!(
        messages[0]["sender_id"]
            .as_str()
            .is_some_and(|id| id.starts_with("ai-"))
    );
    assert!(server.receive("alice").await.is_empty());

    let (status, answer) = server
        .post(
            "/session/answer",
            serde_json::json!({"user_id": "alice", "guess": "automated"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answer["correct"], true);
    assert_eq!(answer["actual"], "automated");

    let (status, _) = server.get("/session/info?user_id=alice").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, pending) = server.get("/session/pending?user_id=alice").await;
    assert_eq!(pending["pending"], 0);
}

#[tokio::test]
async fn human_session_scenario() {
    let server = GatewayTestServer::start().await;

    let (_, bob) = server.join("bob", "human-room").await;
    assert_eq!(bob["status"], "waiting");
    assert_eq!(bob["kind"], "human");

    let (_, carol) = server.join("carol", "human-room").await;
    assert_eq!(carol["status"], "joined");
    assert_eq!(carol["participants"], 2);

    server.send("bob", "are you real?").await;
    let (_, pending) = server.get("/session/pending?user_id=carol").await;
    assert_eq!(pending["pending"], 1);

    let response = reqwest::Client::new()
        .post(server.url("/session/receive?format=text"))
        .json(&serde_json::json!({"user_id": "carol"}))
        .send()
        .await
        .expect("receive request should complete");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("receive should return json");
    assert_eq!(body["messages"], serde_json::json!(["are you real?"]));

    let (_, health) = server.get("/health").await;
    assert_eq!(health["sessions"], 1);
    assert_eq!(health["participants"], 2);
    assert_eq!(health["waiting"], 0);

    let (status, left) = server
        .post("/session/leave", serde_json::json!({"user_id": "bob"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(left["status"], "left");

    let (_, info) = server.get("/session/info?user_id=carol").await;
    assert_eq!(info["participants"], serde_json::json!(["carol"]));
}
