//! End-to-end: chat session -> gateway client -> gateway -> mock provider.

mod common;

use lib::chat::ChatSession;
use lib::client::{ClientError, GatewayClient};
use lib::conversation::{MessageKind, Sender};

#[tokio::test]
async fn hello_round_trip_through_gateway() {
    let (provider, _log) = common::spawn_mock_provider().await;
    let base = common::spawn_gateway(common::config_for(&provider, &["broken", "kitty"])).await;

    let mut session = ChatSession::new(GatewayClient::new(base));
    session.send("Hello!").await.unwrap();

    let messages = session.store().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!((messages[0].sender, messages[0].text.as_str()), (Sender::User, "Hello!"));
    assert_eq!(
        (messages[1].sender, messages[1].text.as_str()),
        (Sender::Assistant, "hi from kitty")
    );
}

#[tokio::test]
async fn system_prompt_override_reaches_provider() {
    let (provider, log) = common::spawn_mock_provider().await;
    let base = common::spawn_gateway(common::config_for(&provider, &["kitty"])).await;

    let mut session = ChatSession::new(GatewayClient::new(base));
    session.send("first").await.unwrap();
    session.set_system_prompt("Answer in haiku.");
    session.send("second").await.unwrap();

    let chat = log.chat.lock().unwrap();
    assert_ne!(chat[0]["messages"][0]["content"], "Answer in haiku.");
    assert_eq!(chat[1]["messages"][0]["content"], "Answer in haiku.");
    // history for the second call: "first" and its reply
    assert_eq!(chat[1]["messages"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn total_failure_appends_error_message() {
    let (provider, _log) = common::spawn_mock_provider().await;
    let base = common::spawn_gateway(common::config_for(&provider, &["broken"])).await;

    let mut session = ChatSession::new(GatewayClient::new(base));
    let reply = session.send("Hello!").await.unwrap().clone();
    assert_eq!(reply.text, "Error: Failed to get response from Komorebi");
    assert_eq!(session.store().len(), 2);
    assert!(!session.store().is_waiting());
}

#[tokio::test]
async fn image_command_through_gateway() {
    let (provider, log) = common::spawn_mock_provider().await;
    let base = common::spawn_gateway(common::config_for(&provider, &["kitty"])).await;

    let mut session = ChatSession::new(GatewayClient::new(base));
    let reply = session.send("/image a red fox").await.unwrap().clone();
    assert_eq!(reply.kind, MessageKind::Image);
    assert_eq!(reply.text, "https://x/y.png");
    assert_eq!(log.images.lock().unwrap()[0]["prompt"], "a red fox");
    assert!(log.chat_models().is_empty());
}

#[tokio::test]
async fn image_failure_is_raw_provider_text() {
    let (provider, _log) = common::spawn_mock_provider().await;
    let base = common::spawn_gateway(common::config_for(&provider, &["kitty"])).await;

    let client = GatewayClient::new(base.clone());
    match client.generate_image("fail").await {
        Err(ClientError::ImageGenerationFailed(raw)) => assert_eq!(raw, "rate limited, slow down"),
        other => panic!("expected ImageGenerationFailed, got {:?}", other),
    }

    let resp = reqwest::Client::new()
        .post(format!("{}/api/image", base))
        .json(&serde_json::json!({ "query": "fail" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);
    assert!(resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/plain")));
}
