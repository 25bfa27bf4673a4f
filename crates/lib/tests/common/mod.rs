//! Shared helpers: an in-process mock provider (chat completions + image generation)
//! and a gateway bound to a free port.
#![allow(dead_code)]

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use lib::config::Config;
use lib::gateway::{self, GatewayState};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Request bodies received by the mock provider, in arrival order.
#[derive(Clone, Default)]
pub struct ProviderLog {
    pub chat: Arc<Mutex<Vec<Value>>>,
    pub images: Arc<Mutex<Vec<Value>>>,
}

impl ProviderLog {
    pub fn chat_models(&self) -> Vec<String> {
        self.chat
            .lock()
            .unwrap()
            .iter()
            .map(|b| b["model"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn last_chat(&self) -> Value {
        self.chat.lock().unwrap().last().cloned().expect("no chat call recorded")
    }
}

/// Models named `broken*` fail with 500, `bare` answers 200 with an error body and no choices,
/// `silent` answers with an empty choice list, anything else replies `hi from <model>`.
async fn mock_chat(State(log): State<ProviderLog>, Json(body): Json<Value>) -> Response {
    let model = body["model"].as_str().unwrap_or_default().to_string();
    log.chat.lock().unwrap().push(body);
    if model.starts_with("broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model overloaded").into_response();
    }
    if model == "bare" {
        return Json(json!({ "error": { "message": "upstream overloaded" } })).into_response();
    }
    if model == "silent" {
        return Json(json!({ "choices": [] })).into_response();
    }
    Json(json!({
        "choices": [{ "message": { "role": "assistant", "content": format!("hi from {}", model) } }]
    }))
    .into_response()
}

/// Prompt `fail` gets a plain-text 429; anything else gets one image URL.
async fn mock_image(State(log): State<ProviderLog>, Json(body): Json<Value>) -> Response {
    let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
    log.images.lock().unwrap().push(body);
    if prompt == "fail" {
        return (StatusCode::TOO_MANY_REQUESTS, "rate limited, slow down").into_response();
    }
    Json(json!({ "created": 1, "data": [{ "url": "https://x/y.png" }] })).into_response()
}

/// Start the mock provider; returns its API root (e.g. `http://127.0.0.1:1234/v1`).
pub async fn spawn_mock_provider() -> (String, ProviderLog) {
    let log = ProviderLog::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(mock_chat))
        .route("/v1/images/generations", post(mock_image))
        .with_state(log.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock provider");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}/v1", addr), log)
}

/// Config pointing both providers at `provider_url` with the given model candidates.
pub fn config_for(provider_url: &str, models: &[&str]) -> Config {
    let mut config = Config::default();
    config.completion.base_url = provider_url.to_string();
    config.completion.models = models.iter().map(|m| m.to_string()).collect();
    config.image.base_url = provider_url.to_string();
    config
}

/// Start a gateway on a free port; returns its base URL.
pub async fn spawn_gateway(mut config: Config) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind gateway");
    let addr = listener.local_addr().expect("local_addr");
    config.gateway.port = addr.port();
    let state = GatewayState::from_config(config);
    tokio::spawn(async move {
        let _ = gateway::serve(listener, state).await;
    });
    format!("http://{}", addr)
}
