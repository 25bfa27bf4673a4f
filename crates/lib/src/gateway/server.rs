//! Gateway HTTP server.

use crate::completion::{self, CompletionTurn, DEFAULT_PERSONA, DEFAULT_TEMPERATURE};
use crate::config::{self, Config};
use crate::gateway::error::GatewayError;
use crate::gateway::protocol::{CompletionRequest, CompletionResponse, ImageRequest, ImageResponse};
use crate::llm::{CompletionBackend, GroqClient, ImageBackend, ImageError, OpenAiImageClient};
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state for the gateway (config, provider clients, resolved model candidates).
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub completion: Arc<dyn CompletionBackend>,
    pub image: Arc<dyn ImageBackend>,
    /// Model candidate list, fixed for the lifetime of the gateway.
    pub models: Arc<Vec<String>>,
    /// Persona instructions used when a request carries no override.
    pub persona: Arc<str>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl GatewayState {
    /// State with the given provider clients; models and persona come from config.
    pub fn new(
        config: Config,
        completion: Arc<dyn CompletionBackend>,
        image: Arc<dyn ImageBackend>,
    ) -> Self {
        let models = config.completion.candidates();
        let persona: Arc<str> = config
            .completion
            .persona
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PERSONA)
            .into();
        Self {
            config: Arc::new(config),
            completion,
            image,
            models: Arc::new(models),
            persona,
            started_at: chrono::Utc::now(),
        }
    }

    /// State backed by the HTTP provider clients described in config.
    pub fn from_config(config: Config) -> Self {
        let completion_key = config::resolve_completion_api_key(&config);
        if completion_key.is_none() {
            log::warn!("no completion api key configured (set GROQ_API_KEY); provider calls will likely fail");
        }
        let completion = GroqClient::new(
            Some(config.completion.base_url.clone()),
            completion_key,
            config.completion.timeout(),
        );
        let image = OpenAiImageClient::new(
            Some(config.image.base_url.clone()),
            config::resolve_image_api_key(&config),
            config.image.model.clone(),
            config.image.size.clone(),
            config.image.timeout(),
        );
        Self::new(config, Arc::new(completion), Arc::new(image))
    }
}

/// Routes: `GET /` health, `POST /api/chat` completion, `POST /api/image` image generation.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/api/chat", post(chat_http))
        .route("/api/image", post(image_http))
        .with_state(state)
}

/// Run the gateway: bind from config and serve until SIGINT/SIGTERM.
pub async fn run_gateway(config: Config) -> Result<()> {
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let state = GatewayState::from_config(config);
    log::info!(
        "model candidates: {}",
        state.models.as_slice().join(", ")
    );
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);
    serve(listener, state).await
}

/// Serve on an already-bound listener with graceful shutdown.
pub async fn serve(listener: tokio::net::TcpListener, state: GatewayState) -> Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for liveness checks).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "service": "komorebi",
        "port": state.config.gateway.port,
        "models": state.models.as_slice(),
        "startedAt": state.started_at.to_rfc3339(),
    }))
}

/// POST /api/chat — one completion turn with model fallback.
async fn chat_http(
    State(state): State<GatewayState>,
    payload: Result<Json<CompletionRequest>, JsonRejection>,
) -> Result<Json<CompletionResponse>, GatewayError> {
    let request_id = uuid::Uuid::new_v4();
    let Json(req) = payload.map_err(|e| {
        log::debug!("[{}] rejected chat request: {}", request_id, e.body_text());
        GatewayError::MalformedClientRequest(e.body_text())
    })?;

    let window = state.config.conversation.window;
    let history = &req.messages[req.messages.len().saturating_sub(window)..];
    if history.len() < req.messages.len() {
        log::debug!(
            "[{}] history truncated from {} to {} message(s)",
            request_id,
            req.messages.len(),
            history.len()
        );
    }
    log::info!(
        "[{}] chat: {} history message(s), override: {}",
        request_id,
        history.len(),
        req.custom_prompt.as_deref().is_some_and(|p| !p.trim().is_empty())
    );

    let turn = CompletionTurn {
        message: &req.message,
        history,
        system_prompt_override: req.custom_prompt.as_deref(),
    };
    match completion::complete(
        state.completion.as_ref(),
        &state.models,
        DEFAULT_TEMPERATURE,
        &state.persona,
        turn,
    )
    .await
    {
        Ok(response) => Ok(Json(CompletionResponse { response })),
        Err(e) => {
            log::error!("[{}] chat failed: {}", request_id, e);
            Err(GatewayError::CompletionUnavailable)
        }
    }
}

/// POST /api/image — generate one image for `query`.
async fn image_http(
    State(state): State<GatewayState>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<ImageResponse>, GatewayError> {
    let request_id = uuid::Uuid::new_v4();
    let Json(req) = payload.map_err(|e| {
        log::debug!("[{}] rejected image request: {}", request_id, e.body_text());
        GatewayError::MalformedClientRequest(e.body_text())
    })?;
    log::info!("[{}] image: query of {} byte(s)", request_id, req.query.len());

    match state.image.generate(&req.query).await {
        Ok(image_url) => Ok(Json(ImageResponse { image_url })),
        Err(ImageError::Failed(raw)) => {
            log::warn!("[{}] image provider failed: {}", request_id, raw);
            Err(GatewayError::ImageGenerationFailed(raw))
        }
        Err(e) => {
            log::warn!("[{}] image request failed: {}", request_id, e);
            Err(GatewayError::ImageGenerationFailed(e.to_string()))
        }
    }
}
