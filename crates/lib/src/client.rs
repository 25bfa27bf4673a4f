//! HTTP client for the gateway endpoints, used by chat front ends.

use crate::conversation::Message;
use crate::gateway::{CompletionRequest, CompletionResponse, ErrorResponse, ImageRequest, ImageResponse};
use reqwest::header::CONTENT_TYPE;

const DEFAULT_COMPLETION_ERROR: &str = "Failed to get response from Komorebi";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Gateway reported that no model candidate could answer (or another completion failure).
    #[error("{0}")]
    CompletionUnavailable(String),
    /// Raw image provider text, surfaced verbatim.
    #[error("{0}")]
    ImageGenerationFailed(String),
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),
}

/// Client for a running gateway (e.g. `http://127.0.0.1:15160`).
#[derive(Clone)]
pub struct GatewayClient {
    base_url: String,
    client: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /api/chat — returns the assistant reply.
    pub async fn complete(
        &self,
        message: &str,
        history: &[Message],
        custom_prompt: Option<&str>,
    ) -> Result<String, ClientError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = CompletionRequest {
            message: message.to_string(),
            messages: history.to_vec(),
            custom_prompt: custom_prompt.map(str::to_string),
        };
        let res = self.client.post(&url).json(&body).send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error)
                .ok()
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COMPLETION_ERROR.to_string());
            log::debug!("gateway chat returned {}: {}", status, message);
            return Err(ClientError::CompletionUnavailable(message));
        }
        let data: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ClientError::MalformedResponse(format!("{}: {}", e, text)))?;
        Ok(data.response)
    }

    /// POST /api/image — returns the image URL. Non-JSON or malformed bodies are failures carrying the raw text.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, ClientError> {
        let url = format!("{}/api/image", self.base_url);
        let body = ImageRequest {
            query: prompt.to_string(),
        };
        let res = self.client.post(&url).json(&body).send().await?;
        let status = res.status();
        let is_json = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));
        let text = res.text().await?;
        if !is_json || !status.is_success() {
            log::debug!("gateway image returned {} (json: {})", status, is_json);
            return Err(ClientError::ImageGenerationFailed(text));
        }
        parse_image_response(&text)
    }
}

fn parse_image_response(text: &str) -> Result<String, ClientError> {
    serde_json::from_str::<ImageResponse>(text)
        .ok()
        .map(|r| r.image_url)
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ClientError::ImageGenerationFailed(text.to_string()))
}
