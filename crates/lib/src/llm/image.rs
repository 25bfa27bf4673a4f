//! Image generation client over the OpenAI-compatible images API.
//! One-shot: a text prompt in, one image URL out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Provider answered with something other than a well-formed success payload; carries its raw text.
    #[error("{0}")]
    Failed(String),
    #[error("image request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// An image generation provider.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ImageError>;
}

#[derive(Clone)]
pub struct OpenAiImageClient {
    base_url: String,
    api_key: Option<String>,
    model: Option<String>,
    size: Option<String>,
    client: reqwest::Client,
}

impl OpenAiImageClient {
    pub fn new(
        base_url: Option<String>,
        api_key: Option<String>,
        model: Option<String>,
        size: Option<String>,
        timeout: Option<Duration>,
    ) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().unwrap_or_else(|e| {
            log::warn!("building http client with timeout failed, using defaults: {}", e);
            reqwest::Client::new()
        });
        Self {
            base_url,
            api_key,
            model,
            size,
            client,
        }
    }
}

#[async_trait]
impl ImageBackend for OpenAiImageClient {
    /// POST /images/generations — returns the URL of the first generated image.
    async fn generate(&self, prompt: &str) -> Result<String, ImageError> {
        let url = format!("{}/images/generations", self.base_url);
        let body = ImageGenerationRequest {
            prompt,
            n: 1,
            model: self.model.as_deref(),
            size: self.size.as_deref(),
        };
        let mut req = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(ImageError::Failed(text));
        }
        parse_image_url(&text)
    }
}

/// Extract `data[0].url` from a provider success body. Anything else is a failure carrying the raw text.
fn parse_image_url(text: &str) -> Result<String, ImageError> {
    let data: ImageGenerationResponse =
        serde_json::from_str(text).map_err(|_| ImageError::Failed(text.to_string()))?;
    data.data
        .into_iter()
        .next()
        .and_then(|d| d.url)
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ImageError::Failed(text.to_string()))
}

#[derive(Debug, Serialize)]
struct ImageGenerationRequest<'a> {
    prompt: &'a str,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    url: Option<String>,
}
