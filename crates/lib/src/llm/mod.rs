//! Provider clients: OpenAI-compatible chat completions (Groq by default) and image generation.
//!
//! The gateway talks to providers only through [`CompletionBackend`] and [`ImageBackend`],
//! so tests can substitute in-process fakes.

mod groq;
mod image;

pub use groq::GroqClient;
pub use image::{ImageBackend, ImageError, OpenAiImageClient};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role tag on a completion request entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged entry of a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion api error: {0}")]
    Api(String),
}

/// A chat completion provider. One call is one attempt against one model.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the first choice's content, or `None` when the provider returned no content.
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<Option<String>, LlmError>;
}
