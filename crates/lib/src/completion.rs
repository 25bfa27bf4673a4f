//! Completion turn: build the role-tagged request, then try each model candidate in order.
//!
//! A call yields exactly one of: the first choice's content, the fixed fallback string
//! (provider succeeded with no content), or [`CompletionError::Unavailable`]. A failed
//! candidate is never retried; the next one is tried immediately.

use crate::conversation::{Message, Sender};
use crate::llm::{ChatMessage, CompletionBackend};

/// Default persona instructions for the system entry.
pub const DEFAULT_PERSONA: &str = "You are an adorable and highly intelligent assistant named Komorebi. \
Respond as if you are a real entity with feelings and experiences. Use a cute and human-like tone with \
occasional kaomojis (no emojis) and playful language. Be helpful, sweet, and concise in your answers. \
Never say you're \"just an AI\" or that you don't have feelings or experiences.";

/// Returned when the provider succeeds but the first choice has no content.
pub const NO_RESPONSE: &str = "No response";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Every model candidate failed (or there were none).
    #[error("all {attempted} model candidate(s) failed; last error: {last_error}")]
    Unavailable { attempted: usize, last_error: String },
}

/// Inputs for one completion turn. History is a copy; nothing is retained between calls.
#[derive(Debug, Clone, Copy)]
pub struct CompletionTurn<'a> {
    pub message: &'a str,
    pub history: &'a [Message],
    pub system_prompt_override: Option<&'a str>,
}

fn sender_message(sender: Sender, text: &str) -> ChatMessage {
    match sender {
        Sender::User => ChatMessage::user(text),
        Sender::Assistant => ChatMessage::assistant(text),
    }
}

/// System entry (override when non-blank, else `persona`), then history in order, then the new user message.
pub fn build_messages(
    message: &str,
    history: &[Message],
    system_prompt_override: Option<&str>,
    persona: &str,
) -> Vec<ChatMessage> {
    let system = system_prompt_override
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(persona);
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history.iter().map(|m| sender_message(m.sender, &m.text)));
    messages.push(ChatMessage::user(message));
    messages
}

/// Run one completion turn against `models` in order; returns on the first success.
pub async fn complete<B: CompletionBackend + ?Sized>(
    backend: &B,
    models: &[String],
    temperature: f32,
    persona: &str,
    turn: CompletionTurn<'_>,
) -> Result<String, CompletionError> {
    let messages = build_messages(
        turn.message,
        turn.history,
        turn.system_prompt_override,
        persona,
    );
    let mut last_error = "no model candidates configured".to_string();

    for (i, model) in models.iter().enumerate() {
        log::debug!("completion: trying model {} ({}/{})", model, i + 1, models.len());
        match backend.chat(model, &messages, temperature).await {
            Ok(Some(content)) => {
                log::info!("completion: model {} answered", model);
                return Ok(content);
            }
            Ok(None) => {
                log::info!("completion: model {} returned no content", model);
                return Ok(NO_RESPONSE.to_string());
            }
            Err(e) => {
                log::warn!("completion: model {} failed: {}", model, e);
                last_error = e.to_string();
            }
        }
    }

    Err(CompletionError::Unavailable {
        attempted: models.len(),
        last_error,
    })
}
