//! Chat session: the front end's control flow around the conversation store.
//!
//! One send at a time. A send appends the user's message, marks the session waiting,
//! routes the input to the completion or image endpoint, then appends either the
//! result or an `Error: ...` message and clears the waiting flag. Nothing is rolled
//! back on failure.

use crate::client::{ClientError, GatewayClient};
use crate::command::{self, ChatRequest};
use crate::conversation::{ConversationStore, Message, MessageKind};
use async_trait::async_trait;

/// Default number of recent messages sent as context.
pub const DEFAULT_WINDOW: usize = 5;

/// Transport to the gateway. Implemented by [`GatewayClient`]; tests use fakes.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn complete(
        &self,
        message: &str,
        history: &[Message],
        custom_prompt: Option<&str>,
    ) -> Result<String, ClientError>;

    async fn generate_image(&self, prompt: &str) -> Result<String, ClientError>;
}

#[async_trait]
impl ChatTransport for GatewayClient {
    async fn complete(
        &self,
        message: &str,
        history: &[Message],
        custom_prompt: Option<&str>,
    ) -> Result<String, ClientError> {
        GatewayClient::complete(self, message, history, custom_prompt).await
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, ClientError> {
        GatewayClient::generate_image(self, prompt).await
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("nothing to send")]
    Empty,
    #[error("still waiting for the previous reply")]
    Busy,
}

/// A send that has been recorded but not yet answered.
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub request: ChatRequest,
    /// Context captured before the user's message was appended.
    pub history: Vec<Message>,
    pub system_prompt_override: Option<String>,
}

pub struct ChatSession<T> {
    store: ConversationStore,
    transport: T,
    window: usize,
}

impl<T: ChatTransport> ChatSession<T> {
    pub fn new(transport: T) -> Self {
        Self::with_window(transport, DEFAULT_WINDOW)
    }

    pub fn with_window(transport: T, window: usize) -> Self {
        Self {
            store: ConversationStore::new(),
            transport,
            window,
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Settings action: replace the system prompt override for later sends. Blank clears it.
    pub fn set_system_prompt(&mut self, text: impl Into<String>) {
        self.store.set_system_prompt_override(text);
    }

    /// Replace the pending input (what the user is typing).
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.store.set_input(text);
    }

    /// Begin a send from the input buffer. A busy session leaves the buffer untouched.
    pub fn begin_input(&mut self) -> Result<PendingSend, SendError> {
        if self.store.is_waiting() {
            return Err(SendError::Busy);
        }
        let input = self.store.take_input();
        self.begin(&input)
    }

    /// Record the user's input and mark the session waiting.
    pub fn begin(&mut self, input: &str) -> Result<PendingSend, SendError> {
        if self.store.is_waiting() {
            return Err(SendError::Busy);
        }
        let input = input.trim();
        if input.is_empty() {
            return Err(SendError::Empty);
        }
        let pending = PendingSend {
            request: command::classify(input),
            history: self.store.recent_window(self.window).to_vec(),
            system_prompt_override: self.store.system_prompt_override().map(str::to_string),
        };
        self.store.append_user_message(input);
        self.store.set_waiting(true);
        Ok(pending)
    }

    /// Call the gateway for a pending send. Does not touch the store; callers that
    /// use this directly must pass the outcome to [`finish`](Self::finish).
    pub async fn dispatch(&self, pending: &PendingSend) -> Result<(String, MessageKind), ClientError> {
        dispatch_to(&self.transport, pending).await
    }

    /// Append the outcome (or an error message in its place) and clear the waiting flag.
    pub fn finish(&mut self, outcome: Result<(String, MessageKind), ClientError>) -> &Message {
        self.store.set_waiting(false);
        match outcome {
            Ok((text, kind)) => self.store.append_assistant_message(text, kind),
            Err(e) => {
                log::warn!("chat: send failed: {}", e);
                self.store
                    .append_assistant_message(format!("Error: {}", e), MessageKind::Text)
            }
        }
    }

    /// Full send: begin, dispatch, finish. Returns the appended assistant message.
    ///
    /// Dropping the future mid-call keeps the user's message but clears the waiting flag.
    pub async fn send(&mut self, input: &str) -> Result<&Message, SendError> {
        let pending = self.begin(input)?;
        let outcome = {
            let _waiting = WaitingGuard(&mut self.store);
            dispatch_to(&self.transport, &pending).await
        };
        Ok(self.finish(outcome))
    }
}

async fn dispatch_to<T: ChatTransport + ?Sized>(
    transport: &T,
    pending: &PendingSend,
) -> Result<(String, MessageKind), ClientError> {
    match &pending.request {
        ChatRequest::Text { message } => transport
            .complete(message, &pending.history, pending.system_prompt_override.as_deref())
            .await
            .map(|reply| (reply, MessageKind::Text)),
        ChatRequest::Image { prompt } => transport
            .generate_image(prompt)
            .await
            .map(|url| (url, MessageKind::Image)),
    }
}

/// Clears the waiting flag on drop.
struct WaitingGuard<'a>(&'a mut ConversationStore);

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        if self.0.is_waiting() {
            log::debug!("chat: send dropped before a reply arrived");
        }
        self.0.set_waiting(false);
    }
}
