//! Conversation store: the ordered message list and the transient chat flags.
//!
//! Messages are append-only. Ids are assigned from a per-conversation counter and only
//! give a stable rendering key; insertion order is the source of truth.

use serde::{Deserialize, Serialize};

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "bot")]
    Assistant,
}

/// How a message is rendered. An image message carries a URL in `text`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
}

/// One turn in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    #[serde(default)]
    pub kind: MessageKind,
}

/// In-memory conversation state for one chat. Rebuilt empty on every start; never persisted.
#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    next_id: u64,
    input: String,
    waiting: bool,
    system_prompt_override: Option<String>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, text: String, sender: Sender, kind: MessageKind) -> &Message {
        self.next_id += 1;
        self.messages.push(Message {
            id: self.next_id,
            text,
            sender,
            kind,
        });
        log::debug!(
            "conversation: appended {:?} message #{} ({} total)",
            sender,
            self.next_id,
            self.messages.len()
        );
        &self.messages[self.messages.len() - 1]
    }

    /// Append a user text message; returns the stored message.
    pub fn append_user_message(&mut self, text: impl Into<String>) -> &Message {
        self.push(text.into(), Sender::User, MessageKind::Text)
    }

    /// Append an assistant message of the given kind; returns the stored message.
    pub fn append_assistant_message(&mut self, text: impl Into<String>, kind: MessageKind) -> &Message {
        self.push(text.into(), Sender::Assistant, kind)
    }

    /// Replace the system prompt override. Blank text clears it. Only affects later sends.
    pub fn set_system_prompt_override(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.system_prompt_override = if text.trim().is_empty() { None } else { Some(text) };
    }

    pub fn system_prompt_override(&self) -> Option<&str> {
        self.system_prompt_override.as_deref()
    }

    /// The last `n` messages (fewer if the conversation is shorter), in original order.
    pub fn recent_window(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Current contents of the input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Take the input buffer, leaving it empty.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    /// True while a reply is outstanding; sending is disabled.
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    pub fn set_waiting(&mut self, waiting: bool) {
        self.waiting = waiting;
    }
}
