//! Owned conversation history.

use crate::types::{ChatMessage, ChatRequest, Role, SteeringDirective};

/// History of one chat session, passed explicitly into every turn.
///
/// A turn is committed atomically with [`commit_turn`](Self::commit_turn)
/// once its response has fully streamed; a cancelled or failed turn leaves
/// the history as it was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    messages: Vec<ChatMessage>,
}

impl ConversationState {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// History seeded with a system prompt that survives [`clear`](Self::clear).
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(prompt)],
        }
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// Append an assistant message.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Build the request for a new turn without touching the history.
    pub fn request_for(&self, prompt: &str, steering: SteeringDirective) -> ChatRequest {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.extend(self.messages.iter().cloned());
        messages.push(ChatMessage::user(prompt));
        ChatRequest {
            model: None,
            messages,
            steering,
        }
    }

    /// Record a completed turn: the user prompt and the full response.
    pub fn commit_turn(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.push_user(prompt);
        self.push_assistant(response);
    }

    /// Forget the conversation, keeping system messages.
    pub fn clear(&mut self) {
        self.messages.retain(|m| m.role == Role::System);
    }
}
