//! UI-agnostic conversation state types
//!
//! This module contains the transcript data structures shared by every front
//! end (the TUI and the one-shot CLI commands). Nothing here depends on a UI
//! framework or on the network.

use serde::{Deserialize, Serialize};

/// Greeting that opens every conversation.
pub const GREETING: &str = "👋 Halo! Saya adalah asisten nutrisi McDonald's bertenaga AI. \
Saya siap membantu Anda mengetahui informasi nutrisi seperti kalori, gula, garam, dan lemak \
dari menu favorit Anda. Silakan tanyakan apa saja!";

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Append-only transcript. Always holds at least the greeting.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Drop the transcript and start again from the greeting.
    pub(crate) fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(ChatMessage::assistant(GREETING));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true; the greeting is always present.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
