//! Per-session conversation transcript

use crate::system_prompt::Topic;
use serde::{Deserialize, Serialize};

/// Message role, serialized the way chat-completion endpoints expect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Append-only message log, replaced wholesale when a topic is picked.
///
/// Entries are only handed out as shared references, so appended messages
/// never change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationStore {
    topic: Option<Topic>,
    messages: Vec<Message>,
}

impl ConversationStore {
    /// Start over with `[system, assistant(welcome)]` for `topic`
    pub fn reset(
        &mut self,
        topic: Topic,
        system_prompt: impl Into<String>,
        welcome_message: impl Into<String>,
    ) {
        self.topic = Some(topic);
        self.messages = vec![
            Message::system(system_prompt),
            Message::assistant(welcome_message),
        ];
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn topic(&self) -> Option<Topic> {
        self.topic
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Messages a reader sees: everything except the system prompt
    pub fn transcript(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }
}
