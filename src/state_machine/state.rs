//! Session state types

use crate::config::DEFAULT_TOP_UP_DELAY;
use crate::conversation::ConversationStore;
use crate::credits::{CreditLedger, FREE_CHAT_LIMIT};
use crate::system_prompt::Topic;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Longest accepted username, in characters
pub const MAX_USERNAME_CHARS: usize = 20;
/// Longest accepted chat message, in characters
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Screen a front end should show, derived from the session fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    LoggedOut,
    TopicSelection,
    Chatting,
    CrisisMode,
    Exhausted,
}

/// Effect the session is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pending {
    Welcome { topic: Topic },
    Reply,
    TopUp,
}

/// Full mutable state of one user's interaction.
///
/// Only `transition` produces new values; everything else reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub username: String,
    pub conversation: ConversationStore,
    pub ledger: CreditLedger,
    pub crisis_mode: bool,
    pub logged_in: bool,
    pub pending: Option<Pending>,
    pub started_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn topic(&self) -> Option<Topic> {
        self.conversation.topic()
    }

    pub fn credits(&self) -> u32 {
        self.ledger.balance()
    }

    pub fn chats_used(&self) -> u32 {
        self.ledger.chats_used()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn screen(&self) -> Screen {
        if !self.logged_in {
            Screen::LoggedOut
        } else if self.topic().is_none() {
            Screen::TopicSelection
        } else if self.crisis_mode {
            Screen::CrisisMode
        } else if self.ledger.is_exhausted() {
            Screen::Exhausted
        } else {
            Screen::Chatting
        }
    }
}

/// Per-session configuration plus what the runtime knows about the client
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub max_username_chars: usize,
    pub max_message_chars: usize,
    pub top_up_delay: Duration,
    pub starting_credits: u32,
    /// Refreshed by the runtime before every transition
    pub credential_available: bool,
    pub credential_name: String,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            max_username_chars: MAX_USERNAME_CHARS,
            max_message_chars: MAX_MESSAGE_CHARS,
            top_up_delay: DEFAULT_TOP_UP_DELAY,
            starting_credits: FREE_CHAT_LIMIT,
            credential_available: true,
            credential_name: String::new(),
        }
    }

    pub fn with_top_up_delay(mut self, delay: Duration) -> Self {
        self.top_up_delay = delay;
        self
    }

    pub fn with_starting_credits(mut self, credits: u32) -> Self {
        self.starting_credits = credits;
        self
    }
}
