//! Events that can occur in a session

use crate::llm::ApiError;
use crate::system_prompt::Topic;
use chrono::{DateTime, Utc};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User actions
    Login {
        username: String,
        at: DateTime<Utc>,
    },
    SelectTopic {
        topic: Topic,
    },
    SendMessage {
        text: String,
    },
    AddCredit,
    Logout,

    // Effect completions
    WelcomeReady {
        topic: Topic,
        text: String,
    },
    WelcomeFailed {
        topic: Topic,
        error: ApiError,
    },
    ReplyReady {
        text: String,
    },
    ReplyFailed {
        error: ApiError,
    },
    TopUpComplete,
}

impl Event {
    /// Short name for logs and error messages; never includes user text
    pub fn name(&self) -> &'static str {
        match self {
            Event::Login { .. } => "login",
            Event::SelectTopic { .. } => "select_topic",
            Event::SendMessage { .. } => "send_message",
            Event::AddCredit => "add_credit",
            Event::Logout => "logout",
            Event::WelcomeReady { .. } => "welcome_ready",
            Event::WelcomeFailed { .. } => "welcome_failed",
            Event::ReplyReady { .. } => "reply_ready",
            Event::ReplyFailed { .. } => "reply_failed",
            Event::TopUpComplete => "top_up_complete",
        }
    }

    pub fn is_user_action(&self) -> bool {
        matches!(
            self,
            Event::Login { .. }
                | Event::SelectTopic { .. }
                | Event::SendMessage { .. }
                | Event::AddCredit
                | Event::Logout
        )
    }
}
