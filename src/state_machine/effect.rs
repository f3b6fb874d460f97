//! Effects produced by state transitions

use crate::conversation::Message;
use crate::llm::ApiErrorKind;
use crate::system_prompt::Topic;
use serde::Serialize;
use std::time::Duration;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the chat service for a topic welcome
    RequestWelcome { topic: Topic },

    /// Send the full history to the chat service
    RequestReply { messages: Vec<Message> },

    /// Simulated ad or payment, then credit the session
    ScheduleTopUp { delay: Duration },

    /// Tell the user something
    Notify(Notice),
}

/// User-facing report attached to an action's outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// Chat blocked, e.g. credits exhausted
    Warning { message: String },
    /// The chat service failed and a fallback line was used
    ServiceDegraded { kind: ApiErrorKind, message: String },
    /// Chat disabled until the credential is configured
    ConfigError { message: String },
    CrisisDetected { helpline: String },
    CreditAdded { balance: u32 },
    LoggedOut,
}

impl Effect {
    pub fn warning(message: impl Into<String>) -> Self {
        Effect::Notify(Notice::Warning {
            message: message.into(),
        })
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Effect::Notify(Notice::ConfigError {
            message: message.into(),
        })
    }

    /// Report a failed chat call, split by whether configuration is to blame
    pub fn api_failure(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        if kind.is_config() {
            Effect::Notify(Notice::ConfigError { message })
        } else {
            Effect::Notify(Notice::ServiceDegraded { kind, message })
        }
    }
}
