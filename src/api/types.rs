//! API request and response types

use crate::conversation::Message;
use crate::crisis::{CRISIS_CARD, HELPLINE};
use crate::runtime::SessionRuntime;
use crate::state_machine::{Notice, Pending, Screen};
use crate::system_prompt::{Topic, BOUNDARIES_CARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to log in
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

/// Request to pick a topic
#[derive(Debug, Deserialize)]
pub struct TopicRequest {
    pub topic: Topic,
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Wallet banner: free usage and credit balance
#[derive(Debug, Serialize)]
pub struct WalletView {
    pub chats_used: u32,
    pub free_quota: u32,
    pub free_remaining: u32,
    pub credits: u32,
    pub can_chat: bool,
}

/// Safety message shown in crisis mode
#[derive(Debug, Serialize)]
pub struct CrisisCardView {
    pub message: &'static str,
    pub helpline: &'static str,
}

/// Everything needed to render the current screen
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub screen: Screen,
    pub username: String,
    pub topic: Option<Topic>,
    pub messages: Vec<Message>,
    pub wallet: WalletView,
    pub pending: Option<Pending>,
    pub boundaries: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crisis_card: Option<CrisisCardView>,
    pub chat_configured: bool,
    pub started_at: Option<DateTime<Utc>>,
}

impl SessionView {
    pub fn from_runtime(runtime: &SessionRuntime) -> Self {
        let session = runtime.session();
        let screen = session.screen();
        let ledger = &session.ledger;

        Self {
            session_id: runtime.id().to_string(),
            screen,
            username: session.username.clone(),
            topic: session.topic(),
            messages: session.conversation.transcript().cloned().collect(),
            wallet: WalletView {
                chats_used: session.chats_used(),
                free_quota: ledger.free_quota(),
                free_remaining: ledger.free_remaining(),
                credits: session.credits(),
                can_chat: ledger.can_chat(),
            },
            pending: session.pending,
            boundaries: BOUNDARIES_CARD,
            crisis_card: (screen == Screen::CrisisMode).then_some(CrisisCardView {
                message: CRISIS_CARD,
                helpline: HELPLINE,
            }),
            chat_configured: runtime.has_credential(),
            started_at: session.started_at,
        }
    }
}

/// Response for a new session
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub session: SessionView,
}

/// Response for every user action
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub session: SessionView,
    pub notices: Vec<Notice>,
}

/// Topic list for the selection screen
#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    pub topics: Vec<Topic>,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
