//! Mock implementations for testing
//!
//! These mocks enable runtime and API tests without real I/O.

use crate::conversation::Message;
use crate::llm::{ApiError, ChatClient};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

// ============================================================================
// Mock Chat Client
// ============================================================================

/// Mock chat client that returns queued replies
pub struct MockChatClient {
    replies: Mutex<VecDeque<Result<String, ApiError>>>,
    model_id: String,
    credential: AtomicBool,
    /// Record of every history sent
    pub requests: Mutex<Vec<Vec<Message>>>,
}

impl MockChatClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            credential: AtomicBool::new(true),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: ApiError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn set_credential(&self, present: bool) {
        self.credential.store(present, Ordering::SeqCst);
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, ApiError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        if !self.has_credential() {
            return Err(ApiError::missing_credential(
                "API key not found. Set MOCK_KEY to enable chat.",
            ));
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::network("No mock reply queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn has_credential(&self) -> bool {
        self.credential.load(Ordering::SeqCst)
    }

    fn credential_name(&self) -> &str {
        "MOCK_KEY"
    }
}
