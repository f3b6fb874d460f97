//! Chat service abstraction
//!
//! One trait for "send the whole history, get the reply text back", the
//! `OpenRouter` implementation, and a logging decorator.

mod error;
mod openrouter;
mod types;

pub use error::{ApiError, ApiErrorKind};
pub use openrouter::OpenRouterClient;

use crate::conversation::Message;
use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for chat-completion providers
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send the full history and return the assistant reply
    async fn complete(&self, messages: &[Message]) -> Result<String, ApiError>;

    fn model_id(&self) -> &str;

    /// Whether a credential is currently configured
    fn has_credential(&self) -> bool;

    /// Where the credential is expected to come from, for user-facing messages
    fn credential_name(&self) -> &str;
}

/// Logging wrapper for chat clients
pub struct LoggingClient {
    inner: Arc<dyn ChatClient>,
    model_id: String,
}

impl LoggingClient {
    pub fn new(inner: Arc<dyn ChatClient>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl ChatClient for LoggingClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, ApiError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(messages).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    messages = messages.len(),
                    reply_chars = reply.chars().count(),
                    "Chat completion succeeded"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    messages = messages.len(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Chat completion failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn has_credential(&self) -> bool {
        self.inner.has_credential()
    }

    fn credential_name(&self) -> &str {
        self.inner.credential_name()
    }
}
