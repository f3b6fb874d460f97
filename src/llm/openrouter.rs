//! `OpenRouter` (and other `OpenAI`-compatible) chat-completion client

use super::types::SamplingParams;
use super::{ApiError, ChatClient};
use crate::config::CredentialSource;
use crate::conversation::Message;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Budget for one completion request, connect to last byte
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OpenRouterClient {
    client: Client,
    credentials: Arc<dyn CredentialSource>,
    model: String,
    url: String,
    sampling: SamplingParams,
}

impl OpenRouterClient {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, ApiError> {
        Self::with_timeout(url, model, credentials, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        url: impl Into<String>,
        model: impl Into<String>,
        credentials: Arc<dyn CredentialSource>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            credentials,
            model: model.into(),
            url: url.into(),
            sampling: SamplingParams::default(),
        })
    }

    fn build_request<'a>(&'a self, messages: &'a [Message]) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            messages,
            sampling: self.sampling,
        }
    }

    fn extract_reply(resp: CompletionResponse) -> Result<String, ApiError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::malformed("No choices in response"))?;

        choice
            .message
            .content
            .ok_or_else(|| ApiError::malformed("Response message has no content"))
    }
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, ApiError> {
        let api_key = self.credentials.api_key().ok_or_else(|| {
            ApiError::missing_credential(format!(
                "API key not found. Set {} to enable chat.",
                self.credentials.describe()
            ))
        })?;

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&self.build_request(messages))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::timeout(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ApiError::network(format!("Connection failed: {e}"))
                } else {
                    ApiError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::timeout(format!("Request timeout: {e}"))
            } else {
                ApiError::network(format!("Failed to read response: {e}"))
            }
        })?;

        if !status.is_success() {
            if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(ApiError::from_status(status.as_u16(), error_resp.error.message));
            }
            return Err(ApiError::from_status(status.as_u16(), body));
        }

        let completion: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::malformed(format!("Failed to parse response: {e}")))?;

        Self::extract_reply(completion)
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn has_credential(&self) -> bool {
        self.credentials.api_key().is_some()
    }

    fn credential_name(&self) -> &str {
        self.credentials.describe()
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(flatten)]
    sampling: SamplingParams,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
