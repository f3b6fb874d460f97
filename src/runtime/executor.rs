//! Session runtime executor

use crate::conversation::Message;
use crate::llm::ChatClient;
use crate::state_machine::{
    transition, Effect, Event, Notice, Session, SessionContext, TransitionError,
};
use crate::system_prompt::{welcome_request, Topic};
use chrono::Utc;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// Everything the user should be told about one processed action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    pub notices: Vec<Notice>,
}

/// Owns one session and runs its effects to completion.
///
/// Each action is processed fully, remote calls included, before `dispatch`
/// returns; callers serialize access with the manager's per-session lock.
pub struct SessionRuntime {
    context: SessionContext,
    session: Session,
    client: Arc<dyn ChatClient>,
}

impl SessionRuntime {
    pub fn new(context: SessionContext, client: Arc<dyn ChatClient>) -> Self {
        Self {
            context,
            session: Session::default(),
            client,
        }
    }

    pub fn id(&self) -> &str {
        &self.context.session_id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn has_credential(&self) -> bool {
        self.client.has_credential()
    }

    pub async fn login(&mut self, username: &str) -> Result<ActionReport, TransitionError> {
        self.dispatch(Event::Login {
            username: username.to_string(),
            at: Utc::now(),
        })
        .await
    }

    pub async fn select_topic(&mut self, topic: Topic) -> Result<ActionReport, TransitionError> {
        self.dispatch(Event::SelectTopic { topic }).await
    }

    pub async fn send_message(&mut self, text: &str) -> Result<ActionReport, TransitionError> {
        self.dispatch(Event::SendMessage {
            text: text.to_string(),
        })
        .await
    }

    pub async fn add_credit(&mut self) -> Result<ActionReport, TransitionError> {
        self.dispatch(Event::AddCredit).await
    }

    pub async fn logout(&mut self) -> Result<ActionReport, TransitionError> {
        self.dispatch(Event::Logout).await
    }

    /// Process one event and every completion event its effects produce
    pub async fn dispatch(&mut self, event: Event) -> Result<ActionReport, TransitionError> {
        let mut report = ActionReport::default();
        let mut events = VecDeque::from([event]);

        while let Some(current) = events.pop_front() {
            self.context.credential_available = self.client.has_credential();
            self.context.credential_name = self.client.credential_name().to_string();

            let event_name = current.name();
            let result = match transition(&self.session, &self.context, current) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(
                        session_id = %self.context.session_id,
                        event = event_name,
                        error = %e,
                        "Transition rejected"
                    );
                    return Err(e);
                }
            };

            let old_screen = self.session.screen();
            self.session = result.new_session;
            let new_screen = self.session.screen();
            if old_screen != new_screen {
                tracing::info!(
                    session_id = %self.context.session_id,
                    from = ?old_screen,
                    to = ?new_screen,
                    "Screen changed"
                );
            }

            for effect in result.effects {
                if let Some(generated) = self.execute_effect(effect, &mut report).await {
                    events.push_back(generated);
                }
            }
        }

        Ok(report)
    }

    async fn execute_effect(&self, effect: Effect, report: &mut ActionReport) -> Option<Event> {
        match effect {
            Effect::RequestWelcome { topic } => Some(self.request_welcome(topic).await),
            Effect::RequestReply { messages } => Some(self.request_reply(&messages).await),
            Effect::ScheduleTopUp { delay } => {
                tracing::debug!(
                    session_id = %self.context.session_id,
                    delay_ms = %delay.as_millis(),
                    "Top-up started"
                );
                tokio::time::sleep(delay).await;
                Some(Event::TopUpComplete)
            }
            Effect::Notify(notice) => {
                if let Notice::CrisisDetected { .. } = &notice {
                    let matched = self
                        .session
                        .conversation
                        .last()
                        .map(|m| crate::crisis::matched_terms(&m.content))
                        .unwrap_or_default();
                    tracing::warn!(
                        session_id = %self.context.session_id,
                        terms = ?matched,
                        "Crisis terms detected, chat closed"
                    );
                }
                report.notices.push(notice);
                None
            }
        }
    }

    async fn request_welcome(&self, topic: Topic) -> Event {
        match self.client.complete(&welcome_request(topic)).await {
            Ok(text) => Event::WelcomeReady { topic, text },
            Err(error) => {
                tracing::warn!(
                    session_id = %self.context.session_id,
                    %topic,
                    error = %error,
                    "Welcome generation failed, using static welcome"
                );
                Event::WelcomeFailed { topic, error }
            }
        }
    }

    async fn request_reply(&self, messages: &[Message]) -> Event {
        match self.client.complete(messages).await {
            Ok(text) => Event::ReplyReady { text },
            Err(error) => Event::ReplyFailed { error },
        }
    }
}
