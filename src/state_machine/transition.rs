//! Pure state transition function
//!
//! Given the same session, context and event this always produces the same
//! new session and effects. Remote calls and timers happen in the runtime,
//! which feeds their outcome back in as completion events.

use super::effect::Notice;
use super::state::{Pending, Screen};
use super::{Effect, Event, Session, SessionContext};
use crate::config::ConfigError;
use crate::conversation::Role;
use crate::credits::CreditLedger;
use crate::crisis::{contains_crisis_term, HELPLINE};
use crate::system_prompt::{
    Topic, EXHAUSTED_WARNING, FALLBACK_REPLY, FALLBACK_WELCOME, SYSTEM_PROMPT,
};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_session: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Session) -> Self {
        Self {
            new_session: session,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Bad user input; reported inline, the session is untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid username.")]
    BlankUsername,
    #[error("Username must be at most {max} characters.")]
    UsernameTooLong { max: usize },
    #[error("Please enter a message.")]
    EmptyMessage,
    #[error("Message must be at most {max} characters.")]
    MessageTooLong { max: usize },
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Session is busy, wait for the current action to finish")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    session: &Session,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    if event.is_user_action() && session.is_busy() {
        return Err(TransitionError::Busy);
    }

    match (session.screen(), event) {
        // ============================================================
        // Login
        // ============================================================
        (Screen::LoggedOut, Event::Login { username, at }) => {
            let username = validate_username(&username, context)?;
            let mut next = Session {
                ledger: CreditLedger::new(context.starting_credits),
                ..Session::default()
            };
            next.username = username;
            next.logged_in = true;
            next.started_at = Some(at);
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Topic selection
        // ============================================================
        (
            Screen::TopicSelection | Screen::Chatting | Screen::Exhausted,
            Event::SelectTopic { topic },
        ) => {
            let mut next = session.clone();
            next.pending = Some(Pending::Welcome { topic });
            Ok(TransitionResult::new(next).with_effect(Effect::RequestWelcome { topic }))
        }

        (_, Event::WelcomeReady { topic, text }) => {
            expect_pending(session, Pending::Welcome { topic }, "welcome_ready")?;
            Ok(TransitionResult::new(seed_topic(session, topic, text)))
        }

        (_, Event::WelcomeFailed { topic, error }) => {
            expect_pending(session, Pending::Welcome { topic }, "welcome_failed")?;
            Ok(
                TransitionResult::new(seed_topic(session, topic, FALLBACK_WELCOME.to_string()))
                    .with_effect(Effect::api_failure(error.kind, error.message)),
            )
        }

        // ============================================================
        // Chatting
        // ============================================================
        (Screen::Chatting | Screen::Exhausted, Event::SendMessage { text }) => {
            send_message(session, context, &text)
        }

        (Screen::CrisisMode, Event::SendMessage { .. }) => Err(TransitionError::InvalidTransition(
            "chat is closed while crisis support is shown; end the session to continue".to_string(),
        )),

        (_, Event::ReplyReady { text }) => {
            expect_pending(session, Pending::Reply, "reply_ready")?;
            let mut next = session.clone();
            next.conversation.append(Role::Assistant, text);
            next.ledger.record_chat();
            next.pending = None;
            Ok(TransitionResult::new(next))
        }

        // The turn still counts: a degraded answer is an answer
        (_, Event::ReplyFailed { error }) => {
            expect_pending(session, Pending::Reply, "reply_failed")?;
            let mut next = session.clone();
            next.conversation.append(Role::Assistant, FALLBACK_REPLY);
            next.ledger.record_chat();
            next.pending = None;
            Ok(TransitionResult::new(next)
                .with_effect(Effect::api_failure(error.kind, error.message)))
        }

        // ============================================================
        // Credits
        // ============================================================
        (Screen::Chatting | Screen::Exhausted, Event::AddCredit) => {
            let mut next = session.clone();
            next.pending = Some(Pending::TopUp);
            Ok(TransitionResult::new(next).with_effect(Effect::ScheduleTopUp {
                delay: context.top_up_delay,
            }))
        }

        (_, Event::TopUpComplete) => {
            expect_pending(session, Pending::TopUp, "top_up_complete")?;
            let mut next = session.clone();
            next.ledger.add_credit(1);
            next.pending = None;
            let balance = next.ledger.balance();
            Ok(TransitionResult::new(next).with_effect(Effect::Notify(Notice::CreditAdded {
                balance,
            })))
        }

        // ============================================================
        // Logout: full wipe from any logged-in screen
        // ============================================================
        (Screen::LoggedOut, Event::Logout) => Err(TransitionError::InvalidTransition(
            "not logged in".to_string(),
        )),

        (_, Event::Logout) => {
            Ok(TransitionResult::new(Session::default())
                .with_effect(Effect::Notify(Notice::LoggedOut)))
        }

        (screen, event) => Err(TransitionError::InvalidTransition(format!(
            "{} not accepted on {screen:?} screen",
            event.name()
        ))),
    }
}

fn validate_username(raw: &str, context: &SessionContext) -> Result<String, ValidationError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(ValidationError::BlankUsername);
    }
    if username.chars().count() > context.max_username_chars {
        return Err(ValidationError::UsernameTooLong {
            max: context.max_username_chars,
        });
    }
    Ok(username.to_string())
}

fn expect_pending(
    session: &Session,
    expected: Pending,
    event_name: &str,
) -> Result<(), TransitionError> {
    if session.pending == Some(expected) {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition(format!(
            "{event_name} while waiting on {:?}",
            session.pending
        )))
    }
}

fn seed_topic(session: &Session, topic: Topic, welcome: String) -> Session {
    let mut next = session.clone();
    next.conversation.reset(topic, SYSTEM_PROMPT, welcome);
    next.crisis_mode = false;
    next.pending = None;
    next
}

/// Crisis check, then eligibility, then credential; only then is the message
/// recorded and sent.
fn send_message(
    session: &Session,
    context: &SessionContext,
    raw: &str,
) -> Result<TransitionResult, TransitionError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyMessage.into());
    }
    if text.chars().count() > context.max_message_chars {
        return Err(ValidationError::MessageTooLong {
            max: context.max_message_chars,
        }
        .into());
    }

    if contains_crisis_term(text) {
        let mut next = session.clone();
        next.conversation.append(Role::User, text);
        next.crisis_mode = true;
        return Ok(TransitionResult::new(next).with_effect(Effect::Notify(Notice::CrisisDetected {
            helpline: HELPLINE.to_string(),
        })));
    }

    if !session.ledger.can_chat() {
        return Ok(
            TransitionResult::new(session.clone()).with_effect(Effect::warning(EXHAUSTED_WARNING))
        );
    }

    if !context.credential_available {
        let error = ConfigError::MissingCredential {
            var: context.credential_name.clone(),
        };
        return Ok(TransitionResult::new(session.clone())
            .with_effect(Effect::config_error(error.to_string())));
    }

    let mut next = session.clone();
    next.conversation.append(Role::User, text);
    next.pending = Some(Pending::Reply);
    let messages = next.conversation.all().to_vec();
    Ok(TransitionResult::new(next).with_effect(Effect::RequestReply { messages }))
}
