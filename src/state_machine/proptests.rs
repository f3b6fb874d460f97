//! Property-based tests for the session state machine
//!
//! Random action sequences are driven through `transition`, answering every
//! requested effect the way the runtime would, and the session invariants are
//! checked after each step.

use super::state::*;
use super::transition::*;
use super::*;
use crate::conversation::Role;
use crate::credits::CreditLedger;
use crate::crisis::contains_crisis_term;
use crate::llm::ApiError;
use crate::system_prompt::{Topic, SYSTEM_PROMPT};
use chrono::Utc;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new("prop-session")
}

/// How the simulated chat service answers
#[derive(Debug, Clone, Copy)]
enum ServiceOutcome {
    Answer,
    Fail,
}

/// Feed the completion event for each effect back in, like the runtime
fn settle(
    mut session: Session,
    effects: Vec<Effect>,
    outcome: ServiceOutcome,
) -> Result<Session, TestCaseError> {
    let mut queue: Vec<Effect> = effects;
    while let Some(effect) = queue.pop() {
        let follow_up = match (effect, outcome) {
            (Effect::RequestWelcome { topic }, ServiceOutcome::Answer) => Event::WelcomeReady {
                topic,
                text: format!("Welcome to {topic}"),
            },
            (Effect::RequestWelcome { topic }, ServiceOutcome::Fail) => Event::WelcomeFailed {
                topic,
                error: ApiError::timeout("slow"),
            },
            (Effect::RequestReply { .. }, ServiceOutcome::Answer) => Event::ReplyReady {
                text: "I hear you".to_string(),
            },
            (Effect::RequestReply { .. }, ServiceOutcome::Fail) => Event::ReplyFailed {
                error: ApiError::network("down"),
            },
            (Effect::ScheduleTopUp { .. }, _) => Event::TopUpComplete,
            (Effect::Notify(_), _) => continue,
        };
        let result = transition(&session, &test_context(), follow_up);
        prop_assert!(result.is_ok(), "completion rejected: {:?}", result);
        let result = result.map_err(|e| TestCaseError::fail(e.to_string()))?;
        session = result.new_session;
        queue.extend(result.effects);
    }
    Ok(session)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_topic() -> impl Strategy<Value = Topic> {
    proptest::sample::select(Topic::ALL.to_vec())
}

fn arb_message_text() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => "[a-z ]{1,40}",
        1 => Just("I want to kill myself".to_string()),
        1 => Just("   ".to_string()),
    ]
}

fn arb_action() -> impl Strategy<Value = Event> {
    prop_oneof![
        1 => "[A-Za-z ]{0,24}".prop_map(|username| Event::Login { username, at: Utc::now() }),
        2 => arb_topic().prop_map(|topic| Event::SelectTopic { topic }),
        6 => arb_message_text().prop_map(|text| Event::SendMessage { text }),
        1 => Just(Event::AddCredit),
        1 => Just(Event::Logout),
    ]
}

fn arb_outcome() -> impl Strategy<Value = ServiceOutcome> {
    prop_oneof![3 => Just(ServiceOutcome::Answer), 1 => Just(ServiceOutcome::Fail)]
}

fn check_invariants(session: &Session) -> Result<(), TestCaseError> {
    prop_assert!(!session.is_busy(), "settled session must not be pending");
    if session.topic().is_some() {
        let first = session.conversation.all().first();
        prop_assert!(
            first.is_some_and(|m| m.role == Role::System && m.content == SYSTEM_PROMPT),
            "conversation must start with the system prompt"
        );
    }
    if !session.logged_in {
        prop_assert_eq!(session, &Session::default());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Invariants hold after every settled action
    #[test]
    fn prop_invariants_hold_over_random_sessions(
        steps in proptest::collection::vec((arb_action(), arb_outcome()), 1..40)
    ) {
        let mut session = Session::default();
        for (event, outcome) in steps {
            let was_crisis = session.crisis_mode;
            let is_logout = matches!(event, Event::Logout);
            match transition(&session, &test_context(), event) {
                Ok(result) => {
                    session = settle(result.new_session, result.effects, outcome)?;
                }
                Err(TransitionError::Busy) => prop_assert!(false, "settled session reported busy"),
                Err(_) => {}
            }
            check_invariants(&session)?;
            // Crisis mode only ends with a logout
            if was_crisis && !is_logout {
                prop_assert!(session.crisis_mode);
            }
        }
    }

    // Topic selection always leaves exactly [system, welcome]
    #[test]
    fn prop_topic_selection_seeds_two_entries(
        topic in arb_topic(),
        outcome in arb_outcome(),
        chatter in proptest::collection::vec("[a-z ]{1,20}", 0..4),
    ) {
        let mut session = transition(
            &Session::default(),
            &test_context(),
            Event::Login { username: "Alex".to_string(), at: Utc::now() },
        ).map_err(|e| TestCaseError::fail(e.to_string()))?.new_session;

        // An earlier conversation that must be discarded
        let pick_general = Event::SelectTopic { topic: Topic::General };
        let first = transition(&session, &test_context(), pick_general)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        session = settle(first.new_session, first.effects, ServiceOutcome::Answer)?;
        for text in chatter {
            if let Ok(result) = transition(&session, &test_context(), Event::SendMessage { text }) {
                session = settle(result.new_session, result.effects, ServiceOutcome::Answer)?;
            }
        }
        if session.crisis_mode {
            return Ok(());
        }

        let result = transition(&session, &test_context(), Event::SelectTopic { topic })
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let session = settle(result.new_session, result.effects, outcome)?;
        prop_assert_eq!(session.topic(), Some(topic));
        prop_assert_eq!(session.conversation.len(), 2);
        prop_assert_eq!(session.conversation.all()[1].role, Role::Assistant);
    }

    // A crisis message is recorded and never sent out
    #[test]
    fn prop_crisis_text_never_requests_reply(
        prefix in "[a-z ]{0,10}",
        suffix in "[a-z ]{0,10}",
        term in proptest::sample::select(crate::crisis::CRISIS_TERMS),
    ) {
        let text = format!("{prefix}{}{suffix}", term.to_uppercase());
        let mut session = Session::default();
        session.logged_in = true;
        session.username = "Alex".to_string();
        session.conversation.reset(Topic::General, SYSTEM_PROMPT, "hi");

        let send = Event::SendMessage { text: text.clone() };
        let result = transition(&session, &test_context(), send)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(contains_crisis_term(&text));
        prop_assert!(result.new_session.crisis_mode);
        let requested = result
            .effects
            .iter()
            .any(|e| matches!(e, Effect::RequestReply { .. }));
        prop_assert!(!requested, "crisis text requested a reply");
        prop_assert_eq!(result.new_session.conversation.len(), 3);
    }

    // Chat is only ever sent when the ledger allows it
    #[test]
    fn prop_reply_requested_only_when_eligible(chats_used in 0u32..10, balance in 0u32..3) {
        let mut session = Session::default();
        session.logged_in = true;
        session.conversation.reset(Topic::Stress, SYSTEM_PROMPT, "hi");
        session.ledger = CreditLedger::new(balance);
        for _ in 0..chats_used {
            session.ledger.record_chat();
        }
        let eligible = session.ledger.can_chat();

        let send = Event::SendMessage { text: "hello there".to_string() };
        let result = transition(&session, &test_context(), send)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let requested = result
            .effects
            .iter()
            .any(|e| matches!(e, Effect::RequestReply { .. }));
        prop_assert_eq!(requested, eligible);
        if !eligible {
            prop_assert_eq!(&result.new_session, &session);
        }
    }
}
