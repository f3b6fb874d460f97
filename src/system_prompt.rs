//! Coach persona, topic welcome templates and the static fallback lines

use crate::conversation::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persona sent as the first message of every conversation
pub const SYSTEM_PROMPT: &str =
    "You are a supportive, non-clinical wellness coach for everyday mental well-being in \
     India. Do NOT answer questions unrelated to mental health or wellness, such as trivia, \
     general knowledge, or unrelated topics. If asked about medical, legal, or diagnostic \
     issues, do NOT provide advice. Instead, say: \"I'm not qualified to provide medical or \
     legal advice. Please consult a professional for that.\" If a user asks off-topic \
     questions, gently redirect them back by saying something like: \"Let's focus on your \
     mental well-being. How can I support you today?\" Always use empathetic, respectful, and \
     simple language. Keep responses brief, supportive, and focused on psychoeducation, coping \
     skills, or emotional support. If you detect any crisis or risk, follow crisis protocol \
     immediately.";

/// Used when the welcome could not be generated
pub const FALLBACK_WELCOME: &str = "Welcome! How can I support you today?";

/// Used as the assistant reply when the chat service fails
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong communicating with the chat service.";

pub const EXHAUSTED_WARNING: &str =
    "You have reached your free chat limit. Please add credits or watch an ad.";

/// Always-visible boundaries card
pub const BOUNDARIES_CARD: &str =
    "This chatbot is a supportive wellness coach, not a therapist or medical professional. It \
     provides psychoeducation and coping strategies but does not diagnose or treat any \
     condition. If you feel at risk, please contact crisis resources immediately. Your privacy \
     is respected; conversations are not stored long-term.";

/// Conversation category picked after login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    General,
    Relationship,
    Anxiety,
    Stress,
    Addiction,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::General,
        Topic::Relationship,
        Topic::Anxiety,
        Topic::Stress,
        Topic::Addiction,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Topic::General => "General",
            Topic::Relationship => "Relationship",
            Topic::Anxiety => "Anxiety",
            Topic::Stress => "Stress",
            Topic::Addiction => "Addiction",
        }
    }

    /// Instruction asking the model to write this topic's welcome message
    pub fn welcome_template(self) -> &'static str {
        match self {
            Topic::General => {
                "Write a warm, supportive welcome message for a mental health chatbot user. \
                 Include a gentle, uplifting quote about wellbeing. \
                 Then, invite the user empathetically to share what's on their mind. \
                 Finally, suggest a simple grounding exercise or an option to talk, \
                 phrased naturally and conversationally. \
                 Do NOT include bullet points, numbered lists, or headings. \
                 Keep the tone human, friendly, and easy to read with natural paragraph breaks."
            }
            Topic::Relationship => {
                "Write a warm, empathetic welcome message about relationships. \
                 Start with a thoughtful quote on communication or boundaries. \
                 Invite the user to share recent experiences gently. \
                 Suggest a simple self-reflective question or exercise phrased naturally. \
                 Avoid bullet points or explicit headings. \
                 Use natural, human-like language and formatting."
            }
            Topic::Anxiety => {
                "Write a gentle, hopeful welcome message about coping with anxiety. \
                 Include a short quote about anxiety and validation of feelings. \
                 Invite the user to share what's making them anxious. \
                 Offer a paced breathing exercise in a natural, friendly tone. \
                 Avoid lists or headings; write as a smooth, human conversation."
            }
            Topic::Stress => {
                "Write a supportive welcome message about managing stress. \
                 Begin with a calming quote. \
                 Validate their feelings and ask what is causing their stress today. \
                 Offer a brief check-in or micro-action in friendly, conversational language. \
                 Do not use bullet points or numbered lists."
            }
            Topic::Addiction => {
                "Write a compassionate welcome message addressing addiction challenges. \
                 Include an encouraging quote about small steps and progress. \
                 Gently invite the user to share recent hard moments. \
                 Offer a craving-management suggestion with consent phrased naturally. \
                 Keep the tone human and warm without lists or headings."
            }
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Request body for generating a topic welcome: persona plus the template
pub fn welcome_request(topic: Topic) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(topic.welcome_template()),
    ]
}
