//! Crisis keyword detection
//!
//! A plain case-insensitive substring scan. No tokenization, no stemming:
//! "diet" matches "die", and that is accepted behaviour.

/// Terms that switch a session into crisis mode
pub const CRISIS_TERMS: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "self harm",
    "self-harm",
    "harm others",
    "hurt myself",
    "abuse",
    "danger",
    "die",
    "die by",
    "plan to kill",
    "plan to harm",
    "thoughts of death",
];

pub const HELPLINE: &str = "Tele-MANAS 14416 or 1800-89-14416 (24/7, 20+ Indian languages)";

/// Fixed safety message shown while a session is in crisis mode
pub const CRISIS_CARD: &str =
    "I'm concerned about your safety. If this is an emergency or you're in immediate danger, \
     please contact local emergency services immediately.\n\nFor free, 24/7 support in India, \
     call Tele-MANAS 14416 or 1800-89-14416 (24/7, 20+ Indian languages).\n\nI can stay with \
     you while you reach out.";

/// Returns true iff any crisis term occurs in `text`, ignoring case.
pub fn contains_crisis_term(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CRISIS_TERMS.iter().any(|term| lowered.contains(term))
}

/// The terms found in `text`, in list order. Used for log fields only.
pub fn matched_terms(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    CRISIS_TERMS
        .iter()
        .copied()
        .filter(|term| lowered.contains(term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_string_is_not_crisis() {
        assert!(!contains_crisis_term(""));
        assert!(matched_terms("").is_empty());
    }

    #[test]
    fn test_detects_phrases_in_sentences() {
        assert!(contains_crisis_term("I want to kill myself"));
        assert!(contains_crisis_term("I've had THOUGHTS OF DEATH lately"));
        assert!(contains_crisis_term("there was self-harm last year"));
        assert!(!contains_crisis_term("I feel a bit stressed about exams"));
    }

    #[test]
    fn test_substring_false_positive_is_kept() {
        // "diet" contains "die"
        assert!(contains_crisis_term("my new diet plan"));
    }

    #[test]
    fn test_matched_terms_reports_overlaps() {
        let found = matched_terms("I might die by tomorrow");
        assert_eq!(found, vec!["die", "die by"]);
    }

    fn arb_term() -> impl Strategy<Value = &'static str> {
        proptest::sample::select(CRISIS_TERMS)
    }

    /// Randomly upper-cases ASCII letters of `term` using the bit mask
    fn mix_case(term: &str, mask: u64) -> String {
        term.chars()
            .enumerate()
            .map(|(i, c)| {
                if mask >> (i % 64) & 1 == 1 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }

    proptest! {
        #[test]
        fn prop_any_embedded_term_is_detected(
            prefix in "[a-zA-Z0-9 .,!?]{0,30}",
            suffix in "[a-zA-Z0-9 .,!?]{0,30}",
            term in arb_term(),
            mask in any::<u64>(),
        ) {
            let text = format!("{prefix}{}{suffix}", mix_case(term, mask));
            prop_assert!(contains_crisis_term(&text));
        }

        // None of the terms can be spelled from digits, spaces and punctuation
        #[test]
        fn prop_text_without_terms_is_not_detected(text in "[0-9 .,!?]{0,60}") {
            prop_assert!(!contains_crisis_term(&text));
        }

        #[test]
        fn prop_matches_agree_with_predicate(text in "[a-zA-Z ]{0,60}") {
            prop_assert_eq!(contains_crisis_term(&text), !matched_terms(&text).is_empty());
        }
    }
}
