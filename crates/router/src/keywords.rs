//! The canonical keyword-to-route table.
//!
//! One versioned table with documented precedence replaces the
//! keyword lists that previously drifted apart across ad-hoc matching
//! helpers. `classify` consults these in a fixed priority order; see
//! [`crate::classify`].

use std::sync::OnceLock;

use regex::Regex;

/// Bumped whenever a keyword list changes, so behaviour differences
/// between deployments can be traced to a table revision.
pub const KEYWORD_TABLE_VERSION: u32 = 1;

/// Messages containing any of these (case-insensitive substring match)
/// are treated as escalation requests.
pub const ESCALATION_KEYWORDS: &[&str] = &[
    "refund",
    "cancel",
    "human",
    "agent",
    "talk to agent",
    "speak to human",
    "complain",
    "not happy",
    "escalate",
    "real person",
];

/// Heuristics marking a message as a question about the uploaded
/// document. Only consulted when a document index is present.
pub const DOC_QUESTION_KEYWORDS: &[&str] = &[
    "document",
    "manual",
    "guide",
    "how to",
    "based on",
    "policy",
    "according to",
];

/// Case-insensitive substring match against a keyword list.
pub fn contains_any(message: &str, keywords: &[&str]) -> bool {
    let lowered = message.to_lowercase();
    keywords.iter().any(|k| lowered.contains(k))
}

/// Find the first token with `local-part@domain` shape in the message.
pub fn find_email(message: &str) -> Option<&str> {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        // Requires at least one dot in the domain part.
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+")
            .expect("email regex is valid")
    });
    re.find(message).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalation_keywords_match_case_insensitively() {
        assert!(contains_any("I want a REFUND now", ESCALATION_KEYWORDS));
        assert!(contains_any("please let me Speak To Human", ESCALATION_KEYWORDS));
        assert!(!contains_any("how is the weather", ESCALATION_KEYWORDS));
    }

    #[test]
    fn doc_keywords_match_inside_sentences() {
        assert!(contains_any(
            "according to the manual, how do I reset?",
            DOC_QUESTION_KEYWORDS
        ));
        assert!(!contains_any("what's my order status", DOC_QUESTION_KEYWORDS));
    }

    #[test]
    fn finds_email_token_in_prose() {
        assert_eq!(
            find_email("my email is jane@example.com thanks"),
            Some("jane@example.com")
        );
    }

    #[test]
    fn plain_at_sign_without_domain_dot_is_not_an_email() {
        assert_eq!(find_email("meet me @ noon"), None);
        assert_eq!(find_email("user@localhost"), None);
    }

    #[test]
    fn no_email_in_plain_text() {
        assert_eq!(find_email("hello there"), None);
    }
}
