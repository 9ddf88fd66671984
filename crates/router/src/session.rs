//! Per-session conversational state.
//!
//! A `Session` is an explicit value passed by reference into the router
//! on every call — no process-wide singletons. It lives for the
//! duration of the process and is discarded with no durable
//! persistence; a reset starts over with empty history and no collected
//! identity.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use sd_docindex::DocumentIndex;
use sd_domain::chat::Turn;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pending stage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which escalation-dialogue branch consumes the next raw user message.
///
/// Stage consumption strictly precedes keyword matching: while a stage
/// is pending, the next message is taken verbatim as collection input
/// and never re-classified, even if it contains trigger words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingStage {
    #[default]
    None,
    AwaitingName,
    AwaitingEmail,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The complete, process-local conversational state for one user's
/// interaction lifetime.
///
/// Invariant: `pending_stage != None` implies
/// `pending_escalation_message` is set.
pub struct Session {
    pub session_key: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ordered transcript; append-only within a session.
    pub history: Vec<Turn>,
    collected_name: Option<String>,
    collected_email: Option<String>,
    pub pending_stage: PendingStage,
    /// The original message that triggered escalation, retained so it
    /// can be forwarded once contact info is captured.
    pub pending_escalation_message: Option<String>,
    /// At most one active index; later uploads replace it on success.
    pub document_index: Option<Arc<DocumentIndex>>,
}

impl Session {
    pub fn new(session_key: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_key: session_key.into(),
            session_id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            history: Vec::new(),
            collected_name: None,
            collected_email: None,
            pending_stage: PendingStage::None,
            pending_escalation_message: None,
            document_index: None,
        }
    }

    // ── Transcript ─────────────────────────────────────────────────

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.history.push(Turn::user(text));
        self.updated_at = Utc::now();
    }

    pub fn push_bot(&mut self, text: impl Into<String>) {
        self.history.push(Turn::bot(text));
        self.updated_at = Utc::now();
    }

    // ── Collected identity (set once, immutable thereafter) ────────

    pub fn collected_name(&self) -> Option<&str> {
        self.collected_name.as_deref()
    }

    pub fn collected_email(&self) -> Option<&str> {
        self.collected_email.as_deref()
    }

    /// Store the collected name. The first captured value wins; later
    /// calls within the same session are ignored.
    pub fn set_collected_name(&mut self, name: impl Into<String>) {
        if self.collected_name.is_none() {
            self.collected_name = Some(name.into());
        }
    }

    /// Store the collected email. The first captured value wins.
    pub fn set_collected_email(&mut self, email: impl Into<String>) {
        if self.collected_email.is_none() {
            self.collected_email = Some(email.into());
        }
    }

    /// Whether escalation can bypass the collection stages.
    pub fn identity_complete(&self) -> bool {
        self.collected_name.is_some() && self.collected_email.is_some()
    }

    // ── Document index ─────────────────────────────────────────────

    /// Install a freshly built index, replacing any prior one. Only
    /// called on successful ingestion; a failed build leaves the
    /// previous (or absent) index unchanged.
    pub fn install_index(&mut self, index: Arc<DocumentIndex>) {
        self.document_index = Some(index);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_empty() {
        let session = Session::new("cli:test");
        assert!(session.history.is_empty());
        assert!(session.collected_name().is_none());
        assert!(session.collected_email().is_none());
        assert_eq!(session.pending_stage, PendingStage::None);
        assert!(session.pending_escalation_message.is_none());
        assert!(session.document_index.is_none());
    }

    #[test]
    fn collected_identity_is_set_once() {
        let mut session = Session::new("cli:test");
        session.set_collected_name("Jane Doe");
        session.set_collected_name("Someone Else");
        assert_eq!(session.collected_name(), Some("Jane Doe"));

        session.set_collected_email("jane@example.com");
        session.set_collected_email("other@example.com");
        assert_eq!(session.collected_email(), Some("jane@example.com"));
    }

    #[test]
    fn identity_complete_requires_both_fields() {
        let mut session = Session::new("cli:test");
        assert!(!session.identity_complete());
        session.set_collected_name("Jane");
        assert!(!session.identity_complete());
        session.set_collected_email("jane@example.com");
        assert!(session.identity_complete());
    }

    #[test]
    fn history_preserves_submission_order() {
        let mut session = Session::new("cli:test");
        session.push_user("hello");
        session.push_bot("hi!");
        session.push_user("thanks");
        let texts: Vec<&str> = session.history.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "hi!", "thanks"]);
    }
}
