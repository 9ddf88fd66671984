//! Message classification.
//!
//! Assigns every incoming message to exactly one route. The priority
//! order is a deliberate tie-break, not incidental: stage consumption
//! strictly precedes keyword matching, escalation keywords outrank the
//! email pattern, and document heuristics only apply when an index
//! exists for the session.

use crate::keywords::{
    contains_any, find_email, DOC_QUESTION_KEYWORDS, ESCALATION_KEYWORDS,
};
use crate::session::{PendingStage, Session};

/// The classification outcome for one incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Consume the message verbatim as the escalation contact name.
    CollectName,
    /// Consume the message verbatim as the escalation contact email.
    CollectEmail,
    /// Start (or fast-path) the escalation dialogue.
    Escalate,
    /// Look up the customer record for the email token in the message.
    RecordLookup,
    /// Answer from the session's document index.
    DocumentQa,
    /// General conversational fallback.
    General,
}

/// Classify one message against the current session state.
///
/// Evaluated fresh on every message; first match wins.
pub fn classify(message: &str, session: &Session) -> Route {
    let route = match session.pending_stage {
        PendingStage::AwaitingName => Route::CollectName,
        PendingStage::AwaitingEmail => Route::CollectEmail,
        PendingStage::None => {
            if contains_any(message, ESCALATION_KEYWORDS) {
                Route::Escalate
            } else if find_email(message).is_some() {
                Route::RecordLookup
            } else if session.document_index.is_some()
                && contains_any(message, DOC_QUESTION_KEYWORDS)
            {
                Route::DocumentQa
            } else {
                Route::General
            }
        }
    };

    tracing::debug!(session_key = %session.session_key, ?route, "message classified");
    route
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use sd_backends::EmbeddingClient;
    use sd_docindex::DocumentIndex;
    use std::sync::Arc;

    struct StubEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingClient for StubEmbedder {
        async fn embed(
            &self,
            texts: &[String],
        ) -> sd_domain::error::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    async fn session_with_index() -> Session {
        let mut session = Session::new("cli:test");
        let index = DocumentIndex::build("manual.txt", "reset your password", 500, 50, &StubEmbedder)
            .await
            .unwrap();
        session.install_index(Arc::new(index));
        session
    }

    #[test]
    fn escalation_keyword_routes_to_escalate() {
        let session = Session::new("cli:test");
        assert_eq!(classify("I want a refund", &session), Route::Escalate);
        assert_eq!(classify("let me talk to agent", &session), Route::Escalate);
        assert_eq!(classify("I'm NOT HAPPY with this", &session), Route::Escalate);
    }

    #[test]
    fn email_token_routes_to_record_lookup() {
        let session = Session::new("cli:test");
        assert_eq!(
            classify("my email is jane@example.com", &session),
            Route::RecordLookup
        );
    }

    #[test]
    fn escalation_outranks_email_pattern() {
        // Priority order is absolute: an escalation keyword wins even
        // when an email token is present in the same message.
        let session = Session::new("cli:test");
        assert_eq!(
            classify("I want a refund, my email is jane@example.com", &session),
            Route::Escalate
        );
    }

    #[tokio::test]
    async fn escalation_outranks_doc_keywords() {
        let session = session_with_index().await;
        assert_eq!(
            classify("according to the manual I deserve a refund", &session),
            Route::Escalate
        );
    }

    #[tokio::test]
    async fn doc_keywords_route_to_qa_only_with_index() {
        let without_index = Session::new("cli:test");
        assert_eq!(
            classify("how to reset my password?", &without_index),
            Route::General
        );

        let with_index = session_with_index().await;
        assert_eq!(
            classify("how to reset my password?", &with_index),
            Route::DocumentQa
        );
    }

    #[tokio::test]
    async fn email_outranks_doc_keywords() {
        let session = session_with_index().await;
        assert_eq!(
            classify("check the account for jane@example.com in the manual", &session),
            Route::RecordLookup
        );
    }

    #[test]
    fn plain_message_routes_to_general() {
        let session = Session::new("cli:test");
        assert_eq!(classify("hello there", &session), Route::General);
    }

    #[test]
    fn awaiting_name_consumes_message_verbatim() {
        let mut session = Session::new("cli:test");
        session.pending_escalation_message = Some("I want a refund".into());
        session.pending_stage = PendingStage::AwaitingName;

        // Stage consumption precedes keyword matching: even a message
        // full of trigger words is taken as the name.
        assert_eq!(
            classify("Agent Refund jane@example.com", &session),
            Route::CollectName
        );
    }

    #[test]
    fn awaiting_email_consumes_message_verbatim() {
        let mut session = Session::new("cli:test");
        session.pending_escalation_message = Some("I want a refund".into());
        session.pending_stage = PendingStage::AwaitingEmail;

        assert_eq!(classify("cancel everything", &session), Route::CollectEmail);
    }
}
