//! End-to-end routing and escalation tests with mocked backends.
//!
//! These cover the full classify → dispatch → compose cycle across
//! modules, without any network: escalation priority, the staged
//! collection round trip, the identity fast path, record lookups,
//! document Q&A, re-upload idempotence, and delivery-failure handling.

use std::sync::Arc;

use parking_lot::Mutex;

use sd_backends::{CompletionClient, CustomerRecord, EmbeddingClient, Notifier, RecordStore};
use sd_domain::chat::Message;
use sd_domain::config::{AssistantConfig, IndexConfig};
use sd_domain::error::{Error, Result};
use sd_router::engine::{DOC_FALLBACK, FAILURE_MARKER};
use sd_router::escalation::{DELIVERY_WARNING, NAME_PROMPT, NOTIFIED_REPLY};
use sd_router::{PendingStage, Router, Session};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mock backends
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct MockCompletion {
    reply: String,
}

#[async_trait::async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(&self, _messages: &[Message]) -> Result<String> {
        Ok(self.reply.clone())
    }
}

struct MockEmbedder;

#[async_trait::async_trait]
impl EmbeddingClient for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }
}

struct MockRecords {
    record: Option<CustomerRecord>,
    fail: bool,
}

#[async_trait::async_trait]
impl RecordStore for MockRecords {
    async fn lookup(&self, _email: &str) -> Result<Option<CustomerRecord>> {
        if self.fail {
            return Err(Error::Lookup("record store unreachable".into()));
        }
        Ok(self.record.clone())
    }
}

#[derive(Default)]
struct MockNotifier {
    calls: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait::async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        self.calls.lock().push(text.to_string());
        if self.fail {
            return Err(Error::Delivery("webhook HTTP 500".into()));
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Test harness
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct Harness {
    router: Router,
    notifier: Arc<MockNotifier>,
}

fn harness(reply: &str, record: Option<CustomerRecord>, notify_fails: bool) -> Harness {
    let notifier = Arc::new(MockNotifier {
        calls: Mutex::new(Vec::new()),
        fail: notify_fails,
    });
    let router = Router::new(
        Arc::new(MockCompletion {
            reply: reply.to_string(),
        }),
        Arc::new(MockEmbedder),
        Arc::new(MockRecords {
            record,
            fail: false,
        }),
        notifier.clone(),
        IndexConfig::default(),
        AssistantConfig::default(),
    );
    Harness { router, notifier }
}

fn notification_count(h: &Harness) -> usize {
    h.notifier.calls.lock().len()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Escalation dialogue
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn refund_request_prompts_for_name() {
    let h = harness("general reply", None, false);
    let mut session = Session::new("t");

    let reply = h.router.handle_message(&mut session, "I want a refund").await;

    assert_eq!(reply, NAME_PROMPT);
    assert_eq!(session.pending_stage, PendingStage::AwaitingName);
    assert_eq!(
        session.pending_escalation_message.as_deref(),
        Some("I want a refund")
    );
    assert_eq!(notification_count(&h), 0);
}

#[tokio::test]
async fn name_capture_prompts_for_email() {
    let h = harness("general reply", None, false);
    let mut session = Session::new("t");

    h.router.handle_message(&mut session, "I want a refund").await;
    let reply = h.router.handle_message(&mut session, "Jane Doe").await;

    assert_eq!(session.collected_name(), Some("Jane Doe"));
    assert_eq!(session.pending_stage, PendingStage::AwaitingEmail);
    assert!(reply.contains("Jane Doe"));
    assert!(reply.contains("email"));
    assert_eq!(notification_count(&h), 0);
}

#[tokio::test]
async fn full_round_trip_notifies_exactly_once() {
    let h = harness("general reply", None, false);
    let mut session = Session::new("t");

    h.router.handle_message(&mut session, "I want a refund").await;
    h.router.handle_message(&mut session, "Jane Doe").await;
    let reply = h
        .router
        .handle_message(&mut session, "jane@example.com")
        .await;

    assert_eq!(reply, NOTIFIED_REPLY);
    assert_eq!(session.pending_stage, PendingStage::None);
    assert!(session.pending_escalation_message.is_none());

    let calls = h.notifier.calls.lock();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("Jane Doe"));
    assert!(calls[0].contains("jane@example.com"));
    assert!(calls[0].contains("I want a refund"));
}

#[tokio::test]
async fn collected_identity_fast_paths_later_escalations() {
    let h = harness("general reply", None, false);
    let mut session = Session::new("t");

    // First escalation walks the full dialogue.
    h.router.handle_message(&mut session, "I want a refund").await;
    h.router.handle_message(&mut session, "Jane Doe").await;
    h.router.handle_message(&mut session, "jane@example.com").await;
    assert_eq!(notification_count(&h), 1);

    // A later escalation skips both collection stages.
    let reply = h
        .router
        .handle_message(&mut session, "cancel my subscription")
        .await;

    assert_eq!(reply, NOTIFIED_REPLY);
    assert_eq!(session.pending_stage, PendingStage::None);
    assert_eq!(notification_count(&h), 2);

    let calls = h.notifier.calls.lock();
    assert!(calls[1].contains("cancel my subscription"));
}

#[tokio::test]
async fn escalation_priority_is_absolute() {
    // An escalation keyword wins even when the same message carries an
    // email token and document-question wording.
    let h = harness("doc answer", None, false);
    let mut session = Session::new("t");
    h.router
        .index_document(&mut session, "manual.txt", "how to reset your password")
        .await
        .unwrap();

    let reply = h
        .router
        .handle_message(
            &mut session,
            "according to the manual I want a refund, reach me at jane@example.com",
        )
        .await;

    assert_eq!(reply, NAME_PROMPT);
    assert_eq!(session.pending_stage, PendingStage::AwaitingName);
}

#[tokio::test]
async fn collection_input_is_never_reclassified() {
    let h = harness("general reply", None, false);
    let mut session = Session::new("t");

    h.router.handle_message(&mut session, "I want a refund").await;
    // A "name" full of trigger words is still consumed as the name.
    let reply = h
        .router
        .handle_message(&mut session, "Refund Agent Human")
        .await;

    assert_eq!(session.collected_name(), Some("Refund Agent Human"));
    assert_eq!(session.pending_stage, PendingStage::AwaitingEmail);
    assert!(reply.contains("email"));
    assert_eq!(notification_count(&h), 0);
}

#[tokio::test]
async fn delivery_failure_warns_and_keeps_pending_message() {
    let h = harness("general reply", None, true);
    let mut session = Session::new("t");

    h.router.handle_message(&mut session, "I want a refund").await;
    h.router.handle_message(&mut session, "Jane Doe").await;
    let reply = h
        .router
        .handle_message(&mut session, "jane@example.com")
        .await;

    // The user still sees the confirmation plus a warning suffix.
    assert!(reply.starts_with(NOTIFIED_REPLY));
    assert!(reply.contains(DELIVERY_WARNING));
    assert_eq!(session.pending_stage, PendingStage::None);

    // Collected details are retained for retry or operator follow-up.
    assert!(session.pending_escalation_message.is_some());
    assert_eq!(session.collected_name(), Some("Jane Doe"));
    assert_eq!(session.collected_email(), Some("jane@example.com"));
}

#[tokio::test]
async fn non_email_contact_input_is_acknowledged() {
    let h = harness("general reply", None, false);
    let mut session = Session::new("t");

    h.router.handle_message(&mut session, "I want a refund").await;
    h.router.handle_message(&mut session, "Jane Doe").await;
    let reply = h.router.handle_message(&mut session, "call me maybe").await;

    // Accepted as free text, but the odd shape is acknowledged.
    assert_eq!(session.collected_email(), Some("call me maybe"));
    assert!(reply.starts_with(NOTIFIED_REPLY));
    assert!(reply.contains("recorded it as given"));
    assert_eq!(notification_count(&h), 1);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Record lookup
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn unregistered_email_gets_registration_link() {
    let h = harness("general reply", None, false);
    let mut session = Session::new("t");

    let reply = h
        .router
        .handle_message(&mut session, "my email is jane@example.com")
        .await;

    assert!(reply.contains("not registered"));
    assert!(reply.contains("https://example.com/register"));
}

#[tokio::test]
async fn registered_email_gets_record_summary() {
    let record = CustomerRecord {
        name: "Jane Doe".into(),
        plan: "Pro".into(),
        last_order_status: "Shipped".into(),
        open_ticket_count: 2,
    };
    let h = harness("general reply", Some(record), false);
    let mut session = Session::new("t");

    let reply = h
        .router
        .handle_message(&mut session, "my email is jane@example.com")
        .await;

    assert!(reply.contains("Name: Jane Doe"));
    assert!(reply.contains("Plan: Pro"));
    assert!(reply.contains("Last Order: Shipped"));
    assert!(reply.contains("Open Tickets: 2"));
}

#[tokio::test]
async fn record_store_failure_is_rendered_not_raised() {
    let notifier = Arc::new(MockNotifier::default());
    let router = Router::new(
        Arc::new(MockCompletion {
            reply: "general reply".into(),
        }),
        Arc::new(MockEmbedder),
        Arc::new(MockRecords {
            record: None,
            fail: true,
        }),
        notifier,
        IndexConfig::default(),
        AssistantConfig::default(),
    );
    let mut session = Session::new("t");

    let reply = router
        .handle_message(&mut session, "my email is jane@example.com")
        .await;

    assert!(reply.starts_with(FAILURE_MARKER));
    assert!(reply.contains("record store unreachable"));
    // The session survives; the next message is processed normally.
    let reply = router.handle_message(&mut session, "hello").await;
    assert_eq!(reply, "general reply");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Document Q&A and the reply composer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn doc_question_returns_answer_verbatim() {
    let h = harness("Open settings, then choose Reset.", None, false);
    let mut session = Session::new("t");
    h.router
        .index_document(&mut session, "manual.txt", "reset steps live in settings")
        .await
        .unwrap();

    let reply = h
        .router
        .handle_message(
            &mut session,
            "according to the manual, how do I reset my password?",
        )
        .await;

    assert_eq!(reply, "Open settings, then choose Reset.");
}

#[tokio::test]
async fn doc_question_without_answer_falls_back() {
    // The model reports the excerpts don't cover the question.
    let h = harness("NO_ANSWER", None, false);
    let mut session = Session::new("t");
    h.router
        .index_document(&mut session, "manual.txt", "shipping policy text")
        .await
        .unwrap();

    let reply = h
        .router
        .handle_message(&mut session, "how to fly to the moon, per the guide?")
        .await;

    assert_eq!(reply, DOC_FALLBACK);
}

#[tokio::test]
async fn general_reply_is_supplemented_with_docs_section() {
    let h = harness("Happy to help!", None, false);
    let mut session = Session::new("t");
    h.router
        .index_document(&mut session, "manual.txt", "greeting etiquette")
        .await
        .unwrap();

    // No doc keyword, no email, no escalation: the general route, but a
    // document index exists so the doc answer is appended, not substituted.
    let reply = h.router.handle_message(&mut session, "hello there").await;

    assert!(reply.starts_with("Happy to help!"));
    assert!(reply.contains("From Docs:"));
}

#[tokio::test]
async fn general_without_index_has_no_docs_section() {
    let h = harness("Happy to help!", None, false);
    let mut session = Session::new("t");

    let reply = h.router.handle_message(&mut session, "hello there").await;

    assert_eq!(reply, "Happy to help!");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Ingestion
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn reupload_replaces_the_active_index() {
    let h = harness("answer", None, false);
    let mut session = Session::new("t");

    h.router
        .index_document(&mut session, "first.txt", "first document body")
        .await
        .unwrap();
    h.router
        .index_document(&mut session, "second.txt", "second document body")
        .await
        .unwrap();

    let index = session.document_index.as_ref().unwrap();
    assert_eq!(index.doc_name(), "second.txt");
}

#[tokio::test]
async fn failed_ingestion_keeps_previous_index() {
    let h = harness("answer", None, false);
    let mut session = Session::new("t");

    h.router
        .index_document(&mut session, "first.txt", "first document body")
        .await
        .unwrap();

    // An empty upload fails to ingest and must not disturb the index.
    let err = h
        .router
        .index_document(&mut session, "broken.txt", "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Ingestion(_)));

    let index = session.document_index.as_ref().unwrap();
    assert_eq!(index.doc_name(), "first.txt");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Boundaries
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn empty_message_is_ignored_without_backend_calls() {
    let h = harness("general reply", None, false);
    let mut session = Session::new("t");

    let reply = h.router.handle_message(&mut session, "   ").await;

    assert!(reply.is_empty());
    assert!(session.history.is_empty());
    assert_eq!(notification_count(&h), 0);
}

#[tokio::test]
async fn transcript_records_both_speakers_in_order() {
    let h = harness("general reply", None, false);
    let mut session = Session::new("t");

    h.router.handle_message(&mut session, "hello").await;
    h.router.handle_message(&mut session, "thanks").await;

    let texts: Vec<&str> = session.history.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["hello", "general reply", "thanks", "general reply"]);
}
