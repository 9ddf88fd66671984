//! The per-message dispatch cycle and reply composer.
//!
//! One classify → dispatch → compose cycle per submitted message,
//! synchronous from the session loop's point of view. Backend failures
//! never escape: every dispatcher catches at its boundary and renders
//! the error into the reply with a failure marker.

use std::sync::Arc;

use sd_backends::{CompletionClient, EmbeddingClient, Notifier, RecordStore};
use sd_docindex::{qa, DocumentIndex};
use sd_domain::chat::Message;
use sd_domain::config::{AssistantConfig, IndexConfig};
use sd_domain::error::{Error, Result};

use crate::classify::{classify, Route};
use crate::escalation;
use crate::keywords::find_email;
use crate::session::Session;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reply texts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Prefix for replies rendered from a caught backend error.
pub const FAILURE_MARKER: &str = "[error]";

/// Shown when the document index has no relevant content.
pub const DOC_FALLBACK: &str =
    "I could not find a solution in the documents, would you like a human agent?";

/// Header for the document supplement appended to general replies.
const FROM_DOCS_HEADER: &str = "From Docs:";

fn failure_reply(e: &Error) -> String {
    format!("{FAILURE_MARKER} {e}")
}

fn not_registered_reply(link: &str) -> String {
    format!("This email is not registered with us. You can register at {link}.")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Router
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Owns the backend handles and drives one message cycle at a time.
pub struct Router {
    completion: Arc<dyn CompletionClient>,
    embedder: Arc<dyn EmbeddingClient>,
    records: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    index_cfg: IndexConfig,
    assistant_cfg: AssistantConfig,
}

impl Router {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        embedder: Arc<dyn EmbeddingClient>,
        records: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        index_cfg: IndexConfig,
        assistant_cfg: AssistantConfig,
    ) -> Self {
        Self {
            completion,
            embedder,
            records,
            notifier,
            index_cfg,
            assistant_cfg,
        }
    }

    /// Process one submitted message: append it to the transcript,
    /// classify, dispatch, compose, append the reply, return it.
    ///
    /// Empty (post-trim) input is rejected by the session loop before
    /// it reaches the classifier; if it arrives here anyway it is
    /// ignored without touching the transcript.
    pub async fn handle_message(&self, session: &mut Session, raw: &str) -> String {
        let message = raw.trim();
        if message.is_empty() {
            return String::new();
        }

        session.push_user(message);
        let route = classify(message, session);

        let reply = match route {
            Route::Escalate => {
                escalation::on_escalate(session, message, self.notifier.as_ref()).await
            }
            Route::CollectName => {
                escalation::on_collect_name(session, message, self.notifier.as_ref()).await
            }
            Route::CollectEmail => {
                escalation::on_collect_email(session, message, self.notifier.as_ref()).await
            }
            Route::RecordLookup => self.dispatch_record_lookup(message).await,
            Route::DocumentQa => self.dispatch_document_qa(session, message).await,
            Route::General => self.dispatch_general(session, message).await,
        };

        session.push_bot(&reply);
        reply
    }

    // ── Document ingestion (outside the per-message loop) ──────────

    /// Build an index from the document text and install it on the
    /// session, replacing any prior index only on success.
    pub async fn index_document(
        &self,
        session: &mut Session,
        doc_name: &str,
        text: &str,
    ) -> Result<()> {
        let index = DocumentIndex::build(
            doc_name,
            text,
            self.index_cfg.chunk_size,
            self.index_cfg.chunk_overlap,
            self.embedder.as_ref(),
        )
        .await?;

        session.install_index(Arc::new(index));
        Ok(())
    }

    // ── Dispatchers ────────────────────────────────────────────────

    async fn dispatch_record_lookup(&self, message: &str) -> String {
        // The classifier only picks this route when an email token is
        // present, so extraction cannot fail here.
        let email = match find_email(message) {
            Some(e) => e,
            None => return failure_reply(&Error::Lookup("no email token in message".into())),
        };

        match self.records.lookup(email).await {
            Ok(Some(record)) => record.summary(),
            Ok(None) => not_registered_reply(&self.assistant_cfg.registration_link),
            Err(e) => failure_reply(&e),
        }
    }

    async fn dispatch_document_qa(&self, session: &Session, question: &str) -> String {
        let index = match &session.document_index {
            Some(index) => index,
            None => return DOC_FALLBACK.to_string(),
        };

        match qa::answer(
            index,
            question,
            self.index_cfg.top_k,
            self.embedder.as_ref(),
            self.completion.as_ref(),
        )
        .await
        {
            Ok(answer) if answer.is_empty() => DOC_FALLBACK.to_string(),
            Ok(answer) => answer,
            Err(e) => failure_reply(&e),
        }
    }

    async fn dispatch_general(&self, session: &Session, question: &str) -> String {
        // The transcript (which already includes the current message)
        // is the sole source of conversational context.
        let mut messages = vec![Message::system(&self.assistant_cfg.system_prompt)];
        messages.extend(session.history.iter().map(Message::from));

        let reply = match self.completion.complete(&messages).await {
            Ok(reply) => reply,
            Err(e) => return failure_reply(&e),
        };

        // Supplement, never replace: when a document index exists, a
        // relevant document answer is appended under its own header.
        if let Some(index) = &session.document_index {
            match qa::answer(
                index,
                question,
                self.index_cfg.top_k,
                self.embedder.as_ref(),
                self.completion.as_ref(),
            )
            .await
            {
                Ok(doc_answer) if !doc_answer.is_empty() => {
                    return format!("{reply}\n\n{FROM_DOCS_HEADER}\n{doc_answer}");
                }
                Ok(_) => {}
                Err(e) => {
                    return format!(
                        "{reply}\n\n{FROM_DOCS_HEADER}\n{}",
                        failure_reply(&e)
                    );
                }
            }
        }

        reply
    }
}
