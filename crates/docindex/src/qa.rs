//! Retrieval-augmented answering over a [`DocumentIndex`].

use sd_backends::{CompletionClient, EmbeddingClient};
use sd_domain::chat::Message;
use sd_domain::error::Result;

use crate::index::DocumentIndex;

/// Instruction prepended to every document-answering prompt. The model
/// must answer strictly from the retrieved excerpts.
const QA_SYSTEM_PROMPT: &str = "You are a customer support assistant. Answer the \
    question using only the provided document excerpts. If the excerpts do not \
    contain the answer, reply with exactly: NO_ANSWER";

/// Sentinel the model returns when the excerpts don't cover the question.
const NO_ANSWER_SENTINEL: &str = "NO_ANSWER";

/// Answer a question against the index.
///
/// Returns an empty string when no relevant content is found — either
/// because retrieval produced no chunks with positive similarity, or
/// because the model reported the excerpts don't cover the question.
/// The caller substitutes its user-facing fallback text.
pub async fn answer(
    index: &DocumentIndex,
    question: &str,
    top_k: usize,
    embedder: &dyn EmbeddingClient,
    completion: &dyn CompletionClient,
) -> Result<String> {
    let query_embedding = embedder.embed(&[question.to_string()]).await?;
    let query_embedding = match query_embedding.first() {
        Some(v) => v,
        None => return Ok(String::new()),
    };

    let excerpts = index.search(query_embedding, top_k);
    if excerpts.is_empty() {
        tracing::debug!(doc = %index.doc_name(), "no relevant chunks for question");
        return Ok(String::new());
    }

    let context = excerpts
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[{}] {}", i + 1, chunk))
        .collect::<Vec<_>>()
        .join("\n\n");

    let messages = vec![
        Message::system(QA_SYSTEM_PROMPT),
        Message::user(format!(
            "Document excerpts:\n\n{context}\n\nQuestion: {question}"
        )),
    ];

    let reply = completion.complete(&messages).await?;
    let reply = reply.trim();

    if reply.is_empty() || reply == NO_ANSWER_SENTINEL {
        return Ok(String::new());
    }

    Ok(reply.to_string())
}
