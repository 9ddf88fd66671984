use sd_domain::chat::Message;
use sd_domain::error::Result;

use crate::record::CustomerRecord;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Backend trait seams
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Produces the next assistant turn from a message history.
///
/// The caller is responsible for prepending the system preamble; this
/// trait only speaks the wire protocol.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// Generates text embeddings, one vector per input text.
#[async_trait::async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Looks up a customer record by email address.
///
/// Returns `Ok(None)` when no record matches; transport and backend
/// failures surface as [`sd_domain::error::Error::Lookup`].
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn lookup(&self, email: &str) -> Result<Option<CustomerRecord>>;
}

/// Posts a free-text alert to a human-facing channel.
///
/// Fire-and-forget semantics are acceptable, but delivery failure must
/// be reported back to the caller, never silently swallowed.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<()>;
}
