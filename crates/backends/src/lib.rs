//! Thin async HTTP clients for the assistant's external collaborators:
//! the completion/embedding backend, the customer record store, and the
//! human-notification webhook.
//!
//! Every collaborator is reached through a trait seam so the router can
//! be exercised without a network.

pub mod airtable;
pub mod openai;
pub mod record;
pub mod traits;
pub mod util;
pub mod webhook;

pub use record::CustomerRecord;
pub use traits::{CompletionClient, EmbeddingClient, Notifier, RecordStore};
