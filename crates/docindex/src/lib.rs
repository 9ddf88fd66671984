//! Document indexing and retrieval-augmented question answering.
//!
//! A document is split into overlapping text chunks, each chunk is
//! embedded once at indexing time, and questions are answered by
//! retrieving the most similar chunks and asking the completion backend
//! to synthesize an answer from them.

pub mod chunk;
pub mod index;
pub mod qa;

pub use index::DocumentIndex;
