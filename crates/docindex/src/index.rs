//! In-memory embedding index over one ingested document.
//!
//! Each chunk is embedded once at build time; queries are ranked by
//! cosine similarity against the stored chunk vectors. One index holds
//! exactly one document; re-indexing builds a fresh index that the
//! session swaps in only on success.

use chrono::{DateTime, Utc};

use sd_backends::EmbeddingClient;
use sd_domain::error::{Error, Result};

use crate::chunk::split_text;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Vector math
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cosine similarity between a query embedding and a chunk embedding,
/// in `[-1.0, 1.0]`.
///
/// Degenerate inputs (dimension mismatch, zero magnitude) score `0.0`,
/// which [`DocumentIndex::search`] filters out, so they rank below
/// every real match.
pub fn cosine_similarity(query: &[f32], chunk: &[f32]) -> f32 {
    if query.len() != chunk.len() {
        tracing::warn!(
            query_dims = query.len(),
            chunk_dims = chunk.len(),
            "embedding dimension mismatch, scoring chunk as irrelevant"
        );
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_q = 0.0f32;
    let mut norm_c = 0.0f32;
    for (q, c) in query.iter().zip(chunk) {
        dot += q * c;
        norm_q += q * q;
        norm_c += c * c;
    }

    if norm_q == 0.0 || norm_c == 0.0 {
        return 0.0;
    }

    dot / (norm_q.sqrt() * norm_c.sqrt())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Document index
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One indexed chunk with its embedding vector.
#[derive(Debug, Clone)]
struct IndexedChunk {
    text: String,
    embedding: Vec<f32>,
}

/// An opaque, queryable structure built from one ingested document.
#[derive(Debug)]
pub struct DocumentIndex {
    doc_name: String,
    chunks: Vec<IndexedChunk>,
    indexed_at: DateTime<Utc>,
}

impl DocumentIndex {
    /// Chunk, embed, and index a document's text content.
    ///
    /// All failures (empty document, embedding backend errors, vector
    /// count mismatch) map to [`Error::Ingestion`] so a failed build
    /// never replaces a previously active index.
    pub async fn build(
        doc_name: &str,
        text: &str,
        chunk_size: usize,
        chunk_overlap: usize,
        embedder: &dyn EmbeddingClient,
    ) -> Result<Self> {
        let chunk_texts = split_text(text, chunk_size, chunk_overlap);
        if chunk_texts.is_empty() {
            return Err(Error::Ingestion(format!(
                "document '{doc_name}' contains no indexable text"
            )));
        }

        let embeddings = embedder
            .embed(&chunk_texts)
            .await
            .map_err(|e| Error::Ingestion(format!("embedding chunks failed: {e}")))?;

        if embeddings.len() != chunk_texts.len() {
            return Err(Error::Ingestion(format!(
                "embedding count mismatch: {} chunks, {} vectors",
                chunk_texts.len(),
                embeddings.len()
            )));
        }

        let chunks = chunk_texts
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| IndexedChunk { text, embedding })
            .collect::<Vec<_>>();

        tracing::info!(
            doc = %doc_name,
            chunks = chunks.len(),
            "document indexed"
        );

        Ok(Self {
            doc_name: doc_name.to_string(),
            chunks,
            indexed_at: Utc::now(),
        })
    }

    /// Return the `top_k` most similar chunks for a query embedding,
    /// best first. Chunks with non-positive similarity are excluded —
    /// an empty result signals "no relevant content found".
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> Vec<&str> {
        let mut scored: Vec<(f32, &str)> = self
            .chunks
            .iter()
            .map(|c| (cosine_similarity(query_embedding, &c.embedding), c.text.as_str()))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        scored.into_iter().map(|(_, text)| text).collect()
    }

    pub fn doc_name(&self) -> &str {
        &self.doc_name
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn indexed_at(&self) -> DateTime<Utc> {
        self.indexed_at
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use sd_domain::error::Result;

    /// Embedder that maps each text to a fixed-direction vector based on
    /// a keyword, so similarity ranking is deterministic.
    struct KeywordEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingClient for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("password") {
                        vec![1.0, 0.0, 0.0]
                    } else if t.contains("billing") {
                        vec![0.0, 1.0, 0.0]
                    } else {
                        vec![0.0, 0.0, 1.0]
                    }
                })
                .collect())
        }
    }

    struct FailingEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingClient for FailingEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(Error::Http("connection refused".into()))
        }
    }

    #[test]
    fn cosine_similarity_identical_vectors() {
        let a = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&a, &a);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_orthogonal_vectors() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_zero_vector_returns_zero() {
        let sim = cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_mismatched_lengths_returns_zero() {
        let sim = cosine_similarity(&[1.0], &[1.0, 2.0]);
        assert!(sim.abs() < 1e-6);
    }

    #[tokio::test]
    async fn build_and_search_ranks_by_similarity() {
        let text = "To reset your password open settings. \
                    For billing questions contact accounts. \
                    Shipping takes three days.";
        let index = DocumentIndex::build("manual.txt", text, 40, 5, &KeywordEmbedder)
            .await
            .unwrap();

        assert!(index.chunk_count() >= 2);

        // A "password"-direction query should rank the password chunk first.
        let results = index.search(&[1.0, 0.0, 0.0], 2);
        assert!(!results.is_empty());
        assert!(results[0].contains("password"));
    }

    #[tokio::test]
    async fn build_empty_document_is_ingestion_error() {
        let err = DocumentIndex::build("empty.txt", "   ", 500, 50, &KeywordEmbedder)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ingestion(_)));
    }

    #[tokio::test]
    async fn build_backend_failure_is_ingestion_error() {
        let err = DocumentIndex::build("doc.txt", "some content", 500, 50, &FailingEmbedder)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ingestion(_)));
    }

    #[tokio::test]
    async fn search_with_no_positive_similarity_is_empty() {
        let index = DocumentIndex::build("doc.txt", "billing info here", 500, 50, &KeywordEmbedder)
            .await
            .unwrap();
        // Orthogonal query direction: similarity 0 everywhere.
        let results = index.search(&[1.0, 0.0, 0.0], 4);
        assert!(results.is_empty());
    }
}
