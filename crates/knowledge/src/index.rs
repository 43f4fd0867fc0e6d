//! In-memory embedding index over knowledge chunks.
//!
//! Built once from a chunk sequence, then shared read-only across
//! concurrent queries. Similarity is cosine; results are ordered by
//! descending score with ties broken by original chunk order.

use crate::embeddings::EmbeddingProvider;
use crate::types::Chunk;
use docent_core::{AppError, AppResult};
use std::sync::Arc;

/// A queryable similarity index of (chunk, vector) pairs.
///
/// The index is never observable in a partially-built state: `build`
/// returns a complete index or an error, and `empty` returns an index with
/// no entries.
pub struct EmbeddingIndex {
    provider: Arc<dyn EmbeddingProvider>,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
}

impl EmbeddingIndex {
    /// Create an empty index (queries return no results).
    pub fn empty(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            chunks: Vec::new(),
            vectors: Vec::new(),
        }
    }

    /// Build an index by embedding every chunk in one batched call.
    ///
    /// Embedding-provider failures propagate as retrieval errors carrying
    /// the provider's retryability flag; retry policy is the caller's.
    pub async fn build(
        provider: Arc<dyn EmbeddingProvider>,
        chunks: Vec<Chunk>,
    ) -> AppResult<Self> {
        if chunks.is_empty() {
            return Ok(Self::empty(provider));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = provider.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(AppError::retrieval(format!(
                "Embedding count mismatch: {} chunks, {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        tracing::info!(
            "Indexed {} chunks using provider '{}' (model: {}, dim: {})",
            chunks.len(),
            provider.provider_name(),
            provider.model_name(),
            provider.dimensions()
        );

        Ok(Self {
            provider,
            chunks,
            vectors,
        })
    }

    /// Query for the top-k most similar chunks.
    ///
    /// Returns `(chunk, score)` pairs in strictly non-increasing score
    /// order. If the index holds fewer than `k` entries, all of them are
    /// returned. An empty index yields an empty sequence, never an error.
    pub async fn query(&self, text: &str, k: usize) -> AppResult<Vec<(Chunk, f32)>> {
        if k == 0 {
            return Err(AppError::retrieval("k must be a positive integer"));
        }

        if self.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.provider.embed(text).await?;

        let mut results: Vec<(Chunk, f32)> = self
            .chunks
            .iter()
            .zip(self.vectors.iter())
            .map(|(chunk, vector)| (chunk.clone(), cosine_similarity(&query_vector, vector)))
            .collect();

        // Stable sort: equal scores keep original chunk order
        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        tracing::debug!("Retrieved {} chunks (requested top-{})", results.len(), k);

        Ok(results)
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::trigram::TrigramProvider;
    use crate::types::Chunk;

    fn provider() -> Arc<dyn EmbeddingProvider> {
        Arc::new(TrigramProvider::new(384))
    }

    fn chunk(position: u32, text: &str) -> Chunk {
        Chunk::new(position, text.to_string(), 1, (0, text.chars().count()))
    }

    #[tokio::test]
    async fn test_empty_index_query_returns_empty() {
        let index = EmbeddingIndex::empty(provider());
        assert!(index.is_empty());

        let results = index.query("anything", 4).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_build_from_no_chunks_is_empty() {
        let index = EmbeddingIndex::build(provider(), vec![]).await.unwrap();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[tokio::test]
    async fn test_scores_are_non_increasing() {
        let chunks = vec![
            chunk(0, "treaties terminate upon consent of all parties"),
            chunk(1, "chocolate cake requires flour and sugar"),
            chunk(2, "material breach also terminates treaties"),
            chunk(3, "the weather today is sunny and warm"),
        ];
        let index = EmbeddingIndex::build(provider(), chunks).await.unwrap();

        let results = index.query("treaty termination", 4).await.unwrap();
        assert_eq!(results.len(), 4);

        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[tokio::test]
    async fn test_k_larger_than_index_returns_all() {
        let chunks = vec![chunk(0, "first entry"), chunk(1, "second entry")];
        let index = EmbeddingIndex::build(provider(), chunks).await.unwrap();

        let results = index.query("entry", 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_k_zero_is_an_error() {
        let index = EmbeddingIndex::build(provider(), vec![chunk(0, "entry")])
            .await
            .unwrap();

        let err = index.query("entry", 0).await.unwrap_err();
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        // Identical texts embed identically, so scores tie exactly
        let chunks = vec![
            chunk(0, "identical text"),
            chunk(1, "identical text"),
            chunk(2, "identical text"),
        ];
        let index = EmbeddingIndex::build(provider(), chunks).await.unwrap();

        let results = index.query("identical text", 3).await.unwrap();
        let positions: Vec<u32> = results.iter().map(|(c, _)| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![1.0, 0.0, 0.0];
        let d = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&c, &d).abs() < 0.001);

        // Mismatched dimensions degrade to zero rather than panicking
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
