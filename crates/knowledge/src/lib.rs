//! Knowledge base for document-grounded retrieval.
//!
//! Orchestrates document loading, chunking, and embedding indexing at
//! startup, and answers similarity queries at query time. The index is
//! immutable once built and shared read-only across concurrent queries;
//! re-indexing swaps the index reference atomically.

pub mod chunker;
pub mod document;
pub mod embeddings;
pub mod index;
pub mod types;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use index::EmbeddingIndex;
pub use types::{Chunk, ChunkConfig, Document, KnowledgeStats, Page};

use chrono::Utc;
use docent_core::AppResult;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Fixed response when retrieval runs against an unindexed knowledge base.
///
/// Distinguishes "searched but nothing indexed" from a malformed or empty
/// response; both the agent and the tests rely on the exact text.
pub const EMPTY_INDEX_RESPONSE: &str = "No internal documents have been indexed.";

/// Handles document loading, chunking, and vector retrieval.
pub struct KnowledgeBase {
    provider: Arc<dyn EmbeddingProvider>,
    chunk_config: ChunkConfig,
    index: RwLock<Arc<EmbeddingIndex>>,
    stats: RwLock<KnowledgeStats>,
}

impl KnowledgeBase {
    /// Create a knowledge base with an empty index.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, chunk_config: ChunkConfig) -> Self {
        let index = EmbeddingIndex::empty(Arc::clone(&provider));

        Self {
            provider,
            chunk_config,
            index: RwLock::new(Arc::new(index)),
            stats: RwLock::new(KnowledgeStats::default()),
        }
    }

    /// Load the document(s) at `path`, chunk them, and build the index.
    ///
    /// A missing path degrades to an empty index with a logged warning
    /// rather than an error. The new index replaces the old one atomically:
    /// in-flight queries see either the previous or the new index, never a
    /// partially-built one.
    pub async fn load_and_index(&self, path: &Path) -> AppResult<KnowledgeStats> {
        tracing::info!("Loading documents from {:?}", path);

        let documents = document::load(path)?;

        let mut chunks = Vec::new();
        for doc in &documents {
            chunks.extend(chunker::split(doc, &self.chunk_config));
        }

        tracing::info!(
            "Indexing {} chunks from {} document(s)",
            chunks.len(),
            documents.len()
        );

        let new_index = EmbeddingIndex::build(Arc::clone(&self.provider), chunks).await?;

        let stats = KnowledgeStats {
            documents: documents.len() as u32,
            chunks: new_index.len() as u32,
            indexed_at: Some(Utc::now()),
        };

        *self.index.write().unwrap() = Arc::new(new_index);
        *self.stats.write().unwrap() = stats.clone();

        tracing::info!("Indexing complete: {} chunks", stats.chunks);

        Ok(stats)
    }

    /// Retrieve the top-k most relevant chunks for a query, rendered as a
    /// single context string with one page-tagged block per result.
    ///
    /// An unindexed knowledge base returns [`EMPTY_INDEX_RESPONSE`].
    pub async fn retrieve(&self, query: &str, k: usize) -> AppResult<String> {
        let index = { Arc::clone(&self.index.read().unwrap()) };

        if index.is_empty() {
            return Ok(EMPTY_INDEX_RESPONSE.to_string());
        }

        let results = index.query(query, k).await?;

        let context = results
            .iter()
            .map(|(chunk, _score)| format!("[Source: Page {}] {}", chunk.source_page, chunk.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        tracing::debug!(
            "Retrieved {} chunks ({} bytes of context)",
            results.len(),
            context.len()
        );

        Ok(context)
    }

    /// Whether any chunks are currently indexed.
    pub fn is_indexed(&self) -> bool {
        !self.index.read().unwrap().is_empty()
    }

    /// Current index statistics.
    pub fn stats(&self) -> KnowledgeStats {
        self.stats.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::trigram::TrigramProvider;
    use std::io::Write;
    use tempfile::TempDir;

    fn knowledge_base() -> KnowledgeBase {
        KnowledgeBase::new(
            Arc::new(TrigramProvider::new(384)),
            ChunkConfig {
                chunk_size: 200,
                chunk_overlap: 50,
            },
        )
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_retrieve_unindexed_returns_sentinel() {
        let kb = knowledge_base();
        assert!(!kb.is_indexed());

        let context = kb.retrieve("any query", 4).await.unwrap();
        assert_eq!(context, EMPTY_INDEX_RESPONSE);
    }

    #[tokio::test]
    async fn test_missing_document_degrades_to_sentinel() {
        let kb = knowledge_base();
        let stats = kb
            .load_and_index(Path::new("/nonexistent/policy.md"))
            .await
            .unwrap();

        assert_eq!(stats.chunks, 0);
        assert!(!kb.is_indexed());

        let context = kb.retrieve("any query", 4).await.unwrap();
        assert_eq!(context, EMPTY_INDEX_RESPONSE);
    }

    #[tokio::test]
    async fn test_retrieve_block_count() {
        let temp = TempDir::new().unwrap();
        let path = write_file(
            &temp,
            "policy.txt",
            &"Treaties terminate upon consent of all parties. ".repeat(20),
        );

        let kb = knowledge_base();
        let stats = kb.load_and_index(&path).await.unwrap();
        assert!(stats.chunks > 2);

        let context = kb.retrieve("treaty termination", 2).await.unwrap();
        let blocks: Vec<&str> = context.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
    }

    #[tokio::test]
    async fn test_retrieve_fewer_chunks_than_k() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, "short.txt", "One short document.");

        let kb = knowledge_base();
        let stats = kb.load_and_index(&path).await.unwrap();
        assert_eq!(stats.chunks, 1);

        let context = kb.retrieve("short document", 4).await.unwrap();
        let blocks: Vec<&str> = context.split("\n\n").collect();
        assert_eq!(blocks.len(), 1);
    }

    #[tokio::test]
    async fn test_blocks_carry_page_tags() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, "paged.txt", "first page text\u{000C}second page text");

        let kb = knowledge_base();
        kb.load_and_index(&path).await.unwrap();

        let context = kb.retrieve("page text", 4).await.unwrap();
        assert!(context.contains("[Source: Page 1]"));
        assert!(context.contains("[Source: Page 2]"));
    }

    #[tokio::test]
    async fn test_reindex_replaces_index() {
        let temp = TempDir::new().unwrap();
        let first = write_file(&temp, "first.txt", "the first corpus about treaties");

        let kb = knowledge_base();
        kb.load_and_index(&first).await.unwrap();
        assert!(kb.is_indexed());

        // Re-index from a missing path: old index is fully replaced
        kb.load_and_index(Path::new("/nonexistent")).await.unwrap();
        assert!(!kb.is_indexed());
        assert_eq!(
            kb.retrieve("treaties", 4).await.unwrap(),
            EMPTY_INDEX_RESPONSE
        );
    }

    #[tokio::test]
    async fn test_stats_reflect_index() {
        let temp = TempDir::new().unwrap();
        write_file(&temp, "a.txt", "first document text");
        write_file(&temp, "b.txt", "second document text");

        let kb = knowledge_base();
        kb.load_and_index(temp.path()).await.unwrap();

        let stats = kb.stats();
        assert_eq!(stats.documents, 2);
        assert!(stats.chunks >= 2);
        assert!(stats.indexed_at.is_some());
    }
}
