//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A single page of a loaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number within the document
    pub number: u32,

    /// Extracted page text
    pub text: String,
}

/// A loaded source document: stable identifier plus ordered pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source identifier (display form of the file path)
    pub source: String,

    /// Ordered pages with extracted text
    pub pages: Vec<Page>,
}

impl Document {
    /// Total character count across all pages.
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }
}

/// An immutable unit of retrievable text.
///
/// Chunks are derived from exactly one document page, never mutated, and
/// owned by the embedding index once indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk identifier (UUID v4)
    pub id: String,

    /// Global ordinal across the document's chunk sequence (0-indexed)
    pub position: u32,

    /// Chunk text content
    pub text: String,

    /// 1-based page number of the originating page
    pub source_page: u32,

    /// Character offsets (start, end) into the source page text
    pub char_span: (usize, usize),

    /// SHA-256 hash of the chunk text (hex)
    pub hash: String,
}

impl Chunk {
    /// Create a new chunk with a generated id and content hash.
    pub fn new(position: u32, text: String, source_page: u32, char_span: (usize, usize)) -> Self {
        let hash = hex_digest(&text);

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            position,
            text,
            source_page,
            char_span,
            hash,
        }
    }
}

fn hex_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Chunking configuration.
#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks from the same page
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Statistics for an indexed knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KnowledgeStats {
    /// Number of documents loaded
    pub documents: u32,

    /// Number of chunks indexed
    pub chunks: u32,

    /// When the index was last built
    pub indexed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_hash_is_stable() {
        let a = Chunk::new(0, "same text".to_string(), 1, (0, 9));
        let b = Chunk::new(1, "same text".to_string(), 1, (0, 9));
        assert_eq!(a.hash, b.hash);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_document_char_count() {
        let doc = Document {
            source: "test.md".to_string(),
            pages: vec![
                Page {
                    number: 1,
                    text: "abc".to_string(),
                },
                Page {
                    number: 2,
                    text: "de".to_string(),
                },
            ],
        };
        assert_eq!(doc.char_count(), 5);
    }
}
