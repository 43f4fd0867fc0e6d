//! Text chunking with configurable size and overlap.
//!
//! Splits each document page into segments of at most `chunk_size`
//! characters, with `chunk_overlap` characters shared between consecutive
//! segments from the same page. Cut points prefer natural boundaries in
//! order: paragraph break, sentence boundary, word boundary, hard cut.
//!
//! Splitting is deterministic: the same document and configuration always
//! produce the same chunk sequence.

use crate::types::{Chunk, ChunkConfig, Document, Page};
use unicode_segmentation::UnicodeSegmentation;

/// Split a document into an ordered chunk sequence.
///
/// A document with no extractable text yields an empty sequence, not an
/// error. Chunk order follows page order, then position within the page.
pub fn split(document: &Document, config: &ChunkConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut position = 0u32;

    for page in &document.pages {
        split_page(page, config, &mut position, &mut chunks);
    }

    tracing::debug!(
        "Chunked {:?} into {} chunks (size: {}, overlap: {})",
        document.source,
        chunks.len(),
        config.chunk_size,
        config.chunk_overlap
    );

    chunks
}

/// Split one page into overlapping chunks, appending to `chunks`.
fn split_page(page: &Page, config: &ChunkConfig, position: &mut u32, chunks: &mut Vec<Chunk>) {
    let text = &page.text;
    if text.trim().is_empty() {
        return;
    }

    // Byte offset of every char: sizes and spans are measured in chars,
    // slicing happens in bytes.
    let byte_of: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    let total_chars = byte_of.len();

    let byte_at = |char_idx: usize| -> usize {
        if char_idx >= total_chars {
            text.len()
        } else {
            byte_of[char_idx]
        }
    };
    let char_of_byte = |byte_idx: usize| -> usize {
        byte_of
            .binary_search(&byte_idx)
            .unwrap_or_else(|insert_at| insert_at)
    };

    // Candidate cut points (char indices), each list sorted ascending.
    let paragraph_cuts: Vec<usize> = text
        .match_indices("\n\n")
        .map(|(b, _)| char_of_byte(b))
        .collect();
    let sentence_cuts: Vec<usize> = text
        .split_sentence_bound_indices()
        .map(|(b, _)| char_of_byte(b))
        .filter(|&c| c > 0)
        .collect();
    let word_cuts: Vec<usize> = text
        .split_word_bound_indices()
        .map(|(b, _)| char_of_byte(b))
        .filter(|&c| c > 0)
        .collect();

    let mut start = 0usize;

    loop {
        let remaining = total_chars - start;
        if remaining == 0 {
            break;
        }

        if remaining <= config.chunk_size {
            push_chunk(page, text, (start, total_chars), byte_at(start), text.len(), position, chunks);
            break;
        }

        let hard_end = start + config.chunk_size;
        // A cut must leave more than the overlap behind, or the next start
        // would not advance.
        let min_end = start + config.chunk_overlap + 1;

        let end = best_cut(&paragraph_cuts, min_end, hard_end)
            .or_else(|| best_cut(&sentence_cuts, min_end, hard_end))
            .or_else(|| best_cut(&word_cuts, min_end, hard_end))
            .unwrap_or(hard_end);

        push_chunk(page, text, (start, end), byte_at(start), byte_at(end), position, chunks);

        start = end - config.chunk_overlap;
    }
}

/// Largest candidate cut in `[min_end, hard_end]`, if any.
fn best_cut(cuts: &[usize], min_end: usize, hard_end: usize) -> Option<usize> {
    let upto = cuts.partition_point(|&c| c <= hard_end);
    if upto == 0 {
        return None;
    }

    let candidate = cuts[upto - 1];
    if candidate >= min_end {
        Some(candidate)
    } else {
        None
    }
}

#[allow(clippy::too_many_arguments)]
fn push_chunk(
    page: &Page,
    text: &str,
    char_span: (usize, usize),
    start_byte: usize,
    end_byte: usize,
    position: &mut u32,
    chunks: &mut Vec<Chunk>,
) {
    let chunk_text = &text[start_byte..end_byte];
    if chunk_text.trim().is_empty() {
        return;
    }

    chunks.push(Chunk::new(
        *position,
        chunk_text.to_string(),
        page.number,
        char_span,
    ));
    *position += 1;
}
