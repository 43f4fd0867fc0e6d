//! Document loading and text extraction.
//!
//! Loads a file or directory of files into `Document` values with ordered,
//! numbered pages. Pages are separated by form-feed characters (`\f`) in the
//! source text; a file without form feeds is a single-page document.

use crate::types::{Document, Page};
use docent_core::{AppError, AppResult};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    PlainText,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("txt") | Some("text") => Self::PlainText,
            _ => Self::Unknown,
        }
    }
}

/// Load the document(s) at `path`.
///
/// A missing path is not an error: it degrades to an empty result with a
/// logged warning so internal lookup can answer with its sentinel string.
/// Directories are walked in file-name order for deterministic output.
pub fn load(path: &Path) -> AppResult<Vec<Document>> {
    if !path.exists() {
        tracing::warn!(
            "Document path not found: {:?}. Internal search will be empty.",
            path
        );
        return Ok(Vec::new());
    }

    if path.is_file() {
        return Ok(load_file(path)?.into_iter().collect());
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let entry_path = entry.path();
        if entry_path.is_file() {
            if let Some(document) = load_file(entry_path)? {
                documents.push(document);
            }
        }
    }

    tracing::info!("Loaded {} document(s) from {:?}", documents.len(), path);

    Ok(documents)
}

/// Load a single file into a document, or `None` if it holds no text.
fn load_file(path: &Path) -> AppResult<Option<Document>> {
    let content_type = ContentType::from_path(path);

    let raw = match fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                tracing::warn!("Skipping non-UTF-8 file: {:?}", path);
                return Ok(None);
            }
        },
        Err(e) => {
            return Err(AppError::Io(e));
        }
    };

    if !is_likely_text(&raw) {
        tracing::warn!("Skipping likely binary file: {:?}", path);
        return Ok(None);
    }

    let pages: Vec<Page> = raw
        .split('\u{000C}')
        .enumerate()
        .map(|(i, page_text)| {
            let text = match content_type {
                ContentType::Markdown => clean_markdown(page_text),
                _ => page_text.to_string(),
            };
            Page {
                number: (i + 1) as u32,
                text,
            }
        })
        .filter(|page| !page.text.trim().is_empty())
        .collect();

    if pages.is_empty() {
        tracing::debug!("No extractable text in {:?}", path);
        return Ok(None);
    }

    tracing::debug!("Loaded {:?}: {} page(s)", path, pages.len());

    Ok(Some(Document {
        source: path.display().to_string(),
        pages,
    }))
}

/// Clean markdown by removing structural formatting that adds no meaning
/// to retrieval: header markers, horizontal rules, and code fences.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim_start_matches('#').trim_start();

        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        result.push_str(trimmed);
        result.push('\n');
    }

    result.trim_end().to_string()
}

/// Check if text is likely prose (not binary).
fn is_likely_text(data: &str) -> bool {
    !data.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_path_is_empty_not_error() {
        let documents = load(Path::new("/nonexistent/policy.md")).unwrap();
        assert!(documents.is_empty());
    }

    #[test]
    fn test_load_single_page_file() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, "doc.txt", "Treaties terminate upon consent.");

        let documents = load(&path).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].pages.len(), 1);
        assert_eq!(documents[0].pages[0].number, 1);
        assert!(documents[0].pages[0].text.contains("Treaties"));
    }

    #[test]
    fn test_form_feed_splits_pages() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, "doc.txt", "page one\u{000C}page two\u{000C}page three");

        let documents = load(&path).unwrap();
        assert_eq!(documents[0].pages.len(), 3);
        assert_eq!(documents[0].pages[1].number, 2);
        assert_eq!(documents[0].pages[1].text, "page two");
    }

    #[test]
    fn test_directory_load_is_sorted() {
        let temp = TempDir::new().unwrap();
        write_file(&temp, "b.txt", "second");
        write_file(&temp, "a.txt", "first");

        let documents = load(temp.path()).unwrap();
        assert_eq!(documents.len(), 2);
        assert!(documents[0].source.ends_with("a.txt"));
        assert!(documents[1].source.ends_with("b.txt"));
    }

    #[test]
    fn test_markdown_cleanup() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, "doc.md", "# Header\n\nSome text\n\n```\ncode\n```\n");

        let documents = load(&path).unwrap();
        let text = &documents[0].pages[0].text;
        assert!(text.contains("Header"));
        assert!(text.contains("Some text"));
        assert!(!text.contains("```"));
        assert!(!text.contains('#'));
    }

    #[test]
    fn test_empty_file_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, "empty.txt", "   \n  ");

        let documents = load(&path).unwrap();
        assert!(documents.is_empty());
    }
}
