//! Web search provider.
//!
//! The agent consumes web search as an opaque text-in/text-out capability;
//! no structure is assumed beyond human-readable text. The default
//! implementation uses the DuckDuckGo HTML endpoint (no API key required).

use async_trait::async_trait;
use docent_core::{AppError, AppResult};
use std::time::Duration;

/// Opaque web-search capability.
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Search the web and return a human-readable text result.
    async fn search(&self, query: &str) -> AppResult<String>;
}

/// DuckDuckGo HTML search (no API key needed).
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    max_results: usize,
}

impl DuckDuckGoSearch {
    /// Create a search provider with the given per-request timeout.
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("docent/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Tool(format!("HTTP error: {}", e)))?;

        Ok(Self {
            client,
            max_results: 5,
        })
    }
}

#[async_trait]
impl WebSearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> AppResult<String> {
        let url = format!(
            "https://html.duckduckgo.com/html/?q={}",
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Tool(format!("Search failed: {}", e)))?;

        let html = response
            .text()
            .await
            .map_err(|e| AppError::Tool(format!("Read failed: {}", e)))?;

        let results = parse_ddg_results(&html, self.max_results);

        let output = if results.is_empty() {
            format!("No results found for: {}", query)
        } else {
            let mut out = format!("Search results for \"{}\":\n\n", query);
            for (i, r) in results.iter().enumerate() {
                out.push_str(&format!("{}. {}\n   {}\n   {}\n\n", i + 1, r.0, r.1, r.2));
            }
            out
        };

        Ok(output)
    }
}

/// Pull (title, snippet, url) triples out of the DuckDuckGo result page.
fn parse_ddg_results(html: &str, max: usize) -> Vec<(String, String, String)> {
    let mut results = Vec::new();

    for segment in html.split("class=\"result__a\"").skip(1).take(max) {
        let title = extract_between(segment, ">", "</a>")
            .unwrap_or_default()
            .replace("<b>", "")
            .replace("</b>", "");

        let url = extract_between(segment, "href=\"", "\"").unwrap_or_default();

        let snippet = if let Some(snip_seg) = segment.split("class=\"result__snippet\"").nth(1) {
            extract_between(snip_seg, ">", "</")
                .unwrap_or_default()
                .replace("<b>", "")
                .replace("</b>", "")
        } else {
            String::new()
        };

        if !title.is_empty() {
            results.push((
                title.trim().into(),
                snippet.trim().into(),
                url.trim().into(),
            ));
        }
    }

    results
}

fn extract_between(text: &str, start: &str, end: &str) -> Option<String> {
    let start_idx = text.find(start)? + start.len();
    let remaining = &text[start_idx..];
    let end_idx = remaining.find(end)?;
    Some(remaining[..end_idx].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r##"
        <div><a class="result__a" href="https://example.org/one">First <b>Result</b></a>
        <a class="result__snippet" href="#">A snippet about the first result</a></div>
        <div><a class="result__a" href="https://example.org/two">Second Result</a></div>
    "##;

    #[test]
    fn test_parse_results() {
        let results = parse_ddg_results(SAMPLE_HTML, 5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "First Result");
        assert_eq!(results[0].2, "https://example.org/one");
        assert!(results[0].1.contains("snippet"));
        assert_eq!(results[1].0, "Second Result");
    }

    #[test]
    fn test_parse_respects_max() {
        let results = parse_ddg_results(SAMPLE_HTML, 1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_parse_empty_page() {
        assert!(parse_ddg_results("<html><body></body></html>", 5).is_empty());
    }

    #[test]
    fn test_extract_between() {
        assert_eq!(
            extract_between("<a>hello</a>", ">", "</a>"),
            Some("hello".to_string())
        );
        assert_eq!(extract_between("no markers here", "<", ">"), None);
    }
}
