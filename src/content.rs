//! Deep page fetch and readable-text extraction.
//!
//! The enhancement selector uses this to replace a top hit's snippet
//! with the lead content of the page itself. Extraction collects
//! paragraph text, trying the main content area first and widening to
//! the whole body; scripts and styles never contribute because only
//! `<p>` text nodes are collected.

use scraper::{Html, Selector};

use crate::error::{Result, SearchError};
use crate::types::PageContent;

/// Cap on extracted characters. Enhancement replaces a snippet, not the
/// whole page.
pub const MAX_CONTENT_CHARS: usize = 1200;

/// Fetch a page and extract its readable lead text.
///
/// # Errors
///
/// [`SearchError::Http`] when the page cannot be fetched,
/// [`SearchError::Parse`] when nothing readable can be extracted.
pub async fn fetch_page_content(
    url: &str,
    timeout_seconds: u64,
    user_agent: Option<&str>,
) -> Result<PageContent> {
    let client = crate::http::build_client(timeout_seconds, user_agent)?;

    tracing::debug!(url, "fetching page for snippet enhancement");
    let response = client
        .get(url)
        .header("Accept", "text/html,application/xhtml+xml")
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("page fetch failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("page fetch HTTP error: {e}")))?;

    let html = response
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("page body read failed: {e}")))?;

    extract_content(&html, url)
}

/// Extract readable lead text from raw HTML.
///
/// # Errors
///
/// [`SearchError::Parse`] when the document holds no extractable text.
pub fn extract_content(html: &str, url: &str) -> Result<PageContent> {
    let document = Html::parse_document(html);

    let Some(text) = paragraph_text(&document) else {
        return Err(SearchError::Parse("no extractable content found".into()));
    };
    let text = collapse_whitespace(&text);
    if text.is_empty() {
        return Err(SearchError::Parse("no extractable content found".into()));
    }

    Ok(PageContent {
        url: url.to_owned(),
        text: truncate_chars(&text, MAX_CONTENT_CHARS),
    })
}

/// Join paragraph text from the main content area. `None` when the page
/// has no substantial paragraphs.
fn paragraph_text(document: &Html) -> Option<String> {
    let scopes = ["article p", "main p", "[role=\"main\"] p", "body p"];
    for scope in scopes {
        let Ok(selector) = Selector::parse(scope) else {
            continue;
        };
        let paragraphs: Vec<String> = document
            .select(&selector)
            .map(|p| p.text().collect::<String>())
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .collect();
        let joined = paragraphs.join(" ");
        // A page of stub paragraphs is not usable lead content.
        if joined.chars().count() >= 40 {
            return Some(joined);
        }
    }
    None
}

/// Collapse all whitespace runs to single spaces.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to a character budget on a whole-char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    text.chars().take(max_chars).collect()
}
