//! Final response assembly: truncate, summarize, fall back.
//!
//! The deduplicated list is truncated to the caller's limit and the
//! truncated list — exactly what the caller would otherwise see — is
//! handed to the summarizer. Any summarizer failure degrades to the
//! ranked listing itself; assembly never fails once hits exist.

use crate::config::{SearchConfig, SummarizerConfig};
use crate::summarize::{self, Summary};
use crate::types::SearchHit;

/// The assembled outcome of a search request.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// The summarizer produced a structured synthesis.
    Summarized(Summary),
    /// Summarization was disabled or failed; the ranked, deduplicated
    /// hits stand on their own.
    Listing(Vec<SearchHit>),
}

impl SearchOutcome {
    /// The hits behind this outcome: summary sources have their own
    /// shape, so this is only populated for listings.
    pub fn hits(&self) -> &[SearchHit] {
        match self {
            Self::Summarized(_) => &[],
            Self::Listing(hits) => hits,
        }
    }
}

/// Truncate to the limit and attempt summarization.
pub async fn assemble(
    query: &str,
    mut hits: Vec<SearchHit>,
    config: &SearchConfig,
) -> SearchOutcome {
    hits.truncate(config.max_results);

    if !summarizer_enabled(&config.summarizer) {
        return SearchOutcome::Listing(hits);
    }

    match summarize::summarize(query, &hits, &config.summarizer).await {
        Ok(summary) => {
            tracing::debug!(sources = summary.sources.len(), "summary generated");
            SearchOutcome::Summarized(summary)
        }
        Err(err) => {
            tracing::warn!(error = %err, "summarization unavailable, returning ranked listing");
            SearchOutcome::Listing(hits)
        }
    }
}

/// Render a listing as numbered source blocks, entries numbered from 1.
pub fn render_listing(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "Source [{}]:\nTitle: {}\nSnippet: {}\nURL: {}",
                i + 1,
                hit.title,
                hit.snippet(),
                hit.raw_key()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Whether a summarizer is configured at all. Callers can skip the
/// summarize attempt entirely when it is not.
pub fn summarizer_enabled(config: &SummarizerConfig) -> bool {
    config.api_key.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Provider;

    fn hit(rank: usize, title: &str) -> SearchHit {
        SearchHit::text(
            Provider::DuckDuckGo,
            rank,
            title,
            format!("https://example.com/{rank}"),
            format!("snippet {rank}"),
        )
    }

    #[tokio::test]
    async fn unconfigured_summarizer_falls_back_to_listing() {
        let config = SearchConfig::default();
        let hits = vec![hit(0, "First"), hit(1, "Second")];
        let outcome = assemble("query", hits, &config).await;
        match outcome {
            SearchOutcome::Listing(hits) => assert_eq!(hits.len(), 2),
            SearchOutcome::Summarized(_) => panic!("no summarizer is configured"),
        }
    }

    #[tokio::test]
    async fn listing_truncated_to_limit() {
        let config = SearchConfig {
            max_results: 3,
            ..Default::default()
        };
        let hits: Vec<_> = (0..10).map(|i| hit(i, &format!("T{i}"))).collect();
        let outcome = assemble("query", hits, &config).await;
        assert_eq!(outcome.hits().len(), 3);
    }

    #[test]
    fn listing_rendering_numbers_from_one() {
        let hits = vec![hit(0, "Alpha"), hit(1, "Beta")];
        let rendered = render_listing(&hits);
        assert!(rendered.starts_with("Source [1]:\nTitle: Alpha"));
        assert!(rendered.contains("Source [2]:\nTitle: Beta"));
        assert!(rendered.contains("URL: https://example.com/1"));
    }

    #[test]
    fn empty_listing_renders_empty() {
        assert!(render_listing(&[]).is_empty());
    }

    #[test]
    fn summarizer_enabled_tracks_key_presence() {
        assert!(!summarizer_enabled(&SummarizerConfig::default()));
        let with_key = SummarizerConfig {
            api_key: Some("k".into()),
            ..Default::default()
        };
        assert!(summarizer_enabled(&with_key));
    }
}
