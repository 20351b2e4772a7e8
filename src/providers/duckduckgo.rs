//! DuckDuckGo text provider — HTML-only endpoint, no JavaScript needed.
//!
//! Posts to the `html.duckduckgo.com` form endpoint (or a configured
//! reverse proxy) and parses `.result` blocks with CSS selectors. Result
//! links arrive wrapped in a redirect (`/l/?uddg=…`); the real URL is
//! unwrapped before the hit is built.

use scraper::{Html, Selector};
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::ProviderAdapter;
use crate::types::{Provider, SearchHit};

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";

/// DuckDuckGo HTML scraper adapter.
pub struct DuckDuckGoAdapter;

impl DuckDuckGoAdapter {
    /// Unwrap DuckDuckGo's redirect link into the destination URL.
    ///
    /// Wrapped links look like
    /// `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=…`;
    /// relative links are resolved against the endpoint base.
    fn resolve_href(href: &str, base: &str) -> Option<String> {
        let absolute = if href.starts_with("//") {
            format!("https:{href}")
        } else if href.starts_with('/') {
            format!("{}{href}", base.trim_end_matches('/'))
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&absolute).ok()?;
        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(absolute)
        }
    }
}

impl ProviderAdapter for DuckDuckGoAdapter {
    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        config: &SearchConfig,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let base = config.ddg_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        tracing::trace!(query, base, "DuckDuckGo search");

        let client = http::build_client(config.timeout_seconds, config.user_agent.as_deref())?;

        let response = client
            .post(format!("{}/html/", base.trim_end_matches('/')))
            .form(&[("q", query)])
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9,zh-CN;q=0.8")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("DuckDuckGo HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo body read failed: {e}")))?;

        parse_results(&html, limit, base)
    }

    fn provider(&self) -> Provider {
        Provider::DuckDuckGo
    }
}

/// Parse a DuckDuckGo HTML page into hits. Separate from the fetch so
/// tests can feed it fixture markup.
fn parse_results(html: &str, limit: usize, base: &str) -> Result<Vec<SearchHit>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(".result:not(.result--ad)")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut hits = Vec::new();
    for element in document.select(&result_sel) {
        if hits.len() >= limit {
            break;
        }

        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };
        let title = title_el.text().collect::<String>().trim().to_string();
        let Some(href) = title_el.value().attr("href") else {
            continue;
        };
        let Some(link) = DuckDuckGoAdapter::resolve_href(href, base) else {
            continue;
        };
        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        if title.is_empty() || snippet.is_empty() {
            continue;
        }

        hits.push(SearchHit::text(
            Provider::DuckDuckGo,
            hits.len(),
            title,
            link,
            snippet,
        ));
    }

    tracing::debug!(count = hits.len(), "DuckDuckGo results parsed");
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_HTML: &str = r#"<!DOCTYPE html>
<html><body>
<div class="result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc">Rust Programming Language</a>
    <div class="result__snippet">A language empowering everyone to build reliable software.</div>
</div>
<div class="result">
    <a class="result__a" href="https://doc.rust-lang.org/book/">The Rust Book</a>
    <div class="result__snippet">An introductory book about Rust.</div>
</div>
<div class="result result--ad">
    <a class="result__a" href="https://ads.example/click">Sponsored thing</a>
    <div class="result__snippet">Buy now.</div>
</div>
<div class="result">
    <a class="result__a" href="/relative/path">Relative link result</a>
    <div class="result__snippet">Snippet for the relative link.</div>
</div>
</body></html>"#;

    #[test]
    fn resolve_href_unwraps_redirect() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc";
        assert_eq!(
            DuckDuckGoAdapter::resolve_href(href, DEFAULT_BASE_URL),
            Some("https://example.com/page".to_string())
        );
    }

    #[test]
    fn resolve_href_passes_direct_links() {
        assert_eq!(
            DuckDuckGoAdapter::resolve_href("https://example.com/x", DEFAULT_BASE_URL),
            Some("https://example.com/x".to_string())
        );
    }

    #[test]
    fn resolve_href_resolves_relative_against_base() {
        assert_eq!(
            DuckDuckGoAdapter::resolve_href("/path", "https://proxy.example"),
            Some("https://proxy.example/path".to_string())
        );
    }

    #[test]
    fn resolve_href_rejects_garbage() {
        assert!(DuckDuckGoAdapter::resolve_href("not-a-url", DEFAULT_BASE_URL).is_none());
    }

    #[test]
    fn parse_extracts_hits_with_ranks() {
        let hits = parse_results(MOCK_HTML, 10, DEFAULT_BASE_URL).expect("should parse");
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "Rust Programming Language");
        assert_eq!(hits[0].raw_key(), "https://www.rust-lang.org/");
        assert_eq!(hits[0].provider_rank, 0);
        assert_eq!(hits[1].provider_rank, 1);
        assert_eq!(hits[2].raw_key(), "https://html.duckduckgo.com/relative/path");
    }

    #[test]
    fn parse_excludes_ads() {
        let hits = parse_results(MOCK_HTML, 10, DEFAULT_BASE_URL).expect("should parse");
        assert!(hits.iter().all(|h| !h.title.contains("Sponsored")));
    }

    #[test]
    fn parse_respects_limit() {
        let hits = parse_results(MOCK_HTML, 1, DEFAULT_BASE_URL).expect("should parse");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn parse_empty_page_is_empty_success() {
        let hits =
            parse_results("<html><body></body></html>", 10, DEFAULT_BASE_URL).expect("parses");
        assert!(hits.is_empty());
    }

    #[tokio::test]
    #[ignore] // Live test — run with `cargo test -- --ignored`
    async fn live_search() {
        let adapter = DuckDuckGoAdapter;
        let config = SearchConfig::default();
        let hits = adapter.fetch("rust programming", 10, &config).await;
        let hits = hits.expect("live search should work");
        assert!(!hits.is_empty());
    }
}
