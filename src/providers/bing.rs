//! Bing text provider — second index behind the organic `li.b_algo` list.
//!
//! Bing sometimes answers automated traffic with a verification
//! interstitial instead of results; that page is reported as a parse
//! failure so the coordinator excludes the provider for the request.

use scraper::{Html, Selector};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::ProviderAdapter;
use crate::types::{Provider, SearchHit};

const DEFAULT_BASE_URL: &str = "https://www.bing.com";

/// Bing HTML scraper adapter.
pub struct BingAdapter;

impl ProviderAdapter for BingAdapter {
    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        config: &SearchConfig,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let base = config.bing_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        tracing::trace!(query, base, "Bing search");

        let client = http::build_client(config.timeout_seconds, config.user_agent.as_deref())?;

        let response = client
            .get(format!("{}/search", base.trim_end_matches('/')))
            .query(&[("q", query), ("mkt", "zh-CN")])
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Bing request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Bing HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("Bing body read failed: {e}")))?;

        if html.contains("验证") {
            return Err(SearchError::Parse(
                "Bing served a verification page, request was blocked".into(),
            ));
        }

        parse_results(&html, limit)
    }

    fn provider(&self) -> Provider {
        Provider::Bing
    }
}

/// Parse a Bing results page into hits.
fn parse_results(html: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse("li.b_algo")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse("h2 > a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".b_caption p, .b_lineclamp2")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut hits = Vec::new();
    for element in document.select(&result_sel) {
        if hits.len() >= limit {
            break;
        }

        let Some(anchor) = element.select(&title_sel).next() else {
            continue;
        };
        let title = anchor.text().collect::<String>().trim().to_string();
        let link = anchor
            .value()
            .attr("href")
            .map(str::to_string)
            .unwrap_or_default();
        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        if title.is_empty() || link.is_empty() || snippet.is_empty() {
            continue;
        }

        hits.push(SearchHit::text(
            Provider::Bing,
            hits.len(),
            title,
            link,
            snippet,
        ));
    }

    if hits.is_empty() {
        tracing::warn!("Bing returned no parseable results, page structure may have changed");
    } else {
        tracing::debug!(count = hits.len(), "Bing results parsed");
    }
    Ok(hits)
}
