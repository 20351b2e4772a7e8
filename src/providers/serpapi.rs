//! SerpApi image provider — Google Images results via JSON API.
//!
//! The only keyed backend. Keys rotate round-robin through an injected
//! [`KeyPool`] so that request volume spreads across credentials; an
//! empty pool disables the provider with a config error the coordinator
//! logs and tolerates.

use serde::Deserialize;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::keys::KeyPool;
use crate::provider::ProviderAdapter;
use crate::types::{Provider, SearchHit};

const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// SerpApi Google Images adapter with injected key rotation.
pub struct SerpApiImagesAdapter<'a> {
    /// Shared credential pool; the adapter never owns keys itself.
    pub keys: &'a KeyPool,
}

impl ProviderAdapter for SerpApiImagesAdapter<'_> {
    async fn fetch(
        &self,
        query: &str,
        limit: usize,
        config: &SearchConfig,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let Some(api_key) = self.keys.next_key() else {
            return Err(SearchError::Config(
                "no SerpApi keys configured, image search disabled".into(),
            ));
        };

        let base = config
            .serpapi_base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL);
        tracing::trace!(query, base, "SerpApi image search");

        let client = http::build_client(config.timeout_seconds, config.user_agent.as_deref())?;

        let limit_param = limit.to_string();
        let response = client
            .get(format!("{}/search.json", base.trim_end_matches('/')))
            .query(&[
                ("engine", "google_images"),
                ("q", query),
                ("num", limit_param.as_str()),
                ("api_key", api_key),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("SerpApi request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("SerpApi HTTP error: {e}")))?;

        let body: ImagesResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("SerpApi response decode failed: {e}")))?;

        Ok(into_hits(body, limit))
    }

    fn provider(&self) -> Provider {
        Provider::SerpApiImages
    }
}

/// Convert the decoded response into image hits, skipping entries with
/// no original image URL.
fn into_hits(body: ImagesResponse, limit: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for entry in body.images_results.unwrap_or_default() {
        if hits.len() >= limit {
            break;
        }
        let Some(original) = entry.original.filter(|u| !u.is_empty()) else {
            continue;
        };
        hits.push(SearchHit::image(
            Provider::SerpApiImages,
            hits.len(),
            entry.title.unwrap_or_default(),
            entry.link.unwrap_or_default(),
            original,
            entry.thumbnail.unwrap_or_default(),
        ));
    }
    tracing::debug!(count = hits.len(), "SerpApi image results decoded");
    hits
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    images_results: Option<Vec<ImageEntry>>,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    title: Option<String>,
    link: Option<String>,
    original: Option<String>,
    thumbnail: Option<String>,
}
