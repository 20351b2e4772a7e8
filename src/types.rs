//! Core record types flowing through the fusion pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Search backends that meld-search can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// DuckDuckGo HTML endpoint — text results, scraper-friendly.
    DuckDuckGo,
    /// Bing web search — text results, second index.
    Bing,
    /// SerpApi (Google Images engine) — image results via JSON API.
    SerpApiImages,
}

impl Provider {
    /// Human-readable provider name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Bing => "Bing",
            Self::SerpApiImages => "SerpApiImages",
        }
    }

    /// Text providers in registration order. Registration order is the
    /// tie-break and interleaving order used by the fusion stage.
    pub fn text_providers() -> &'static [Provider] {
        &[Self::DuckDuckGo, Self::Bing]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload of a single hit. Text and image providers return different
/// fields; the variant is explicit rather than an open-ended map so that
/// downstream stages can rely on which fields exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HitBody {
    /// A web page hit.
    Text {
        /// Displayed link, exactly as the provider returned it.
        link: String,
        /// Short extract of the page content.
        snippet: String,
    },
    /// An image hit.
    Image {
        /// Page the image was found on.
        source_page: String,
        /// Full-resolution image URL. Identity key for image hits.
        original_url: String,
        /// Preview image URL.
        thumbnail_url: String,
    },
}

/// One search hit from one provider.
///
/// Created by a provider adapter, annotated by the policy filter, scored
/// by the fusion engine, and either kept (possibly with an enhanced
/// snippet) or discarded by the dedup cascade. Hits never outlive the
/// request that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title as returned by the provider.
    pub title: String,
    /// Text or image payload.
    pub body: HitBody,
    /// Originating backend.
    pub provider: Provider,
    /// Zero-based position within the originating provider's list.
    pub provider_rank: usize,
    /// Set by policy filtering. Flagged hits stay in the pipeline with a
    /// damped fusion score; the flag is never cleared.
    pub penalized: bool,
    /// Fusion score. 0.0 until the fusion stage assigns it.
    pub score: f64,
}

impl SearchHit {
    /// Build a text hit at the given provider rank.
    pub fn text(
        provider: Provider,
        provider_rank: usize,
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: HitBody::Text {
                link: link.into(),
                snippet: snippet.into(),
            },
            provider,
            provider_rank,
            penalized: false,
            score: 0.0,
        }
    }

    /// Build an image hit at the given provider rank.
    pub fn image(
        provider: Provider,
        provider_rank: usize,
        title: impl Into<String>,
        source_page: impl Into<String>,
        original_url: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: HitBody::Image {
                source_page: source_page.into(),
                original_url: original_url.into(),
                thumbnail_url: thumbnail_url.into(),
            },
            provider,
            provider_rank,
            penalized: false,
            score: 0.0,
        }
    }

    /// The raw identity URL of this hit: the link for text hits, the
    /// original image URL for image hits.
    pub fn raw_key(&self) -> &str {
        match &self.body {
            HitBody::Text { link, .. } => link,
            HitBody::Image { original_url, .. } => original_url,
        }
    }

    /// Snippet text, empty for image hits.
    pub fn snippet(&self) -> &str {
        match &self.body {
            HitBody::Text { snippet, .. } => snippet,
            HitBody::Image { .. } => "",
        }
    }

    /// Whether this hit carries an image payload.
    pub fn is_image(&self) -> bool {
        matches!(self.body, HitBody::Image { .. })
    }

    /// Replace the snippet of a text hit. No-op for image hits.
    pub fn set_snippet(&mut self, new_snippet: String) {
        if let HitBody::Text { snippet, .. } = &mut self.body {
            *snippet = new_snippet;
        }
    }
}

/// The ordered hits one provider returned for one query.
///
/// Owned by the fan-out coordinator until handed to the filter stage.
/// Stages that reorder produce new vectors; a provider's original order
/// is never shuffled in place.
#[derive(Debug, Clone)]
pub struct ProviderBatch {
    /// Provider that produced these hits.
    pub provider: Provider,
    /// Hits in the provider's own ranking order.
    pub hits: Vec<SearchHit>,
}

impl ProviderBatch {
    /// Wrap a provider's hit list.
    pub fn new(provider: Provider, hits: Vec<SearchHit>) -> Self {
        Self { provider, hits }
    }
}

/// Readable text extracted from a fetched page, used by the enhancement
/// step to replace a top hit's snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// URL the content was fetched from.
    pub url: String,
    /// Extracted readable text, whitespace-normalised.
    pub text: String,
}

impl PageContent {
    /// True when extraction produced no usable text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
