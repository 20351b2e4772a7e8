//! URL canonicalization and field validation.
//!
//! The canonical form computed here is the dedup/identity key used by the
//! fusion and dedup stages; the displayed link is never rewritten.

use url::Url;

use crate::types::{HitBody, ProviderBatch};

/// Canonicalize a URL into the identity key form.
///
/// Lower-cases the host, strips the fragment, and removes click-tracking
/// query parameters (any key prefixed `utm_` case-insensitively, plus
/// `gclid` and `fbclid`). Path and the remaining query string are kept
/// verbatim, in their original order. Unparseable input comes back
/// unchanged.
///
/// Idempotent: `canonical_url(canonical_url(u)) == canonical_url(u)`.
pub fn canonical_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    parsed.set_fragment(None);

    // Filter tracking keys on the raw query text so kept pairs stay
    // byte-for-byte as the provider sent them.
    if let Some(query) = parsed.query().map(str::to_owned) {
        let kept: Vec<&str> = query
            .split('&')
            .filter(|pair| !is_tracking_param(pair))
            .collect();
        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.set_query(Some(&kept.join("&")));
        }
    }

    // Url::parse already lower-cases scheme and host.
    parsed.to_string()
}

/// The host of a URL, lower-cased. Empty string when unparseable.
pub fn canonical_host(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_default()
}

/// Whether a raw `key=value` query pair is a click-tracking parameter.
fn is_tracking_param(pair: &str) -> bool {
    let key = pair.split('=').next().unwrap_or(pair).to_lowercase();
    key.starts_with("utm_") || key == "gclid" || key == "fbclid"
}

/// Drop hits missing a required field or an identity key.
///
/// Text hits need a non-empty link, title, and snippet; image hits need a
/// non-empty original URL. After this pass every hit has a usable
/// identity key.
pub fn validate_batches(batches: Vec<ProviderBatch>) -> Vec<ProviderBatch> {
    batches
        .into_iter()
        .map(|batch| {
            let provider = batch.provider;
            let before = batch.hits.len();
            let hits: Vec<_> = batch
                .hits
                .into_iter()
                .filter(|hit| match &hit.body {
                    HitBody::Text { link, snippet } => {
                        !link.is_empty() && !hit.title.is_empty() && !snippet.is_empty()
                    }
                    HitBody::Image { original_url, .. } => !original_url.is_empty(),
                })
                .collect();
            if hits.len() < before {
                tracing::debug!(
                    provider = %provider,
                    dropped = before - hits.len(),
                    "dropped hits with missing required fields"
                );
            }
            ProviderBatch::new(provider, hits)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Provider, SearchHit};

    #[test]
    fn lowercases_host_keeps_path_case() {
        let result = canonical_url("HTTPS://Example.COM/Some/Path");
        assert_eq!(result, "https://example.com/Some/Path");
    }

    #[test]
    fn strips_fragment() {
        let result = canonical_url("https://example.com/page#section-2");
        assert_eq!(result, "https://example.com/page");
    }

    #[test]
    fn strips_utm_parameters_case_insensitively() {
        let result = canonical_url("https://example.com/page?q=rust&UTM_Source=mail&utm_medium=x");
        assert_eq!(result, "https://example.com/page?q=rust");
    }

    #[test]
    fn strips_gclid_and_fbclid() {
        let result = canonical_url("https://example.com/p?gclid=abc&a=1&fbclid=xyz");
        assert_eq!(result, "https://example.com/p?a=1");
    }

    #[test]
    fn keeps_remaining_query_order_verbatim() {
        let result = canonical_url("https://example.com/search?z=1&a=2&m=3");
        assert_eq!(result, "https://example.com/search?z=1&a=2&m=3");
    }

    #[test]
    fn clears_query_when_only_tracking_params() {
        let result = canonical_url("https://example.com/page?utm_source=a&gclid=b");
        assert_eq!(result, "https://example.com/page");
    }

    #[test]
    fn unparseable_input_unchanged() {
        assert_eq!(canonical_url("not a url"), "not a url");
        assert_eq!(canonical_url(""), "");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let inputs = [
            "https://Example.COM/path?b=2&utm_source=x&a=1#frag",
            "https://example.com/plain",
            "http://host.example:8080/p?q=%E6%90%9C%E7%B4%A2",
            "garbage input",
        ];
        for input in inputs {
            let once = canonical_url(input);
            let twice = canonical_url(&once);
            assert_eq!(once, twice, "not idempotent for {input}");
        }
    }

    #[test]
    fn tracking_equivalent_urls_share_canonical_form() {
        let a = canonical_url("https://example.com/page?q=rust");
        let b = canonical_url("https://example.com/page?q=rust&utm_campaign=spring&fbclid=123");
        assert_eq!(a, b);
    }

    #[test]
    fn canonical_host_extraction() {
        assert_eq!(canonical_host("https://News.Example.com/a"), "news.example.com");
        assert_eq!(canonical_host("not a url"), "");
    }

    #[test]
    fn validate_drops_incomplete_text_hits() {
        let batch = ProviderBatch::new(
            Provider::DuckDuckGo,
            vec![
                SearchHit::text(Provider::DuckDuckGo, 0, "Good", "https://a.com", "snippet"),
                SearchHit::text(Provider::DuckDuckGo, 1, "", "https://b.com", "snippet"),
                SearchHit::text(Provider::DuckDuckGo, 2, "No link", "", "snippet"),
                SearchHit::text(Provider::DuckDuckGo, 3, "No snippet", "https://c.com", ""),
            ],
        );
        let validated = validate_batches(vec![batch]);
        assert_eq!(validated[0].hits.len(), 1);
        assert_eq!(validated[0].hits[0].title, "Good");
    }

    #[test]
    fn validate_drops_images_without_original_url() {
        let batch = ProviderBatch::new(
            Provider::SerpApiImages,
            vec![
                SearchHit::image(Provider::SerpApiImages, 0, "", "https://p.com", "https://i.com/full.jpg", ""),
                SearchHit::image(Provider::SerpApiImages, 1, "t", "https://p.com", "", "https://i.com/t.jpg"),
            ],
        );
        let validated = validate_batches(vec![batch]);
        // Image hits only need the original URL; empty title is fine.
        assert_eq!(validated[0].hits.len(), 1);
        assert_eq!(validated[0].hits[0].raw_key(), "https://i.com/full.jpg");
    }

    #[test]
    fn validate_preserves_provider_rank_of_survivors() {
        let batch = ProviderBatch::new(
            Provider::Bing,
            vec![
                SearchHit::text(Provider::Bing, 0, "a", "", "s"),
                SearchHit::text(Provider::Bing, 1, "b", "https://b.com", "s"),
            ],
        );
        let validated = validate_batches(vec![batch]);
        assert_eq!(validated[0].hits[0].provider_rank, 1);
    }
}
