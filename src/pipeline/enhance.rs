//! Snippet enhancement for the top-ranked hit.
//!
//! After dedup, one hit may get its snippet replaced by the lead content
//! of the page itself. Hits from configured rich-content hosts are
//! preferred over the literal top rank. The step never removes a hit and
//! never fails the pipeline — any fetch or extraction problem leaves the
//! original snippet in place.

use crate::config::{PolicyConfig, SearchConfig};
use crate::content;
use crate::types::SearchHit;

use super::normalize::canonical_host;

/// Replace the selected hit's snippet with deep page content, best effort.
pub async fn enhance_top_hit(hits: &mut [SearchHit], policy: &PolicyConfig, config: &SearchConfig) {
    let Some(index) = select_candidate(hits, policy) else {
        return;
    };

    let url = hits[index].raw_key().to_string();
    match content::fetch_page_content(&url, config.timeout_seconds, config.user_agent.as_deref())
        .await
    {
        Ok(page) if !page.is_empty() => {
            tracing::debug!(url = %url, chars = page.text.len(), "snippet enhanced");
            hits[index].set_snippet(page.text);
        }
        Ok(_) => {
            tracing::debug!(url = %url, "page fetch returned no content, snippet unchanged");
        }
        Err(err) => {
            tracing::debug!(url = %url, error = %err, "enhancement failed, snippet unchanged");
        }
    }
}

/// Pick the hit to enhance: the first text hit from a rich-content host
/// if any, otherwise the top-ranked text hit.
pub fn select_candidate(hits: &[SearchHit], policy: &PolicyConfig) -> Option<usize> {
    let rich = hits.iter().position(|hit| {
        if hit.is_image() {
            return false;
        }
        let host = canonical_host(hit.raw_key());
        policy
            .rich_content_hosts
            .iter()
            .any(|rich_host| host.contains(rich_host.as_str()))
    });
    rich.or_else(|| hits.iter().position(|hit| !hit.is_image()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Provider;

    fn hit(rank: usize, link: &str) -> SearchHit {
        SearchHit::text(Provider::DuckDuckGo, rank, format!("T{rank}"), link, "s")
    }

    #[test]
    fn default_candidate_is_top_hit() {
        let policy = PolicyConfig::default();
        let hits = vec![hit(0, "https://first.example/a"), hit(1, "https://second.example/b")];
        assert_eq!(select_candidate(&hits, &policy), Some(0));
    }

    #[test]
    fn rich_content_host_preferred_over_top_rank() {
        let policy = PolicyConfig {
            rich_content_hosts: vec!["wiki.example".into()],
            ..Default::default()
        };
        let hits = vec![
            hit(0, "https://other.example/a"),
            hit(1, "https://wiki.example/entry"),
            hit(2, "https://wiki.example/another"),
        ];
        assert_eq!(select_candidate(&hits, &policy), Some(1));
    }

    #[test]
    fn image_hits_never_selected() {
        let policy = PolicyConfig::default();
        let hits = vec![
            SearchHit::image(
                Provider::SerpApiImages,
                0,
                "pic",
                "https://p.com",
                "https://p.com/i.jpg",
                "https://p.com/t.jpg",
            ),
            hit(1, "https://text.example/a"),
        ];
        assert_eq!(select_candidate(&hits, &policy), Some(1));
    }

    #[test]
    fn no_text_hits_selects_nothing() {
        let policy = PolicyConfig::default();
        let hits = vec![SearchHit::image(
            Provider::SerpApiImages,
            0,
            "pic",
            "https://p.com",
            "https://p.com/i.jpg",
            "https://p.com/t.jpg",
        )];
        assert_eq!(select_candidate(&hits, &policy), None);
    }

    #[tokio::test]
    async fn fetch_failure_leaves_snippet_untouched() {
        let policy = PolicyConfig::default();
        let config = SearchConfig {
            timeout_seconds: 1,
            ..Default::default()
        };
        // Unroutable address: the fetch fails fast and the snippet stays.
        let mut hits = vec![hit(0, "http://127.0.0.1:9/never")];
        enhance_top_hit(&mut hits, &policy, &config).await;
        assert_eq!(hits[0].snippet(), "s");
    }
}
