//! Dedup cascade: exact, near-exact, then content-similarity checks.
//!
//! Applied to the fused list in a fixed order, first-seen-wins:
//!
//! 1. exact raw link match
//! 2. canonical-URL match (same page behind tracking parameters)
//! 3. exact lower-cased, trimmed title match (syndicated copies)
//! 4. token-set Jaccard similarity against every kept hit
//!
//! A hit failing any check is discarded outright, never merged. The
//! similarity pass is O(kept²) per request, bounded by the small result
//! set. Title and content checks only apply to text hits — image records
//! carry no content stream and frequently share near-identical captions.

use std::collections::HashSet;

use crate::config::PolicyConfig;
use crate::types::SearchHit;

use super::normalize::canonical_url;
use super::tokenize::token_set;

/// Run the cascade over an ordered fused list, keeping the first
/// occurrence of each identity.
pub fn dedup_cascade(hits: Vec<SearchHit>, policy: &PolicyConfig) -> Vec<SearchHit> {
    let mut seen_raw: HashSet<String> = HashSet::new();
    let mut seen_canonical: HashSet<String> = HashSet::new();
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut kept_token_sets: Vec<HashSet<String>> = Vec::new();
    let mut kept: Vec<SearchHit> = Vec::new();

    let before = hits.len();
    for hit in hits {
        if !seen_raw.insert(hit.raw_key().to_string()) {
            continue;
        }
        if !seen_canonical.insert(canonical_url(hit.raw_key())) {
            continue;
        }

        if !hit.is_image() {
            let title_key = hit.title.trim().to_lowercase();
            if !title_key.is_empty() && !seen_titles.insert(title_key) {
                continue;
            }

            let tokens = token_set(&format!("{} {}", hit.title, hit.snippet()));
            if !tokens.is_empty()
                && kept_token_sets
                    .iter()
                    .any(|kept| jaccard(kept, &tokens) >= policy.jaccard_threshold)
            {
                continue;
            }
            kept_token_sets.push(tokens);
        }

        kept.push(hit);
    }

    if kept.len() < before {
        tracing::debug!(kept = kept.len(), dropped = before - kept.len(), "dedup cascade");
    }
    kept
}

/// Jaccard similarity of two token sets. Empty-against-anything is 0.0.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
