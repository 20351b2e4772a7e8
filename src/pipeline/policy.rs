//! Blacklist policy and per-provider keyword-priority reordering.
//!
//! Policy marks or removes low-quality hits before fusion. A blacklist
//! match is exempt when the matched substring also appears in the query
//! itself — a domain the user explicitly searched for is never treated
//! as spam.

use crate::config::{BlacklistMode, PolicyConfig};
use crate::types::{ProviderBatch, SearchHit};

use super::normalize::canonical_host;

/// Apply blacklist policy and keyword-priority reordering to each batch.
///
/// Hits are flagged (`Penalize`) or removed (`Drop`) on a domain or title
/// blacklist match, then each provider's list is stably partitioned so
/// that hits whose title contains the query come first. Order within the
/// two partitions is the provider's own.
pub fn filter_batches(
    batches: Vec<ProviderBatch>,
    policy: &PolicyConfig,
    query: &str,
) -> Vec<ProviderBatch> {
    let query_lc = query.to_lowercase();
    batches
        .into_iter()
        .map(|batch| {
            let provider = batch.provider;
            let mut hits = Vec::with_capacity(batch.hits.len());
            for mut hit in batch.hits {
                match screen_hit(&mut hit, policy, &query_lc) {
                    Screen::Keep => hits.push(hit),
                    Screen::Discard => {
                        tracing::debug!(
                            provider = %provider,
                            url = hit.raw_key(),
                            "hit dropped by blacklist policy"
                        );
                    }
                }
            }
            ProviderBatch::new(provider, prioritize_query_titles(hits, &query_lc))
        })
        .collect()
}

enum Screen {
    Keep,
    Discard,
}

/// Evaluate one hit against the domain and title blacklists.
///
/// The title check only runs when the domain check did not already flag
/// the hit.
fn screen_hit(hit: &mut SearchHit, policy: &PolicyConfig, query_lc: &str) -> Screen {
    let host = canonical_host(hit.raw_key());
    let domain_match = policy
        .domain_blacklist
        .iter()
        .any(|needle| host.contains(needle.as_str()) && !query_lc.contains(needle.as_str()));

    if domain_match {
        return match policy.blacklist_mode {
            BlacklistMode::Drop => Screen::Discard,
            BlacklistMode::Penalize => {
                hit.penalized = true;
                Screen::Keep
            }
        };
    }

    if !hit.penalized {
        let title_lc = hit.title.to_lowercase();
        let title_match = policy
            .title_blacklist
            .iter()
            .any(|kw| title_lc.contains(kw.as_str()) && !query_lc.contains(kw.as_str()));
        if title_match {
            return match policy.blacklist_mode {
                BlacklistMode::Drop => Screen::Discard,
                BlacklistMode::Penalize => {
                    hit.penalized = true;
                    Screen::Keep
                }
            };
        }
    }

    Screen::Keep
}

/// Stable partition: hits whose lower-cased title contains the query move
/// to the front; relative order inside each group is untouched. This is
/// deliberately not a sort.
fn prioritize_query_titles(hits: Vec<SearchHit>, query_lc: &str) -> Vec<SearchHit> {
    if query_lc.is_empty() {
        return hits;
    }
    let (mut matching, rest): (Vec<_>, Vec<_>) = hits
        .into_iter()
        .partition(|hit| hit.title.to_lowercase().contains(query_lc));
    matching.extend(rest);
    matching
}
