//! Word-level fallback for queries the sites' native search misses.
//!
//! Runs only when a non-empty term produced zero records. Every target
//! site is scanned in full (same filters and content types, no native
//! text search) and an item is kept when each word of the term appears
//! somewhere in its title or plain-text body.
//!
//! Matching is by substring, so `"art"` matches `"party"`. That looseness
//! is accepted: the pass only runs when the strict search found nothing.

use crate::normalize::{fold, plain_text, words};
use crate::query::QuerySpec;
use crate::source::ContentSource;
use crate::types::{ContentItem, SiteId};

use super::dispatch::{DispatchReport, Dispatcher, MatchMode};

/// Folded, whitespace-split words of `term`.
pub fn term_words(term: &str) -> Vec<String> {
    words(&fold(term)).into_iter().map(str::to_owned).collect()
}

/// Whether every word in `words` occurs in the item's title or body.
///
/// `words` must already be folded (see [`term_words`]).
pub fn matches_all_words(item: &ContentItem, words: &[String]) -> bool {
    let haystack = format!("{} {}", fold(&item.title), fold(&plain_text(&item.content)));
    words.iter().all(|word| haystack.contains(word.as_str()))
}

/// Re-scan `sites` keeping items that contain every word of `term`.
pub async fn fallback<S: ContentSource>(
    dispatcher: &Dispatcher<S>,
    term: &str,
    sites: &[SiteId],
    spec: &QuerySpec,
) -> DispatchReport {
    let words = term_words(term);
    if words.is_empty() {
        return DispatchReport::default();
    }
    tracing::debug!(sites = sites.len(), words = words.len(), "running word-level fallback");
    dispatcher.fan_out(sites, spec, MatchMode::WordSet(words)).await
}
