//! Core types: sites, content records and search results.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a content item within its own site.
pub type ItemId = u64;

/// Taxonomy terms attached to a record, keyed by taxonomy name.
pub type TaxonomyTerms = BTreeMap<String, Vec<TaxonomyTerm>>;

/// Stable identifier of one site in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub u64);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SiteId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One independently content-scoped repository in the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Stable identifier, unique across the registry.
    pub id: SiteId,
    /// Display name.
    pub name: String,
    /// Canonical host, unique across the registry (e.g. `shop.extrachill.com`).
    pub domain: String,
}

impl Site {
    /// Convenience constructor.
    pub fn new(id: u64, name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            id: SiteId(id),
            name: name.into(),
            domain: domain.into(),
        }
    }
}

/// A content item as a site's native query returns it, before enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ItemId,
    pub title: String,
    /// Raw body, possibly containing markup.
    #[serde(default)]
    pub content: String,
    /// Hand-written excerpt, if the author supplied one.
    #[serde(default)]
    pub excerpt: Option<String>,
    pub published_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub content_type: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub author_id: u64,
    /// Parent item (threads for replies, parent pages, ...).
    #[serde(default)]
    pub parent_id: Option<ItemId>,
    #[serde(default)]
    pub permalink: String,
    /// Free-form key/value metadata; only content sources interpret it.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

fn default_status() -> String {
    "publish".to_owned()
}

/// One taxonomy term attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyTerm {
    pub id: u64,
    pub name: String,
}

/// Featured image metadata for a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub srcset: String,
    #[serde(default)]
    pub sizes: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// One enriched content item, tagged with the site it came from.
///
/// `site_id` is set when the record is built by the dispatcher and is never
/// reassigned afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: ItemId,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub published_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub content_type: String,
    pub slug: String,
    pub author_id: u64,
    pub site_id: SiteId,
    pub permalink: String,
    #[serde(default)]
    pub taxonomies: TaxonomyTerms,
    #[serde(default)]
    pub thumbnail: Option<Thumbnail>,
}

/// A record annotated with its relevance score.
///
/// `score` is `None` when the search term was empty and scoring was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: ContentRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl ScoredRecord {
    /// Wrap a record without a score.
    pub fn unscored(record: ContentRecord) -> Self {
        Self {
            record,
            score: None,
        }
    }

    /// Score used for ordering; unscored records rank as zero.
    pub fn rank(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// A single search result in its output shape, with site provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub record: ContentRecord,
    /// Display name of the originating site.
    pub site_name: String,
    /// Host of the originating site.
    pub site_domain: String,
    /// Relevance score, absent for empty-term searches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// The merged, windowed outcome of one federated search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// The requested window of the fully ordered result sequence.
    pub results: Vec<SearchHit>,
    /// Count of all matching records across all sites, before windowing.
    pub total: usize,
    /// Sites that failed or timed out during this search.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_sites: Vec<SiteId>,
}

impl SearchResults {
    /// An empty result set.
    pub fn empty() -> Self {
        Self::default()
    }
}
