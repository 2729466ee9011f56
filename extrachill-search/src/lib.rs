//! # extrachill-search
//!
//! Federated search across the sites of a multisite content network.
//!
//! One query fans out to every participating site concurrently, the
//! per-site answers are merged, scored for relevance, ordered globally and
//! windowed. Every hit carries the name and domain of the site it came
//! from.
//!
//! ## Design
//!
//! - Sites come from a [`registry::SiteDirectory`], read once and cached
//! - Each site exposes only the content types its [`policy::ContentTypePolicy`] allows
//! - Per-site work runs in its own task with a timeout and a concurrency bound
//! - A failing or slow site is logged and left out; the search still answers
//! - When a term finds nothing, a looser word-level match is tried
//! - Storage is abstracted behind [`source::ContentSource`]
//!
//! ## Security
//!
//! - Read-only: nothing is written to any site
//! - Search terms are logged only at trace level

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod normalize;
pub mod orchestrator;
pub mod policy;
pub mod query;
pub mod registry;
pub mod source;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use events::{SearchListener, SearchPerformed};
pub use orchestrator::scoring::ScoringWeights;
pub use orchestrator::search::FederatedSearch;
pub use policy::{ContentTypeHook, ContentTypePolicy};
pub use query::{OrderBy, QueryHook, QuerySpec, SortOrder};
pub use registry::{network_registry, SiteDirectory, SiteRegistry, StaticSiteMap};
pub use source::ContentSource;
pub use types::{
    ContentItem, ContentRecord, ItemId, SearchHit, SearchResults, Site, SiteId, TaxonomyTerm,
    TaxonomyTerms, Thumbnail,
};
