//! Trait definition for the content repositories behind each site.
//!
//! The pipeline never reads storage itself. Every site query and every
//! metadata lookup goes through a [`ContentSource`], with the site passed
//! explicitly, so any number of sites can be queried at once.

use std::future::Future;

use crate::error::SearchError;
use crate::query::SiteQuery;
use crate::types::{ContentItem, ItemId, SiteId, TaxonomyTerms, Thumbnail};

/// Access to the content of every site in the network.
///
/// Implementors execute queries against a site's own storage. Each method
/// takes the target site as a parameter; there is no "current site".
///
/// All implementations must be `Send + Sync` because sites are queried from
/// concurrently running tasks.
pub trait ContentSource: Send + Sync + 'static {
    /// Run one query against `query.site`.
    ///
    /// Returns every item of `query.content_types` that passes the status,
    /// meta and taxonomy filters and, when `query.search` is set, the site's
    /// native text search. No pagination is applied.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the site cannot be queried. The caller
    /// treats that as "zero records from this site".
    fn query_scoped(
        &self,
        query: &SiteQuery,
    ) -> impl Future<Output = Result<Vec<ContentItem>, SearchError>> + Send;

    /// Fetch one item by id, regardless of type or status filters.
    /// Used to resolve a reply's parent thread.
    fn item(
        &self,
        site: SiteId,
        id: ItemId,
    ) -> impl Future<Output = Result<Option<ContentItem>, SearchError>> + Send;

    /// Public taxonomy terms attached to an item, keyed by taxonomy name.
    fn taxonomy_terms(
        &self,
        site: SiteId,
        id: ItemId,
    ) -> impl Future<Output = Result<TaxonomyTerms, SearchError>> + Send;

    /// Featured image metadata for an item, if it has one.
    fn thumbnail(
        &self,
        site: SiteId,
        id: ItemId,
    ) -> impl Future<Output = Result<Option<Thumbnail>, SearchError>> + Send;
}
