//! Public search entry surface: request parsing, response shaping, paging.

use extrachill_search::query::{MetaQuery, TaxQuery};
use extrachill_search::{
    ContentSource, FederatedSearch, OrderBy, QuerySpec, SearchError, SearchHit, SearchResults,
    SortOrder,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A search request as it arrives from a caller.
///
/// Only `search_term` is required. A negative `limit` returns every match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub search_term: String,
    /// Domains, URLs or numeric site ids. Empty searches every site.
    #[serde(default)]
    pub site_urls: Vec<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_post_status")]
    pub post_status: Vec<String>,
    #[serde(default = "default_orderby")]
    pub orderby: String,
    #[serde(default = "default_order")]
    pub order: String,
    #[serde(default)]
    pub return_count: bool,
    #[serde(default)]
    pub meta_query: MetaQuery,
    #[serde(default)]
    pub tax_query: TaxQuery,
    /// Page the request was issued from, forwarded to listeners.
    #[serde(default)]
    pub referer: Option<String>,
}

fn default_limit() -> i64 {
    10
}

fn default_post_status() -> Vec<String> {
    vec!["publish".to_owned()]
}

fn default_orderby() -> String {
    "date".to_owned()
}

fn default_order() -> String {
    "DESC".to_owned()
}

/// Parse an `orderby` value in any case. Unknown values order by date.
pub fn parse_order_by(raw: &str) -> OrderBy {
    match raw.trim().to_ascii_lowercase().as_str() {
        "modified" => OrderBy::Modified,
        "title" => OrderBy::Title,
        "relevance" => OrderBy::Relevance,
        _ => OrderBy::Date,
    }
}

impl SearchRequest {
    /// A request for `term` with every other field at its default.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            search_term: term.into(),
            site_urls: Vec::new(),
            limit: default_limit(),
            offset: 0,
            post_status: default_post_status(),
            orderby: default_orderby(),
            order: default_order(),
            return_count: false,
            meta_query: MetaQuery::default(),
            tax_query: TaxQuery::default(),
            referer: None,
        }
    }

    /// Parse a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for a request.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert into the pipeline's query description.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MissingInput`] when `search_term` is blank.
    pub fn to_query(&self) -> std::result::Result<QuerySpec, SearchError> {
        if self.search_term.trim().is_empty() {
            return Err(SearchError::MissingInput("search_term".into()));
        }
        Ok(QuerySpec {
            term: self.search_term.clone(),
            target_sites: self.site_urls.clone(),
            statuses: self.post_status.clone(),
            meta: self.meta_query.clone(),
            tax: self.tax_query.clone(),
            order_by: parse_order_by(&self.orderby),
            order: SortOrder::parse_lenient(&self.order),
            limit: usize::try_from(self.limit).ok(),
            offset: self.offset,
            want_total: self.return_count,
            referer: self.referer.clone(),
        })
    }
}

/// Response body: a bare hit list, or hits with a total when the caller
/// asked for a count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Counted { results: Vec<SearchHit>, total: usize },
    Results(Vec<SearchHit>),
}

impl SearchResponse {
    pub fn from_results(results: SearchResults, return_count: bool) -> Self {
        if return_count {
            Self::Counted {
                results: results.results,
                total: results.total,
            }
        } else {
            Self::Results(results.results)
        }
    }

    /// The hits, whichever shape the response has.
    pub fn hits(&self) -> &[SearchHit] {
        match self {
            Self::Counted { results, .. } | Self::Results(results) => results,
        }
    }
}

/// Validate `request`, run it, and shape the response.
///
/// # Errors
///
/// Returns an error only for an invalid request. Site failures never
/// surface here.
pub async fn handle_request<S: ContentSource>(
    search: &FederatedSearch<S>,
    request: &SearchRequest,
) -> Result<SearchResponse> {
    let spec = request.to_query()?;
    let results = search.search(&spec).await;
    Ok(SearchResponse::from_results(results, request.return_count))
}

/// Page-number view of `offset`/`limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// One-based page number.
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Pages are one-based; page 0 is treated as page 1.
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page,
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Number of pages needed for `total` results.
    pub fn page_count(&self, total: usize) -> usize {
        if self.per_page == 0 {
            return 0;
        }
        total.div_ceil(self.per_page)
    }

    /// Apply this page to a request.
    pub fn apply(&self, request: &mut SearchRequest) {
        request.offset = self.offset();
        request.limit = i64::try_from(self.per_page).unwrap_or(i64::MAX);
    }
}
