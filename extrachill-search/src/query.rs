//! Query description: what the caller asks for, and what each site receives.

use serde::{Deserialize, Serialize};

use crate::types::SiteId;

/// Field used to order results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    /// Publication date.
    #[default]
    Date,
    /// Last-modified date.
    Modified,
    /// Title, case-insensitive.
    Title,
    /// Keep merge order when there is no term; relevance otherwise.
    Relevance,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse `ASC`/`DESC` in any case. Anything else is `Desc`.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }
}

/// Comparison applied by a [`MetaClause`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaCompare {
    #[default]
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = "!=")]
    NotEquals,
    #[serde(rename = "EXISTS")]
    Exists,
    #[serde(rename = "NOT EXISTS")]
    NotExists,
}

/// How clauses combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relation {
    #[default]
    And,
    Or,
}

/// One metadata condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaClause {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub compare: MetaCompare,
}

/// Metadata filter, passed through to each site untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaQuery {
    #[serde(default)]
    pub relation: Relation,
    #[serde(default)]
    pub clauses: Vec<MetaClause>,
}

impl MetaQuery {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Operator of a [`TaxClause`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxOperator {
    #[default]
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "NOT IN")]
    NotIn,
    #[serde(rename = "AND")]
    And,
}

/// One taxonomy condition. Terms match a term's id or its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxClause {
    pub taxonomy: String,
    pub terms: Vec<String>,
    #[serde(default)]
    pub operator: TaxOperator,
}

/// Taxonomy filter, passed through to each site untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxQuery {
    #[serde(default)]
    pub relation: Relation,
    #[serde(default)]
    pub clauses: Vec<TaxClause>,
}

impl TaxQuery {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// A caller's search request.
///
/// `limit` and `offset` are applied only after every site's records have been
/// merged and ordered; they are never forwarded to a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    /// Free-text term. Empty means "list everything", unscored.
    pub term: String,
    /// Site selectors (domains, URLs or numeric ids). Empty means all sites.
    pub target_sites: Vec<String>,
    /// Allowed statuses, e.g. `["publish"]`.
    pub statuses: Vec<String>,
    pub meta: MetaQuery,
    pub tax: TaxQuery,
    pub order_by: OrderBy,
    pub order: SortOrder,
    /// Window size. `None` returns the whole ordered sequence.
    pub limit: Option<usize>,
    pub offset: usize,
    /// Whether the caller wants the total surfaced; the core always computes it.
    pub want_total: bool,
    /// Page the search was issued from, forwarded to listeners.
    pub referer: Option<String>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            term: String::new(),
            target_sites: Vec::new(),
            statuses: vec!["publish".to_owned()],
            meta: MetaQuery::default(),
            tax: TaxQuery::default(),
            order_by: OrderBy::Date,
            order: SortOrder::Desc,
            limit: Some(10),
            offset: 0,
            want_total: false,
            referer: None,
        }
    }
}

impl QuerySpec {
    /// A default spec for `term`.
    pub fn for_term(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }
}

/// Rewrites a caller's [`QuerySpec`] before the search runs.
///
/// Receives the spec as the caller built it and returns the one actually
/// searched, e.g. to force extra filters or narrow the target sites.
pub trait QueryHook: Send + Sync {
    fn rewrite(&self, spec: QuerySpec) -> QuerySpec;
}

impl<F> QueryHook for F
where
    F: Fn(QuerySpec) -> QuerySpec + Send + Sync,
{
    fn rewrite(&self, spec: QuerySpec) -> QuerySpec {
        self(spec)
    }
}

/// The query one site receives: the caller's filters, scoped to its allowed
/// content types, with no pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteQuery {
    pub site: SiteId,
    pub content_types: Vec<String>,
    pub statuses: Vec<String>,
    pub meta: MetaQuery,
    pub tax: TaxQuery,
    pub order_by: OrderBy,
    pub order: SortOrder,
    /// Normalized term for the site's native search. `None` fetches every
    /// item matching the filters.
    pub search: Option<String>,
}
