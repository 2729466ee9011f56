//! In-memory content repository for every site of the network.
//!
//! [`MemoryStore`] answers site queries the way a site's own storage
//! would: content-type and status scoping, meta and taxonomy filters, a
//! per-word native text search, and the requested ordering. It can be
//! built in code or loaded from a JSON document:
//!
//! ```json
//! {
//!   "sites": {
//!     "1": {
//!       "items": [{ "id": 1, "title": "Hello", "content_type": "post",
//!                   "published_at": "2025-01-01T00:00:00Z",
//!                   "modified_at": "2025-01-01T00:00:00Z" }],
//!       "taxonomies": { "1": { "category": [{ "id": 3, "name": "News" }] } },
//!       "thumbnails": {}
//!     }
//!   }
//! }
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use extrachill_search::normalize::{fold, plain_text, words};
use extrachill_search::query::{
    MetaClause, MetaCompare, MetaQuery, OrderBy, Relation, SiteQuery, SortOrder, TaxClause,
    TaxOperator, TaxQuery,
};
use extrachill_search::{
    ContentItem, ContentSource, ItemId, SearchError, SiteId, TaxonomyTerms, Thumbnail,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Everything one site stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteContent {
    pub items: Vec<ContentItem>,
    pub taxonomies: BTreeMap<ItemId, TaxonomyTerms>,
    pub thumbnails: BTreeMap<ItemId, Thumbnail>,
}

#[derive(Debug, Default, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    sites: BTreeMap<SiteId, SiteContent>,
}

/// Per-site item lists behind the [`ContentSource`] interface.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sites: BTreeMap<SiteId, SiteContent>,
    failing: BTreeSet<SiteId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON store document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON for a store.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: StoreDocument = serde_json::from_str(json)?;
        tracing::debug!(sites = document.sites.len(), "content store loaded");
        Ok(Self {
            sites: document.sites,
            failing: BTreeSet::new(),
        })
    }

    /// Read and parse a JSON store document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Add an item to `site`.
    pub fn insert(&mut self, site: SiteId, item: ContentItem) {
        self.sites.entry(site).or_default().items.push(item);
    }

    /// Attach taxonomy terms to an item.
    pub fn set_taxonomies(&mut self, site: SiteId, id: ItemId, terms: TaxonomyTerms) {
        self.sites.entry(site).or_default().taxonomies.insert(id, terms);
    }

    /// Attach a featured image to an item.
    pub fn set_thumbnail(&mut self, site: SiteId, id: ItemId, thumbnail: Thumbnail) {
        self.sites.entry(site).or_default().thumbnails.insert(id, thumbnail);
    }

    /// Make every query against `site` fail.
    pub fn fail_site(&mut self, site: SiteId) {
        self.failing.insert(site);
    }

    fn terms_of(&self, site: SiteId, id: ItemId) -> Option<&TaxonomyTerms> {
        self.sites.get(&site).and_then(|content| content.taxonomies.get(&id))
    }

    fn run_query(&self, query: &SiteQuery) -> std::result::Result<Vec<ContentItem>, SearchError> {
        if self.failing.contains(&query.site) {
            return Err(SearchError::Source(format!("site {} is unavailable", query.site)));
        }
        let Some(content) = self.sites.get(&query.site) else {
            return Ok(Vec::new());
        };

        let search_words: Vec<String> = query
            .search
            .as_deref()
            .map(|term| words(&fold(term)).into_iter().map(str::to_owned).collect())
            .unwrap_or_default();

        let mut items: Vec<ContentItem> = content
            .items
            .iter()
            .filter(|item| query.content_types.contains(&item.content_type))
            .filter(|item| query.statuses.is_empty() || query.statuses.contains(&item.status))
            .filter(|item| meta_matches(item, &query.meta))
            .filter(|item| tax_matches(self.terms_of(query.site, item.id), &query.tax))
            .filter(|item| text_matches(item, &search_words))
            .cloned()
            .collect();

        sort_items(&mut items, query.order_by, query.order);
        Ok(items)
    }
}

impl ContentSource for MemoryStore {
    async fn query_scoped(&self, query: &SiteQuery) -> std::result::Result<Vec<ContentItem>, SearchError> {
        self.run_query(query)
    }

    async fn item(&self, site: SiteId, id: ItemId) -> std::result::Result<Option<ContentItem>, SearchError> {
        Ok(self
            .sites
            .get(&site)
            .and_then(|content| content.items.iter().find(|item| item.id == id).cloned()))
    }

    async fn taxonomy_terms(&self, site: SiteId, id: ItemId) -> std::result::Result<TaxonomyTerms, SearchError> {
        Ok(self.terms_of(site, id).cloned().unwrap_or_default())
    }

    async fn thumbnail(&self, site: SiteId, id: ItemId) -> std::result::Result<Option<Thumbnail>, SearchError> {
        Ok(self
            .sites
            .get(&site)
            .and_then(|content| content.thumbnails.get(&id).cloned()))
    }
}

fn combine(relation: Relation, mut outcomes: impl Iterator<Item = bool>) -> bool {
    match relation {
        Relation::And => outcomes.all(|ok| ok),
        Relation::Or => outcomes.any(|ok| ok),
    }
}

fn meta_matches(item: &ContentItem, query: &MetaQuery) -> bool {
    query.is_empty() || combine(query.relation, query.clauses.iter().map(|c| meta_clause_matches(item, c)))
}

fn meta_clause_matches(item: &ContentItem, clause: &MetaClause) -> bool {
    let stored = item.meta.get(&clause.key);
    let wanted = clause.value.as_deref().unwrap_or_default();
    match clause.compare {
        MetaCompare::Equals => stored.is_some_and(|v| v == wanted),
        // A missing key never satisfies an inequality.
        MetaCompare::NotEquals => stored.is_some_and(|v| v != wanted),
        MetaCompare::Exists => stored.is_some(),
        MetaCompare::NotExists => stored.is_none(),
    }
}

fn tax_matches(terms: Option<&TaxonomyTerms>, query: &TaxQuery) -> bool {
    query.is_empty() || combine(query.relation, query.clauses.iter().map(|c| tax_clause_matches(terms, c)))
}

fn tax_clause_matches(terms: Option<&TaxonomyTerms>, clause: &TaxClause) -> bool {
    let attached = terms
        .and_then(|t| t.get(&clause.taxonomy))
        .map(Vec::as_slice)
        .unwrap_or_default();
    let has = |wanted: &String| {
        attached.iter().any(|term| {
            wanted.parse::<u64>().is_ok_and(|id| id == term.id)
                || term.name.eq_ignore_ascii_case(wanted.trim())
        })
    };
    match clause.operator {
        TaxOperator::In => clause.terms.iter().any(has),
        TaxOperator::NotIn => !clause.terms.iter().any(has),
        TaxOperator::And => clause.terms.iter().all(has),
    }
}

/// Every search word must appear in the title, excerpt or body.
fn text_matches(item: &ContentItem, search_words: &[String]) -> bool {
    if search_words.is_empty() {
        return true;
    }
    let haystack = format!(
        "{} {} {}",
        fold(&item.title),
        fold(item.excerpt.as_deref().unwrap_or_default()),
        fold(&plain_text(&item.content)),
    );
    search_words.iter().all(|word| haystack.contains(word.as_str()))
}

fn sort_items(items: &mut [ContentItem], order_by: OrderBy, order: SortOrder) {
    let compare: fn(&ContentItem, &ContentItem) -> Ordering = match order_by {
        OrderBy::Date => |a, b| a.published_at.cmp(&b.published_at),
        OrderBy::Modified => |a, b| a.modified_at.cmp(&b.modified_at),
        OrderBy::Title => |a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        OrderBy::Relevance => return,
    };
    match order {
        SortOrder::Asc => items.sort_by(compare),
        SortOrder::Desc => items.sort_by(|a, b| compare(b, a)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use extrachill_search::TaxonomyTerm;

    fn item(id: ItemId, title: &str, content_type: &str, days_ago: i64) -> ContentItem {
        let at = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).single().expect("valid date")
            - Duration::days(days_ago);
        ContentItem {
            id,
            title: title.into(),
            content: String::new(),
            excerpt: None,
            published_at: at,
            modified_at: at,
            content_type: content_type.into(),
            status: "publish".into(),
            slug: String::new(),
            author_id: 1,
            parent_id: None,
            permalink: String::new(),
            meta: BTreeMap::new(),
        }
    }

    fn query(types: &[&str]) -> SiteQuery {
        SiteQuery {
            site: SiteId(1),
            content_types: types.iter().map(|t| (*t).to_owned()).collect(),
            statuses: vec!["publish".into()],
            meta: MetaQuery::default(),
            tax: TaxQuery::default(),
            order_by: OrderBy::Date,
            order: SortOrder::Desc,
            search: None,
        }
    }

    fn ids(items: &[ContentItem]) -> Vec<ItemId> {
        items.iter().map(|i| i.id).collect()
    }

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        let mut draft = item(3, "Draft show review", "post", 0);
        draft.status = "draft".into();
        let mut featured = item(1, "Jazz night", "post", 5);
        featured.meta.insert("featured".into(), "yes".into());
        let mut page = item(2, "About the jazz club", "page", 1);
        page.content = "<p>Open <em>nightly</em></p>".into();
        page.meta.insert("featured".into(), "no".into());
        store.insert(SiteId(1), featured);
        store.insert(SiteId(1), page);
        store.insert(SiteId(1), draft);
        store.set_taxonomies(
            SiteId(1),
            1,
            TaxonomyTerms::from([(
                "category".to_owned(),
                vec![TaxonomyTerm { id: 7, name: "Live".into() }, TaxonomyTerm { id: 8, name: "Jazz".into() }],
            )]),
        );
        store
    }

    #[test]
    fn scopes_by_type_and_status() {
        let store = store();
        assert_eq!(ids(&store.run_query(&query(&["post"])).expect("query")), vec![1]);
        assert_eq!(ids(&store.run_query(&query(&["post", "page"])).expect("query")), vec![2, 1]);
    }

    #[test]
    fn native_search_needs_every_word() {
        let store = store();
        let mut q = query(&["post", "page"]);
        q.search = Some("JAZZ club".into());
        assert_eq!(ids(&store.run_query(&q).expect("query")), vec![2]);

        q.search = Some("nightly".into());
        assert_eq!(ids(&store.run_query(&q).expect("query")), vec![2]);
    }

    #[test]
    fn meta_filters() {
        let store = store();
        let mut q = query(&["post", "page"]);
        q.meta.clauses = vec![MetaClause {
            key: "featured".into(),
            value: Some("yes".into()),
            compare: MetaCompare::Equals,
        }];
        assert_eq!(ids(&store.run_query(&q).expect("query")), vec![1]);

        q.meta.clauses[0].compare = MetaCompare::NotEquals;
        assert_eq!(ids(&store.run_query(&q).expect("query")), vec![2]);

        q.meta.clauses = vec![
            MetaClause { key: "missing".into(), value: None, compare: MetaCompare::Exists },
            MetaClause { key: "featured".into(), value: None, compare: MetaCompare::Exists },
        ];
        q.meta.relation = Relation::Or;
        assert_eq!(ids(&store.run_query(&q).expect("query")), vec![2, 1]);

        q.meta.relation = Relation::And;
        assert!(store.run_query(&q).expect("query").is_empty());
    }

    #[test]
    fn tax_filters_by_id_or_name() {
        let store = store();
        let mut q = query(&["post", "page"]);
        q.tax.clauses = vec![TaxClause {
            taxonomy: "category".into(),
            terms: vec!["live".into()],
            operator: TaxOperator::In,
        }];
        assert_eq!(ids(&store.run_query(&q).expect("query")), vec![1]);

        q.tax.clauses[0].terms = vec!["7".into(), "99".into()];
        q.tax.clauses[0].operator = TaxOperator::And;
        assert!(store.run_query(&q).expect("query").is_empty());

        q.tax.clauses[0].terms = vec!["7".into(), "jazz".into()];
        assert_eq!(ids(&store.run_query(&q).expect("query")), vec![1]);

        q.tax.clauses[0].operator = TaxOperator::NotIn;
        assert_eq!(ids(&store.run_query(&q).expect("query")), vec![2]);
    }

    #[test]
    fn orders_by_title_ascending() {
        let store = store();
        let mut q = query(&["post", "page"]);
        q.order_by = OrderBy::Title;
        q.order = SortOrder::Asc;
        assert_eq!(ids(&store.run_query(&q).expect("query")), vec![2, 1]);
    }

    #[test]
    fn unknown_site_is_empty_and_failing_site_errors() {
        let mut store = store();
        let mut q = query(&["post"]);
        q.site = SiteId(42);
        assert!(store.run_query(&q).expect("query").is_empty());

        store.fail_site(SiteId(1));
        assert!(store.run_query(&query(&["post"])).is_err());
    }

    #[tokio::test]
    async fn lookups_by_site_and_id() {
        let store = store();
        assert!(store.item(SiteId(1), 2).await.expect("item").is_some());
        assert!(store.item(SiteId(2), 2).await.expect("item").is_none());
        let terms = store.taxonomy_terms(SiteId(1), 1).await.expect("terms");
        assert_eq!(terms["category"].len(), 2);
        assert!(store.thumbnail(SiteId(1), 1).await.expect("thumb").is_none());
    }

    #[test]
    fn loads_json_document() {
        let json = r#"{
            "sites": {
                "4": {
                    "items": [{
                        "id": 12, "title": "Band page", "content_type": "artist_profile",
                        "published_at": "2025-01-01T00:00:00Z",
                        "modified_at": "2025-01-02T00:00:00Z"
                    }],
                    "thumbnails": { "12": { "id": 5, "url": "https://artist.extrachill.com/a.jpg" } }
                }
            }
        }"#;
        let store = MemoryStore::from_json(json).expect("parse");
        let mut q = query(&["artist_profile"]);
        q.site = SiteId(4);
        assert_eq!(ids(&store.run_query(&q).expect("query")), vec![12]);
        assert_eq!(store.sites[&SiteId(4)].thumbnails[&12].id, 5);
    }

    #[test]
    fn invalid_json_rejected() {
        assert!(MemoryStore::from_json("{ nope").is_err());
    }
}
