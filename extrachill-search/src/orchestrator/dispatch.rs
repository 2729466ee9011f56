//! Federated dispatch: one isolated query per site, run concurrently.
//!
//! Each site runs in its own task under a shared concurrency bound and a
//! per-site timeout. A site that fails, panics or times out contributes
//! zero records; every other site is unaffected. The dispatcher waits for
//! every task to finish before returning, and returns records in site
//! order so the merge step sees a deterministic sequence.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::normalize::{normalize_term, plain_text, trim_words};
use crate::policy::ContentTypePolicy;
use crate::query::{QuerySpec, SiteQuery};
use crate::source::ContentSource;
use crate::types::{ContentItem, ContentRecord, SiteId, TaxonomyTerms};

use super::fallback::matches_all_words;

/// How items returned by a site are selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MatchMode {
    /// No term: every item passing the filters.
    All,
    /// The site's native search on the normalized term.
    Native(String),
    /// Full scan, keeping items that contain every word.
    WordSet(Vec<String>),
}

impl MatchMode {
    fn native_search(&self) -> Option<String> {
        match self {
            Self::Native(term) => Some(term.clone()),
            Self::All | Self::WordSet(_) => None,
        }
    }
}

type SiteOutcome = Result<Result<Vec<ContentRecord>, SearchError>, JoinError>;

/// Records gathered from every site, plus the sites that failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// Records in site order, then source order within a site.
    pub records: Vec<ContentRecord>,
    /// Sites whose query failed, panicked or timed out.
    pub failed_sites: Vec<SiteId>,
}

/// Runs site-scoped queries against a [`ContentSource`].
pub struct Dispatcher<S> {
    source: Arc<S>,
    policy: Arc<ContentTypePolicy>,
    config: Arc<SearchConfig>,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            policy: Arc::clone(&self.policy),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: ContentSource> Dispatcher<S> {
    pub fn new(source: Arc<S>, policy: Arc<ContentTypePolicy>, config: Arc<SearchConfig>) -> Self {
        Self {
            source,
            policy,
            config,
        }
    }

    /// Query every site in `sites` for `term` and collect their records.
    ///
    /// An empty term fetches every item passing the query's filters. The
    /// query's `limit` and `offset` are not applied here.
    pub async fn dispatch(&self, sites: &[SiteId], term: &str, spec: &QuerySpec) -> DispatchReport {
        let term = normalize_term(term.trim());
        let mode = if term.is_empty() {
            MatchMode::All
        } else {
            MatchMode::Native(term)
        };
        self.fan_out(sites, spec, mode).await
    }

    /// Run one task per site under the concurrency bound and join them all.
    pub(crate) async fn fan_out(&self, sites: &[SiteId], spec: &QuerySpec, mode: MatchMode) -> DispatchReport {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_sites));
        let spec = Arc::new(spec.clone());
        let mode = Arc::new(mode);

        let mut tasks = JoinSet::new();
        let mut positions = HashMap::with_capacity(sites.len());
        for (position, &site) in sites.iter().enumerate() {
            let this = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let spec = Arc::clone(&spec);
            let mode = Arc::clone(&mode);
            let handle = tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| SearchError::site_query(site, e))?;
                this.query_site_bounded(site, &spec, &mode).await
            });
            positions.insert(handle.id(), position);
        }

        // Dropping `tasks` aborts every site task still running.
        let mut outcomes: Vec<Option<SiteOutcome>> = sites.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, result)) => (id, Ok(result)),
                Err(err) => (err.id(), Err(err)),
            };
            if let Some(&position) = positions.get(&id) {
                outcomes[position] = Some(outcome);
            }
        }

        let mut report = DispatchReport::default();
        for (&site, outcome) in sites.iter().zip(outcomes) {
            match outcome {
                Some(Ok(Ok(records))) => {
                    tracing::debug!(%site, count = records.len(), "site returned records");
                    report.records.extend(records);
                }
                Some(Ok(Err(err))) => {
                    tracing::warn!(%site, error = %err, "site query failed");
                    report.failed_sites.push(site);
                }
                Some(Err(err)) => {
                    tracing::warn!(%site, error = %err, "site task aborted");
                    report.failed_sites.push(site);
                }
                None => {
                    tracing::warn!(%site, "site task never reported");
                    report.failed_sites.push(site);
                }
            }
        }
        report
    }

    async fn query_site_bounded(
        &self,
        site: SiteId,
        spec: &QuerySpec,
        mode: &MatchMode,
    ) -> Result<Vec<ContentRecord>, SearchError> {
        let timeout_ms = self.config.site_timeout_ms;
        tokio::time::timeout(Duration::from_millis(timeout_ms), self.query_site(site, spec, mode))
            .await
            .map_err(|_| SearchError::SiteTimeout { site, timeout_ms })?
    }

    /// Query one site and build its records.
    async fn query_site(
        &self,
        site: SiteId,
        spec: &QuerySpec,
        mode: &MatchMode,
    ) -> Result<Vec<ContentRecord>, SearchError> {
        let content_types = self.policy.allowed_content_types(site);
        if content_types.is_empty() {
            tracing::debug!(%site, "no searchable content types; site skipped");
            return Ok(Vec::new());
        }

        let query = SiteQuery {
            site,
            content_types,
            statuses: spec.statuses.clone(),
            meta: spec.meta.clone(),
            tax: spec.tax.clone(),
            order_by: spec.order_by,
            order: spec.order,
            search: mode.native_search(),
        };

        let items = self.source.query_scoped(&query).await.map_err(|err| match err {
            SearchError::SiteQuery { .. } | SearchError::SiteTimeout { .. } => err,
            other => SearchError::site_query(site, other),
        })?;

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            if let MatchMode::WordSet(words) = mode {
                if !matches_all_words(&item, words) {
                    continue;
                }
            }
            records.push(self.build_record(site, item).await);
        }
        Ok(records)
    }

    /// Enrich one item and tag it with its site.
    ///
    /// Metadata lookups that fail leave the field empty; they never drop
    /// the record.
    async fn build_record(&self, site: SiteId, item: ContentItem) -> ContentRecord {
        let (title, permalink) = self.reply_identity(site, &item).await;

        let taxonomies = self
            .source
            .taxonomy_terms(site, item.id)
            .await
            .unwrap_or_else(|err| {
                tracing::debug!(%site, item = item.id, error = %err, "taxonomy lookup failed");
                TaxonomyTerms::new()
            });

        let thumbnail = self.source.thumbnail(site, item.id).await.unwrap_or_else(|err| {
            tracing::debug!(%site, item = item.id, error = %err, "thumbnail lookup failed");
            None
        });

        let excerpt = match item.excerpt {
            Some(excerpt) if !excerpt.trim().is_empty() => excerpt,
            _ => trim_words(&plain_text(&item.content), self.config.excerpt_words),
        };

        ContentRecord {
            id: item.id,
            title,
            content: item.content,
            excerpt,
            published_at: item.published_at,
            modified_at: item.modified_at,
            content_type: item.content_type,
            slug: item.slug,
            author_id: item.author_id,
            site_id: site,
            permalink,
            taxonomies,
            thumbnail,
        }
    }

    /// Title and permalink under which `item` is listed.
    ///
    /// Replies with a parent surface as `Re: <parent title>` linking to the
    /// parent's permalink anchored at the reply.
    async fn reply_identity(&self, site: SiteId, item: &ContentItem) -> (String, String) {
        let own = (item.title.clone(), item.permalink.clone());
        if item.content_type != self.config.reply_content_type {
            return own;
        }
        let Some(parent_id) = item.parent_id.filter(|&id| id != 0) else {
            return own;
        };

        match self.source.item(site, parent_id).await {
            Ok(Some(parent)) => relabel_reply(item, &parent).unwrap_or(own),
            Ok(None) => own,
            Err(err) => {
                tracing::debug!(%site, item = item.id, parent = parent_id, error = %err, "parent lookup failed");
                own
            }
        }
    }
}

/// Title and permalink of `reply` listed under `parent`, or `None` when the
/// parent has no title.
pub fn relabel_reply(reply: &ContentItem, parent: &ContentItem) -> Option<(String, String)> {
    if parent.title.is_empty() {
        return None;
    }
    Some((
        format!("Re: {}", parent.title),
        format!("{}#post-{}", parent.permalink, reply.id),
    ))
}
