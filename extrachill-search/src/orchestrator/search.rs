//! Core search orchestrator: resolve sites, fan out, fall back, score, rank.
//!
//! Queries every target site concurrently, falls back to word-level
//! matching when a term finds nothing, scores every record, orders the
//! merged set, and cuts out the requested window.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::events::{notify, SearchListener, SearchPerformed};
use crate::normalize::normalize_term;
use crate::policy::ContentTypePolicy;
use crate::query::{QueryHook, QuerySpec};
use crate::registry::{network_registry, SiteRegistry};
use crate::source::ContentSource;
use crate::types::{SearchResults, SiteId};

use super::dispatch::Dispatcher;
use super::fallback::fallback;
use super::merge::finalize;
use super::projection::project_all;
use super::scoring::score_records;

/// Federated search over every site a [`SiteRegistry`] knows about.
///
/// Holds only read-only configuration; one instance serves any number of
/// concurrent searches.
pub struct FederatedSearch<S> {
    registry: Arc<SiteRegistry>,
    dispatcher: Dispatcher<S>,
    config: Arc<SearchConfig>,
    clock: Arc<dyn Clock>,
    listeners: Vec<Arc<dyn SearchListener>>,
    query_hook: Option<Arc<dyn QueryHook>>,
}

impl<S: ContentSource> FederatedSearch<S> {
    /// Build a search over `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation.
    pub fn new(
        source: S,
        registry: Arc<SiteRegistry>,
        policy: ContentTypePolicy,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        let config = Arc::new(config);
        let dispatcher = Dispatcher::new(Arc::new(source), Arc::new(policy), Arc::clone(&config));
        Ok(Self {
            registry,
            dispatcher,
            config,
            clock: Arc::new(SystemClock),
            listeners: Vec::new(),
            query_hook: None,
        })
    }

    /// Build a search over the built-in network with default policy and
    /// configuration.
    ///
    /// # Errors
    ///
    /// Same as [`FederatedSearch::new`].
    pub fn for_network(source: S) -> Result<Self, SearchError> {
        Self::new(
            source,
            network_registry(),
            ContentTypePolicy::builtin(),
            SearchConfig::default(),
        )
    }

    /// Replace the clock used for recency scoring.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Register a listener for completed searches.
    pub fn with_listener(mut self, listener: Arc<dyn SearchListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Rewrite every incoming [`QuerySpec`] with `hook` before searching.
    pub fn with_query_hook(mut self, hook: impl QueryHook + 'static) -> Self {
        self.query_hook = Some(Arc::new(hook));
        self
    }

    /// The registry this search resolves sites against.
    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }

    /// Search for `term` on the sites named by `site_selectors`.
    ///
    /// `term` and `site_selectors` replace the query's own `term` and
    /// `target_sites`. See [`FederatedSearch::search`].
    pub async fn search_sites<T: AsRef<str>>(
        &self,
        term: &str,
        site_selectors: &[T],
        spec: &QuerySpec,
    ) -> SearchResults {
        let spec = QuerySpec {
            term: term.to_owned(),
            target_sites: site_selectors
                .iter()
                .map(|s| s.as_ref().to_owned())
                .collect(),
            ..spec.clone()
        };
        self.search(&spec).await
    }

    /// Run one federated search.
    ///
    /// # Pipeline
    ///
    /// 1. Apply the query hook, if any, and normalize the term
    /// 2. Resolve `spec.target_sites` (empty means every site)
    /// 3. Query every target site concurrently
    /// 4. If a non-empty term found nothing, run the word-level fallback
    /// 5. Score every record (skipped for an empty term)
    /// 6. Order the merged set, count it, cut out `[offset, offset + limit)`
    /// 7. Attach site provenance
    /// 8. Notify listeners
    ///
    /// Never fails: a missing network or unresolvable selectors produce an
    /// empty result, and failing sites are logged and left out.
    pub async fn search(&self, spec: &QuerySpec) -> SearchResults {
        let rewritten;
        let spec = match &self.query_hook {
            Some(hook) => {
                rewritten = hook.rewrite(spec.clone());
                &rewritten
            }
            None => spec,
        };
        let term = normalize_term(spec.term.trim());
        tracing::trace!(%term, "search requested");

        if self.registry.list_sites().is_empty() {
            let err = SearchError::Config("no multisite network available".into());
            tracing::warn!(error = %err, "search skipped");
            return SearchResults::empty();
        }

        let targets = if spec.target_sites.is_empty() {
            self.registry.all_ids()
        } else {
            self.registry.resolve(&spec.target_sites)
        };
        if targets.is_empty() {
            tracing::debug!(selectors = spec.target_sites.len(), "no site selectors resolved");
            return SearchResults::empty();
        }

        let mut report = self.dispatcher.dispatch(&targets, &term, spec).await;
        let mut failed_sites = std::mem::take(&mut report.failed_sites);

        if report.records.is_empty() && !term.is_empty() {
            let mut recovered = fallback(&self.dispatcher, &term, &targets, spec).await;
            tracing::debug!(count = recovered.records.len(), "fallback finished");
            failed_sites.append(&mut recovered.failed_sites);
            report = recovered;
        }
        failed_sites.sort_unstable();
        failed_sites.dedup();
        log_failures(&failed_sites, targets.len());

        let scored = score_records(report.records, &term, self.clock.now(), &self.config.weights);
        let page = finalize(scored, spec);
        let results = project_all(page.records, &self.registry);

        notify(
            &self.listeners,
            &SearchPerformed {
                term: spec.term.clone(),
                total: page.total,
                referer: spec.referer.clone(),
            },
        );

        SearchResults {
            results,
            total: page.total,
            failed_sites,
        }
    }
}

fn log_failures(failed: &[SiteId], queried: usize) {
    if failed.is_empty() {
        return;
    }
    let sites = failed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    tracing::info!(failed = failed.len(), queried, %sites, "search completed with failing sites");
}
