//! Per-site content-type allow-lists.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::types::SiteId;

/// Content types searched on sites with no explicit entry.
pub const DEFAULT_CONTENT_TYPES: &[&str] = &["post", "page"];

/// Last-word override of a site's allowed content types.
///
/// Receives the types the policy table resolved for `site` and returns the
/// set actually searched. Returning an empty list excludes the site.
pub trait ContentTypeHook: Send + Sync {
    fn filter(&self, types: Vec<String>, site: SiteId) -> Vec<String>;
}

impl<F> ContentTypeHook for F
where
    F: Fn(Vec<String>, SiteId) -> Vec<String> + Send + Sync,
{
    fn filter(&self, types: Vec<String>, site: SiteId) -> Vec<String> {
        self(types, site)
    }
}

/// Which content types may be searched on each site.
#[derive(Clone, Default)]
pub struct ContentTypePolicy {
    table: BTreeMap<SiteId, Vec<String>>,
    hook: Option<Arc<dyn ContentTypeHook>>,
}

impl std::fmt::Debug for ContentTypePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentTypePolicy")
            .field("table", &self.table)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl ContentTypePolicy {
    /// A policy from an explicit table. Sites missing from the table fall
    /// back to [`DEFAULT_CONTENT_TYPES`].
    pub fn new(table: BTreeMap<SiteId, Vec<String>>) -> Self {
        Self { table, hook: None }
    }

    /// The built-in table for the Extra Chill network.
    pub fn builtin() -> Self {
        let entries: [(u64, &[&str]); 9] = [
            (1, &["post", "page", "festival_wire", "newsletter"]),
            (2, &["topic", "reply", "forum"]),
            (3, &["product", "page"]),
            (4, &["artist_profile", "topic", "reply"]),
            (5, &["page"]),
            (6, &["page"]),
            (7, &["dm_events", "page"]),
            (8, &["page"]),
            (9, &["newsletter"]),
        ];
        let table = entries
            .iter()
            .map(|(id, types)| {
                (
                    SiteId(*id),
                    types.iter().map(|t| (*t).to_owned()).collect(),
                )
            })
            .collect();
        Self::new(table)
    }

    /// Replace (or add) the entry for one site.
    pub fn with_site(mut self, site: SiteId, types: Vec<String>) -> Self {
        self.table.insert(site, types);
        self
    }

    /// Install the override hook, replacing any previous one.
    pub fn with_hook(mut self, hook: impl ContentTypeHook + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Allowed content types for `site`, de-duplicated in first-seen order.
    pub fn allowed_content_types(&self, site: SiteId) -> Vec<String> {
        let base = self.table.get(&site).cloned().unwrap_or_else(|| {
            DEFAULT_CONTENT_TYPES
                .iter()
                .map(|t| (*t).to_owned())
                .collect()
        });
        let types = match &self.hook {
            Some(hook) => hook.filter(base, site),
            None => base,
        };

        let mut deduped: Vec<String> = Vec::with_capacity(types.len());
        for t in types {
            let t = t.trim();
            if !t.is_empty() && !deduped.iter().any(|d| d == t) {
                deduped.push(t.to_owned());
            }
        }
        deduped
    }
}
