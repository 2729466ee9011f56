//! Site registry: which sites exist, and which site a selector names.
//!
//! The registry reads its [`SiteDirectory`] once, on first use, and keeps
//! the resulting index for the lifetime of the registry. The directory is
//! treated as immutable configuration; there is no partial invalidation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use url::Url;

use crate::types::{Site, SiteId};

/// Source of the network's site list.
pub trait SiteDirectory: Send + Sync {
    /// Whether the host runs a multisite network at all.
    fn is_multisite(&self) -> bool {
        true
    }

    /// Every active, public site.
    fn sites(&self) -> Vec<Site>;
}

/// A fixed site map, either the built-in network or one supplied by config.
#[derive(Debug, Clone)]
pub struct StaticSiteMap {
    multisite: bool,
    sites: Vec<Site>,
}

impl StaticSiteMap {
    /// A multisite map over `sites`.
    pub fn new(sites: Vec<Site>) -> Self {
        Self {
            multisite: true,
            sites,
        }
    }

    /// A directory for a host that is not running multisite.
    pub fn single_site() -> Self {
        Self {
            multisite: false,
            sites: Vec::new(),
        }
    }

    /// The built-in Extra Chill network.
    pub fn builtin() -> Self {
        Self::new(vec![
            Site::new(1, "Extra Chill", "extrachill.com"),
            Site::new(2, "Extra Chill Community", "community.extrachill.com"),
            Site::new(3, "Extra Chill Shop", "shop.extrachill.com"),
            Site::new(4, "Extra Chill Artist Platform", "artist.extrachill.com"),
            Site::new(5, "Extra Chill Chat", "chat.extrachill.com"),
            Site::new(6, "Extra Chill App Backend", "app.extrachill.com"),
            Site::new(7, "Extra Chill Events", "events.extrachill.com"),
            Site::new(8, "Extra Chill Stream", "stream.extrachill.com"),
            Site::new(9, "Extra Chill Newsletter", "newsletter.extrachill.com"),
        ])
    }
}

impl SiteDirectory for StaticSiteMap {
    fn is_multisite(&self) -> bool {
        self.multisite
    }

    fn sites(&self) -> Vec<Site> {
        self.sites.clone()
    }
}

/// Lookup tables built once from the directory.
#[derive(Debug, Default)]
struct SiteIndex {
    sites: Vec<Site>,
    by_domain: HashMap<String, SiteId>,
    positions: HashMap<SiteId, usize>,
}

impl SiteIndex {
    fn build(directory: &dyn SiteDirectory) -> Self {
        if !directory.is_multisite() {
            tracing::warn!("site directory reports no multisite network; registry is empty");
            return Self::default();
        }

        let mut index = Self::default();
        for mut site in directory.sites() {
            let Some(domain) = selector_host(&site.domain) else {
                tracing::warn!(site = %site.id, domain = %site.domain, "site has no usable domain; skipped");
                continue;
            };
            if index.positions.contains_key(&site.id) {
                tracing::warn!(site = %site.id, "duplicate site id in directory; skipped");
                continue;
            }
            if index.by_domain.contains_key(&domain) {
                tracing::warn!(site = %site.id, %domain, "duplicate site domain in directory; skipped");
                continue;
            }
            site.domain = domain.clone();
            index.by_domain.insert(domain, site.id);
            index.positions.insert(site.id, index.sites.len());
            index.sites.push(site);
        }
        tracing::debug!(count = index.sites.len(), "site registry loaded");
        index
    }
}

/// Resolves selectors to sites against a lazily loaded, cached directory.
pub struct SiteRegistry {
    directory: Box<dyn SiteDirectory>,
    index: OnceLock<SiteIndex>,
}

impl std::fmt::Debug for SiteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteRegistry")
            .field("loaded", &self.index.get().is_some())
            .finish()
    }
}

impl SiteRegistry {
    /// Create a registry over `directory`. Nothing is read until first use.
    pub fn new(directory: impl SiteDirectory + 'static) -> Self {
        Self {
            directory: Box::new(directory),
            index: OnceLock::new(),
        }
    }

    fn index(&self) -> &SiteIndex {
        self.index.get_or_init(|| SiteIndex::build(self.directory.as_ref()))
    }

    /// Every searchable site, in directory order. Empty when the host is
    /// not multisite.
    pub fn list_sites(&self) -> &[Site] {
        &self.index().sites
    }

    /// Ids of every searchable site, in directory order.
    pub fn all_ids(&self) -> Vec<SiteId> {
        self.list_sites().iter().map(|s| s.id).collect()
    }

    /// Look up one site by id.
    pub fn site(&self, id: SiteId) -> Option<&Site> {
        let index = self.index();
        index.positions.get(&id).map(|&pos| &index.sites[pos])
    }

    /// Map selectors to known site ids.
    ///
    /// Accepts bare domains, URLs with or without scheme and path, and
    /// numeric ids. Selectors that match nothing are dropped. The output is
    /// de-duplicated and keeps first-seen order.
    ///
    /// ```
    /// use extrachill_search::registry::{SiteRegistry, StaticSiteMap};
    /// use extrachill_search::SiteId;
    ///
    /// let registry = SiteRegistry::new(StaticSiteMap::builtin());
    /// let ids = registry.resolve(&["https://Shop.ExtraChill.com/cart", "3", "nowhere.example"]);
    /// assert_eq!(ids, vec![SiteId(3)]);
    /// ```
    pub fn resolve<S: AsRef<str>>(&self, selectors: &[S]) -> Vec<SiteId> {
        let index = self.index();
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for selector in selectors {
            let raw = selector.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            let found = if let Ok(numeric) = raw.parse::<u64>() {
                let id = SiteId(numeric);
                index.positions.contains_key(&id).then_some(id)
            } else {
                selector_host(raw).and_then(|host| index.by_domain.get(&host).copied())
            };
            match found {
                Some(id) if seen.insert(id) => resolved.push(id),
                Some(_) => {}
                None => tracing::trace!(selector = raw, "selector matched no site"),
            }
        }
        resolved
    }
}

/// Extract the lower-cased host from a domain or URL selector.
fn selector_host(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    let candidate = if lowered.contains("://") {
        lowered.clone()
    } else {
        format!("https://{lowered}")
    };

    let host = Url::parse(&candidate)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| {
            let without_scheme = lowered
                .strip_prefix("https://")
                .or_else(|| lowered.strip_prefix("http://"))
                .unwrap_or(&lowered);
            without_scheme
                .split('/')
                .next()
                .unwrap_or_default()
                .to_owned()
        });

    let host = host.trim_matches(|c| c == ' ' || c == '/');
    (!host.is_empty()).then(|| host.to_owned())
}

/// Global registry over the built-in network map.
static NETWORK_REGISTRY: OnceLock<Arc<SiteRegistry>> = OnceLock::new();

/// Access the process-wide registry for the built-in network.
///
/// Initialised lazily on first access and never reloaded.
pub fn network_registry() -> Arc<SiteRegistry> {
    Arc::clone(NETWORK_REGISTRY.get_or_init(|| Arc::new(SiteRegistry::new(StaticSiteMap::builtin()))))
}
