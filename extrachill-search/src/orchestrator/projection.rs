//! Shapes scored records into output hits with site provenance.

use crate::registry::SiteRegistry;
use crate::types::{ScoredRecord, SearchHit};

/// Attach the originating site's name and domain to a record.
///
/// A record whose site is no longer in the registry keeps empty provenance
/// fields rather than being dropped.
pub fn project(scored: ScoredRecord, registry: &SiteRegistry) -> SearchHit {
    let (site_name, site_domain) = registry
        .site(scored.record.site_id)
        .map(|site| (site.name.clone(), site.domain.clone()))
        .unwrap_or_default();

    SearchHit {
        record: scored.record,
        site_name,
        site_domain,
        score: scored.score,
    }
}

/// Project every record, keeping order.
pub fn project_all(records: Vec<ScoredRecord>, registry: &SiteRegistry) -> Vec<SearchHit> {
    records
        .into_iter()
        .map(|record| project(record, registry))
        .collect()
}
