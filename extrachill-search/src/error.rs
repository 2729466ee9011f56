//! Error types for the extrachill-search crate.
//!
//! Messages are stable lower-case strings. Per-site errors carry the site
//! id so that log lines can be traced back to the failing repository.

use crate::types::SiteId;

/// Errors that can occur inside the federated search pipeline.
///
/// Only [`SearchError::Config`] ever escapes the crate (from construction).
/// The per-site variants are produced at the site boundary, logged, and
/// turned into "zero records for that site".
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Invalid search configuration, or no multisite network available.
    #[error("config error: {0}")]
    Config(String),

    /// A single site's query failed.
    #[error("site query failed on site {site}: {reason}")]
    SiteQuery {
        /// The site whose query failed.
        site: SiteId,
        /// Human-readable failure description.
        reason: String,
    },

    /// A single site did not answer within the per-site timeout.
    #[error("site {site} timed out after {timeout_ms}ms")]
    SiteTimeout {
        /// The site that timed out.
        site: SiteId,
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// A content source reported an error of its own.
    #[error("content source error: {0}")]
    Source(String),

    /// A caller-facing entry surface was missing a required field.
    #[error("missing required input: {0}")]
    MissingInput(String),
}

impl SearchError {
    /// Build a [`SearchError::SiteQuery`] from anything displayable.
    pub fn site_query(site: SiteId, reason: impl std::fmt::Display) -> Self {
        Self::SiteQuery {
            site,
            reason: reason.to_string(),
        }
    }
}

/// Convenience type alias for extrachill-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config() {
        let err = SearchError::Config("site_timeout_ms must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "config error: site_timeout_ms must be greater than 0"
        );
    }

    #[test]
    fn display_site_query() {
        let err = SearchError::site_query(SiteId(3), "connection refused");
        assert_eq!(
            err.to_string(),
            "site query failed on site 3: connection refused"
        );
    }

    #[test]
    fn display_site_timeout() {
        let err = SearchError::SiteTimeout {
            site: SiteId(7),
            timeout_ms: 250,
        };
        assert_eq!(err.to_string(), "site 7 timed out after 250ms");
    }

    #[test]
    fn display_source() {
        let err = SearchError::Source("table missing".into());
        assert_eq!(err.to_string(), "content source error: table missing");
    }

    #[test]
    fn display_missing_input() {
        let err = SearchError::MissingInput("search_term".into());
        assert_eq!(err.to_string(), "missing required input: search_term");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
