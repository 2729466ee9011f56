//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls per-site timeouts, fan-out width, reply
//! relabelling and the scoring weight table. It deserializes with every
//! field optional so hosts can override only what they need.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::orchestrator::scoring::ScoringWeights;

/// Configuration for the federated search pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// How long one site may take (query plus enrichment) before it is
    /// treated as having returned nothing.
    pub site_timeout_ms: u64,
    /// Maximum number of sites queried at the same time.
    pub max_concurrent_sites: usize,
    /// Content type whose items are relabelled under their parent thread.
    pub reply_content_type: String,
    /// Word count of the excerpt generated for items without one.
    pub excerpt_words: usize,
    /// Relevance weight table.
    pub weights: ScoringWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            site_timeout_ms: 5_000,
            max_concurrent_sites: 8,
            reply_content_type: "reply".to_owned(),
            excerpt_words: 30,
            weights: ScoringWeights::default(),
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `site_timeout_ms` must be greater than 0
    /// - `max_concurrent_sites` must be greater than 0
    /// - every weight must be finite and non-negative
    /// - `weights.recency_days` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.site_timeout_ms == 0 {
            return Err(SearchError::Config(
                "site_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.max_concurrent_sites == 0 {
            return Err(SearchError::Config(
                "max_concurrent_sites must be greater than 0".into(),
            ));
        }
        self.weights.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SearchConfig::default();
        assert_eq!(config.site_timeout_ms, 5_000);
        assert_eq!(config.max_concurrent_sites, 8);
        assert_eq!(config.reply_content_type, "reply");
        assert_eq!(config.excerpt_words, 30);
        assert_eq!(config.weights, ScoringWeights::default());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SearchConfig {
            site_timeout_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("site_timeout_ms"));
    }

    #[test]
    fn zero_concurrency_rejected() {
        let config = SearchConfig {
            max_concurrent_sites: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_concurrent_sites"));
    }

    #[test]
    fn bad_weights_rejected() {
        let config = SearchConfig {
            weights: ScoringWeights {
                content_max: -1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("content_max"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"site_timeout_ms": 250, "weights": {"exact_title_match": 2000}}"#)
                .expect("deserialize");
        assert_eq!(config.site_timeout_ms, 250);
        assert_eq!(config.max_concurrent_sites, 8);
        assert!((config.weights.exact_title_match - 2000.0).abs() < f64::EPSILON);
        assert!((config.weights.title_phrase_match - 500.0).abs() < f64::EPSILON);
    }
}
