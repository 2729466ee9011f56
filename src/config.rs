//! Host configuration, persisted as TOML.
//!
//! ```toml
//! multisite = true
//!
//! [search]
//! site_timeout_ms = 3000
//!
//! [[sites]]
//! id = 1
//! name = "Extra Chill"
//! domain = "extrachill.com"
//!
//! [content_types]
//! 1 = ["post", "page"]
//! ```
//!
//! An empty `sites` list keeps the built-in network map. Entries in
//! `content_types` replace the built-in types for that site id.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use extrachill_search::{
    ContentSource, ContentTypePolicy, FederatedSearch, SearchConfig, Site, SiteId, SiteRegistry,
    StaticSiteMap,
};
use serde::{Deserialize, Serialize};

use crate::error::{HostError, Result};

/// Everything the host needs to build a [`FederatedSearch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Whether the host runs a multisite network. When false every search
    /// returns an empty result.
    pub multisite: bool,
    /// Pipeline settings.
    pub search: SearchConfig,
    /// Replacement site map. Empty keeps the built-in network.
    pub sites: Vec<Site>,
    /// Per-site content types keyed by site id.
    pub content_types: BTreeMap<String, Vec<String>>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            multisite: true,
            search: SearchConfig::default(),
            sites: Vec::new(),
            content_types: BTreeMap::new(),
        }
    }
}

impl HostConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or fails
    /// [`HostConfig::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/extrachill/search.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("extrachill").join("search.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("extrachill")
                .join("search.toml")
        } else {
            PathBuf::from("/tmp/extrachill-config/search.toml")
        }
    }

    /// Validate pipeline settings and content-type keys.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Search`] for invalid pipeline settings and
    /// [`HostError::Config`] for a content-type key that is not a site id.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.content_type_overrides().map(|_| ())
    }

    fn content_type_overrides(&self) -> Result<Vec<(SiteId, Vec<String>)>> {
        self.content_types
            .iter()
            .map(|(key, types)| {
                key.trim()
                    .parse::<u64>()
                    .map(|id| (SiteId(id), types.clone()))
                    .map_err(|_| {
                        HostError::Config(format!("content_types key {key:?} is not a site id"))
                    })
            })
            .collect()
    }

    /// The registry this configuration describes.
    pub fn registry(&self) -> SiteRegistry {
        let directory = if !self.multisite {
            StaticSiteMap::single_site()
        } else if self.sites.is_empty() {
            StaticSiteMap::builtin()
        } else {
            StaticSiteMap::new(self.sites.clone())
        };
        SiteRegistry::new(directory)
    }

    /// The built-in content-type table with this configuration's overrides.
    ///
    /// # Errors
    ///
    /// Same as [`HostConfig::validate`] for content-type keys.
    pub fn policy(&self) -> Result<ContentTypePolicy> {
        Ok(self
            .content_type_overrides()?
            .into_iter()
            .fold(ContentTypePolicy::builtin(), |policy, (site, types)| {
                policy.with_site(site, types)
            }))
    }

    /// Build a search over `source` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build_search<S: ContentSource>(&self, source: S) -> Result<FederatedSearch<S>> {
        let policy = self.policy()?;
        let search = FederatedSearch::new(
            source,
            Arc::new(self.registry()),
            policy,
            self.search.clone(),
        )?;
        Ok(search)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_builtin_network() {
        let config = HostConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registry().list_sites().len(), 9);
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let config = HostConfig::from_toml_str(
            r#"
            [search]
            site_timeout_ms = 1500
            "#,
        )
        .expect("parse");
        assert!(config.multisite);
        assert_eq!(config.search.site_timeout_ms, 1500);
        assert_eq!(config.search.max_concurrent_sites, 8);
    }

    #[test]
    fn sites_replace_builtin_map() {
        let config = HostConfig::from_toml_str(
            r#"
            [[sites]]
            id = 10
            name = "Label"
            domain = "label.test"

            [[sites]]
            id = 11
            name = "Radio"
            domain = "radio.test"
            "#,
        )
        .expect("parse");
        let registry = config.registry();
        assert_eq!(registry.all_ids(), vec![SiteId(10), SiteId(11)]);
        assert_eq!(registry.resolve(&["radio.test"]), vec![SiteId(11)]);
    }

    #[test]
    fn multisite_off_yields_empty_registry() {
        let config = HostConfig::from_toml_str("multisite = false").expect("parse");
        assert!(config.registry().list_sites().is_empty());
    }

    #[test]
    fn content_type_overrides_apply() {
        let config = HostConfig::from_toml_str(
            r#"
            [content_types]
            3 = ["product"]
            "#,
        )
        .expect("parse");
        let policy = config.policy().expect("policy");
        assert_eq!(policy.allowed_content_types(SiteId(3)), vec!["product"]);
        assert_eq!(policy.allowed_content_types(SiteId(9)), vec!["newsletter"]);
    }

    #[test]
    fn non_numeric_content_type_key_rejected() {
        let result = HostConfig::from_toml_str(
            r#"
            [content_types]
            shop = ["product"]
            "#,
        );
        assert!(matches!(result, Err(HostError::Config(_))));
    }

    #[test]
    fn invalid_search_settings_rejected() {
        let result = HostConfig::from_toml_str(
            r#"
            [search]
            max_concurrent_sites = 0
            "#,
        );
        assert!(matches!(result, Err(HostError::Search(_))));
    }

    #[test]
    fn invalid_toml_rejected() {
        assert!(matches!(
            HostConfig::from_toml_str("[search"),
            Err(HostError::Toml(_))
        ));
    }

    #[test]
    fn load_nonexistent_returns_error() {
        let result = HostConfig::load(Path::new("/nonexistent/path/search.toml"));
        assert!(matches!(result, Err(HostError::Io(_))));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("search.toml");

        let mut config = HostConfig::default();
        config.search.site_timeout_ms = 750;
        config.search.weights.recency_days = 30.0;
        config.sites = vec![Site::new(1, "Main", "main.test")];
        config
            .content_types
            .insert("1".into(), vec!["post".into(), "event".into()]);

        config.save(&path).expect("save");
        let loaded = HostConfig::load(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn default_config_path_ends_with_file_name() {
        assert!(HostConfig::default_config_path().ends_with("extrachill/search.toml"));
    }
}
