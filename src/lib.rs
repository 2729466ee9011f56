//! # extrachill
//!
//! Host integration for network-wide search on the Extra Chill multisite.
//!
//! Wires the [`extrachill_search`] pipeline to its surroundings: TOML
//! configuration, an in-memory content repository, the JSON request and
//! response surface, analytics events and tracing setup.
//!
//! ```no_run
//! # async fn example() -> extrachill::Result<()> {
//! use extrachill::{handle_request, HostConfig, MemoryStore, SearchRequest};
//!
//! let config = HostConfig::load(&HostConfig::default_config_path())?;
//! let store = MemoryStore::load(std::path::Path::new("content.json"))?;
//! let search = config.build_search(store)?;
//! let response = handle_request(&search, &SearchRequest::new("jazz festival")).await?;
//! println!("{} hits", response.hits().len());
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod request;
pub mod store;
pub mod telemetry;

pub use analytics::{AnalyticsEvent, AnalyticsRecorder};
pub use config::HostConfig;
pub use error::{HostError, Result};
pub use request::{handle_request, Pagination, SearchRequest, SearchResponse};
pub use store::MemoryStore;
pub use telemetry::init_tracing;
