//! Error types for the search host.

use extrachill_search::SearchError;

/// Top-level error type for host integration.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Request validation error.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Error from the search pipeline.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON parse or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_errors_pass_through_unchanged() {
        let err: HostError = SearchError::MissingInput("search_term".into()).into();
        assert_eq!(err.to_string(), "missing required input: search_term");
    }

    #[test]
    fn io_error_converts() {
        let err: HostError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn toml_error_converts() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("= nope");
        let err: HostError = parsed.expect_err("invalid toml").into();
        assert!(err.to_string().starts_with("TOML error"));
    }
}
