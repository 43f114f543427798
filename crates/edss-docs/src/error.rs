//! Error types for EDSS docs

use thiserror::Error;

/// Errors that can occur while retrieving documentation over HTTP
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed or resolved
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Server answered outside the 2xx range
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::ConnectError(err)
        } else {
            FetchError::RequestError(err.to_string())
        }
    }
}

/// Errors surfaced by documentation operations
#[derive(Debug, Error)]
pub enum DocsError {
    /// Page or archive could not be retrieved
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Archive is unreadable or holds no HTML document
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Reveal backend is unavailable
    #[error("Processing failed: {0}")]
    Processing(String),

    /// Requested version key is not in the registry
    #[error("Unknown version '{key}'. Available: {}", available.join(", "))]
    UnknownVersion { key: String, available: Vec<String> },

    /// Section heading not present in the document
    #[error("Section not found: {0}")]
    SectionNotFound(String),

    /// Required argument is absent or empty
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Tool arguments did not match the request schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool name is not one of the exposed operations
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FetchError::HttpStatus {
                url: "https://docs.example/".to_string(),
                status: 503
            }
            .to_string(),
            "HTTP 503 fetching https://docs.example/"
        );
        assert_eq!(FetchError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            DocsError::Extraction("no HTML file in archive".to_string()).to_string(),
            "Extraction failed: no HTML file in archive"
        );
        assert_eq!(
            DocsError::MissingParameter("query").to_string(),
            "Missing required parameter: query"
        );
        assert_eq!(
            DocsError::UnknownTool("nope".to_string()).to_string(),
            "Unknown tool: nope"
        );
    }

    #[test]
    fn test_unknown_version_lists_keys() {
        let err = DocsError::UnknownVersion {
            key: "acme_v3".to_string(),
            available: vec!["latest_v4".to_string(), "trunk_v4".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown version 'acme_v3'. Available: latest_v4, trunk_v4"
        );
    }

    #[test]
    fn test_fetch_error_is_transparent() {
        let err: DocsError = FetchError::Timeout.into();
        assert_eq!(err.to_string(), "Request timed out");
    }
}
