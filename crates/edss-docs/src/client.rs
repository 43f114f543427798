//! HTTP retrieval of documentation pages and archives
//!
//! No retries are attempted. Any non-2xx status or transport failure is
//! returned to the caller as a [`FetchError`].

use crate::error::FetchError;
use crate::DEFAULT_USER_AGENT;
use bytes::Bytes;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE,
    LAST_MODIFIED, USER_AGENT,
};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP options configured via the tool builder
#[derive(Debug, Clone, Default)]
pub struct DocsOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Total request timeout; `None` leaves the transport default in place
    pub timeout: Option<Duration>,
}

/// Response metadata returned by a HEAD request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub status_code: u16,
    pub content_type: Option<String>,
    pub size: Option<u64>,
    pub last_modified: Option<String>,
    pub filename: Option<String>,
}

/// Thin wrapper over a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct DocsClient {
    http: reqwest::Client,
}

impl DocsClient {
    /// Build a client from options
    pub fn new(options: &DocsOptions) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(FetchError::ClientBuildError)?;

        Ok(Self { http })
    }

    /// Fetch an HTML page as text
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        debug!(url = %url, "Fetching documentation page");
        let response = self.get(url).await?;
        response.text().await.map_err(FetchError::from_reqwest)
    }

    /// Fetch a ZIP archive as raw bytes
    pub async fn fetch_zip(&self, url: &str) -> Result<Bytes, FetchError> {
        debug!(url = %url, "Fetching documentation archive");
        let response = self.get(url).await?;
        response.bytes().await.map_err(FetchError::from_reqwest)
    }

    /// Issue a HEAD request and collect download metadata
    pub async fn head(&self, url: &str) -> Result<ResponseMetadata, FetchError> {
        let parsed = validate_url(url)?;
        debug!(url = %url, "Requesting archive metadata");

        let response = self
            .http
            .head(parsed)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let headers = response.headers();
        Ok(ResponseMetadata {
            status_code: status.as_u16(),
            content_type: header_string(headers, CONTENT_TYPE.as_str()),
            size: header_string(headers, CONTENT_LENGTH.as_str()).and_then(|s| s.parse().ok()),
            last_modified: header_string(headers, LAST_MODIFIED.as_str()),
            filename: extract_filename(headers, url),
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let parsed = validate_url(url)?;
        let response = self
            .http
            .get(parsed)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

fn validate_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl(format!(
            "{url}: unsupported scheme '{other}'"
        ))),
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Extract filename from Content-Disposition header or URL
fn extract_filename(headers: &HeaderMap, url: &str) -> Option<String> {
    if let Some(value) = headers.get(CONTENT_DISPOSITION).and_then(|v| v.to_str().ok()) {
        if let Some(filename) = parse_content_disposition_filename(value) {
            return Some(filename);
        }
    }

    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    if last.contains('.') {
        Some(last.to_string())
    } else {
        None
    }
}

/// Parse filename from Content-Disposition header value
fn parse_content_disposition_filename(value: &str) -> Option<String> {
    let start = value.find("filename=")? + "filename=".len();
    let rest = &value[start..];
    let filename = match rest.strip_prefix('"') {
        Some(quoted) => &quoted[..quoted.find('"')?],
        None => {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == ';')
                .unwrap_or(rest.len());
            &rest[..end]
        }
    };
    if filename.is_empty() {
        None
    } else {
        Some(filename.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_disposition_filename() {
        assert_eq!(
            parse_content_disposition_filename("attachment; filename=\"edss_api_v4.zip\""),
            Some("edss_api_v4.zip".to_string())
        );
        assert_eq!(
            parse_content_disposition_filename("attachment; filename=docs.zip; size=10"),
            Some("docs.zip".to_string())
        );
        assert_eq!(parse_content_disposition_filename("attachment"), None);
        assert_eq!(parse_content_disposition_filename("attachment; filename=\"\""), None);
    }

    #[test]
    fn test_extract_filename_from_url() {
        let headers = HeaderMap::new();
        assert_eq!(
            extract_filename(&headers, "https://docs.example/v4/get_doc.php?t=zip"),
            Some("get_doc.php".to_string())
        );
        assert_eq!(
            extract_filename(&headers, "https://docs.example/documentation/v4/"),
            None
        );
    }

    #[test]
    fn test_extract_filename_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"api.zip\""),
        );
        assert_eq!(
            extract_filename(&headers, "https://docs.example/v4/get_doc.php?t=zip"),
            Some("api.zip".to_string())
        );
    }

    #[test]
    fn test_validate_url_rejects_other_schemes() {
        assert!(validate_url("https://docs.example/").is_ok());
        assert!(matches!(
            validate_url("ftp://docs.example/"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_page_invalid_url() {
        let client = DocsClient::new(&DocsOptions::default()).unwrap();
        let result = client.fetch_page("ftp://docs.example/").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
