//! Tool builder and operations for EDSS docs

use crate::archive::extract_primary;
use crate::client::{DocsClient, DocsOptions};
use crate::compare::compare_payloads;
use crate::discovery::{LinkDiscovery, DEFAULT_CACHE_TTL};
use crate::error::{DocsError, FetchError};
use crate::extract::{extract_auth_info, extract_endpoints, extract_http_methods, extract_section};
use crate::reveal::{HtmlRevealer, StaticRevealer};
use crate::search::search;
use crate::types::{
    AnalyzeEndpointsRequest, ApiVersion, CompareVersionsRequest, ComparisonResult,
    DiscoverLinksRequest, DocumentPayload, DownloadInfo, DownloadInfoRequest, EndpointAnalysis,
    GetDocumentationRequest, LinkRegistry, SearchRequest, SearchResponse, VersionDescriptor,
    VersionSearchResult,
};
use crate::{DEFAULT_BASE_URL, TOOL_DESCRIPTION, TOOL_LLMTXT};
use futures::future::try_join_all;
use schemars::schema_for;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Names of the operations exposed to the dispatch layer
pub const TOOL_NAMES: &[&str] = &[
    "discover_links",
    "get_documentation",
    "search_documentation",
    "analyze_endpoints",
    "compare_versions",
    "get_download_info",
];

const LATEST: &str = "latest";
const TRUNK: &str = "trunk";
const ALL_VERSIONS: &str = "all";

/// Text result handed back across the tool boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn success(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    fn error(err: &DocsError) -> Self {
        Self {
            text: format!("Error: {}", err),
            is_error: true,
        }
    }
}

/// Builder for configuring the docs tool
#[derive(Clone)]
pub struct DocsToolBuilder {
    base_url: String,
    user_agent: Option<String>,
    cache_ttl: Duration,
    timeout: Option<Duration>,
    revealer: Arc<dyn HtmlRevealer>,
}

impl Default for DocsToolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocsToolBuilder {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            timeout: None,
            revealer: Arc::new(StaticRevealer::new()),
        }
    }

    /// Documentation host root holding the version index
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Lifetime of the discovered link registry
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Total request timeout (transport default when unset)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Backend used by enhanced retrieval
    pub fn revealer(mut self, revealer: impl HtmlRevealer + 'static) -> Self {
        self.revealer = Arc::new(revealer);
        self
    }

    /// Build the tool
    pub fn build(self) -> Result<DocsTool, DocsError> {
        let mut base_url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let options = DocsOptions {
            user_agent: self.user_agent,
            timeout: self.timeout,
        };
        let client = DocsClient::new(&options)?;

        Ok(DocsTool {
            discovery: LinkDiscovery::new(client.clone(), base_url, self.cache_ttl),
            client,
            revealer: self.revealer,
        })
    }
}

/// Configured documentation tool
pub struct DocsTool {
    client: DocsClient,
    discovery: LinkDiscovery,
    revealer: Arc<dyn HtmlRevealer>,
}

impl DocsTool {
    /// Create a new tool builder
    pub fn builder() -> DocsToolBuilder {
        DocsToolBuilder::new()
    }

    /// Get tool description
    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Input schema of a named operation
    pub fn input_schema(&self, name: &str) -> Option<serde_json::Value> {
        let schema = match name {
            "discover_links" => schema_for!(DiscoverLinksRequest),
            "get_documentation" => schema_for!(GetDocumentationRequest),
            "search_documentation" => schema_for!(SearchRequest),
            "analyze_endpoints" => schema_for!(AnalyzeEndpointsRequest),
            "compare_versions" => schema_for!(CompareVersionsRequest),
            "get_download_info" => schema_for!(DownloadInfoRequest),
            _ => return None,
        };
        serde_json::to_value(schema).ok()
    }

    /// Run a named operation and render its result as text
    ///
    /// Failures of any kind are returned as an error-flagged output.
    pub async fn call(&self, name: &str, arguments: serde_json::Value) -> ToolOutput {
        let result = match name {
            "discover_links" => self.run(arguments, |r| self.discover_links(r)).await,
            "get_documentation" => self.run(arguments, |r| self.get_documentation(r)).await,
            "search_documentation" => self.run(arguments, |r| self.search(r)).await,
            "analyze_endpoints" => self.run(arguments, |r| self.analyze_endpoints(r)).await,
            "compare_versions" => self.run(arguments, |r| self.compare_versions(r)).await,
            "get_download_info" => self.run(arguments, |r| self.download_info(r)).await,
            other => Err(DocsError::UnknownTool(other.to_string())),
        };

        match result {
            Ok(text) => ToolOutput::success(text),
            Err(e) => {
                warn!(tool = name, error = %e, "Tool call failed");
                ToolOutput::error(&e)
            }
        }
    }

    async fn run<Req, Resp, Fut>(
        &self,
        arguments: serde_json::Value,
        operation: impl FnOnce(Req) -> Fut,
    ) -> Result<String, DocsError>
    where
        Req: DeserializeOwned,
        Resp: Serialize,
        Fut: std::future::Future<Output = Result<Resp, DocsError>>,
    {
        let arguments = if arguments.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            arguments
        };
        let request: Req = serde_json::from_value(arguments)
            .map_err(|e| DocsError::InvalidArguments(e.to_string()))?;
        let response = operation(request).await?;
        serde_json::to_string_pretty(&response)
            .map_err(|e| DocsError::InvalidArguments(format!("unserializable result: {e}")))
    }

    /// Current link registry
    pub async fn discover_links(&self, req: DiscoverLinksRequest) -> Result<LinkRegistry, DocsError> {
        Ok(self.discovery.discover(req.force_refresh).await)
    }

    /// Fetch documentation for a version
    pub async fn get_documentation(
        &self,
        req: GetDocumentationRequest,
    ) -> Result<DocumentPayload, DocsError> {
        let release = req.version.as_deref().unwrap_or(LATEST);
        let (key, descriptor) = self
            .resolve(release, req.api_version.unwrap_or_default())
            .await?;

        let mut payload = self.load(key, &descriptor, req.enhanced).await?;
        if let Some(section) = req.section {
            payload.content = extract_section(&payload.content, &section)?;
            payload.length = payload.content.chars().count();
            payload.section = Some(section);
        }
        Ok(payload)
    }

    /// Search one version, or both latest and trunk for "all"
    pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse, DocsError> {
        if req.query.is_empty() {
            return Err(DocsError::MissingParameter("query"));
        }

        let api_version = req.api_version.unwrap_or_default();
        let release = req.version.as_deref().unwrap_or(LATEST);
        let releases: Vec<&str> = if release.eq_ignore_ascii_case(ALL_VERSIONS) {
            vec![LATEST, TRUNK]
        } else {
            vec![release]
        };

        let registry = self.discovery.discover(false).await;
        let mut targets = Vec::with_capacity(releases.len());
        for release in releases {
            let (key, descriptor) = registry.resolve(release, api_version)?;
            targets.push((key, descriptor.clone()));
        }

        let payloads = try_join_all(
            targets
                .iter()
                .map(|(key, descriptor)| self.load(key.clone(), descriptor, false)),
        )
        .await?;

        let mut results = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let matches = search(&payload.content, &req.query)?;
            results.push(VersionSearchResult {
                version: payload.version,
                url: payload.url,
                match_count: matches.len(),
                matches,
            });
        }

        Ok(SearchResponse {
            query: req.query,
            results,
        })
    }

    /// Extract endpoints, methods and auth signals for a version
    pub async fn analyze_endpoints(
        &self,
        req: AnalyzeEndpointsRequest,
    ) -> Result<EndpointAnalysis, DocsError> {
        let release = req.version.as_deref().unwrap_or(LATEST);
        let (key, descriptor) = self
            .resolve(release, req.api_version.unwrap_or_default())
            .await?;
        let payload = self.load(key, &descriptor, req.enhanced).await?;

        let endpoints = extract_endpoints(&payload.content, req.detailed);
        Ok(EndpointAnalysis {
            total_endpoints: endpoints.len(),
            http_methods: extract_http_methods(&payload.content),
            authentication: extract_auth_info(&payload.content),
            endpoints,
            version: payload.version,
            url: payload.url,
            mode: payload.mode,
        })
    }

    /// Compare latest against trunk
    pub async fn compare_versions(
        &self,
        req: CompareVersionsRequest,
    ) -> Result<ComparisonResult, DocsError> {
        let api_version = req.api_version.unwrap_or_default();
        let registry = self.discovery.discover(false).await;
        let (latest_key, latest) = registry.resolve(LATEST, api_version)?;
        let (trunk_key, trunk) = registry.resolve(TRUNK, api_version)?;

        let (latest, trunk) = tokio::try_join!(
            self.load(latest_key, latest, false),
            self.load(trunk_key, trunk, false),
        )?;

        Ok(compare_payloads(&latest.content, &trunk.content, &req.focus))
    }

    /// HEAD the ZIP download of a version
    pub async fn download_info(&self, req: DownloadInfoRequest) -> Result<DownloadInfo, DocsError> {
        let release = req.version.as_deref().unwrap_or(LATEST);
        let (key, descriptor) = self
            .resolve(release, req.api_version.unwrap_or_default())
            .await?;

        let metadata = self.client.head(&descriptor.zip_url).await?;
        Ok(DownloadInfo {
            version: key,
            url: descriptor.zip_url,
            status_code: metadata.status_code,
            content_type: metadata.content_type,
            size: metadata.size,
            last_modified: metadata.last_modified,
            filename: metadata.filename,
        })
    }

    async fn resolve(
        &self,
        release: &str,
        api_version: ApiVersion,
    ) -> Result<(String, VersionDescriptor), DocsError> {
        let registry = self.discovery.discover(false).await;
        let (key, descriptor) = registry.resolve(release, api_version)?;
        Ok((key, descriptor.clone()))
    }

    /// Fetch a version's content as a page, or from its archive when enhanced
    async fn load(
        &self,
        key: String,
        descriptor: &VersionDescriptor,
        enhanced: bool,
    ) -> Result<DocumentPayload, DocsError> {
        let (url, mode, content) = if enhanced {
            let bytes = self.client.fetch_zip(&descriptor.zip_url).await?;
            let extracted = extract_primary(&bytes)?;
            match extracted.script_library {
                Some(ref script) => {
                    debug!(revealer = self.revealer.name(), version = %key, "Revealing archive content");
                    let revealed = self.revealer.reveal(&extracted.html, script).await?;
                    (descriptor.zip_url.clone(), "enhanced", revealed)
                }
                None => {
                    debug!(version = %key, "No script library in archive, returning unprocessed HTML");
                    (descriptor.zip_url.clone(), "unprocessed", extracted.html)
                }
            }
        } else {
            let html = self.client.fetch_page(&descriptor.page_url).await?;
            (descriptor.page_url.clone(), "page", html)
        };

        Ok(DocumentPayload {
            version: key,
            url,
            mode: mode.to_string(),
            section: None,
            length: content.chars().count(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_tool() -> DocsTool {
        DocsTool::builder()
            .base_url("http://127.0.0.1:9/docs")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_normalizes_base_url() {
        let tool = offline_tool();
        assert_eq!(tool.discovery.base_url().as_str(), "http://127.0.0.1:9/docs/");
    }

    #[test]
    fn test_builder_rejects_invalid_base_url() {
        let result = DocsTool::builder().base_url("not a url").build();
        assert!(matches!(
            result,
            Err(DocsError::Fetch(FetchError::InvalidUrl(_)))
        ));
    }

    #[test]
    fn test_input_schemas() {
        let tool = offline_tool();
        for name in TOOL_NAMES {
            assert!(tool.input_schema(name).is_some(), "missing schema for {name}");
        }
        let search = tool.input_schema("search_documentation").unwrap();
        assert!(search["properties"]["query"].is_object());
        assert!(tool.input_schema("unknown").is_none());
    }

    #[test]
    fn test_tool_description() {
        let tool = offline_tool();
        assert!(!tool.description().is_empty());
        assert!(tool.llmtxt().contains("analyze_endpoints"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_text() {
        let output = offline_tool().call("delete_everything", serde_json::json!({})).await;
        assert!(output.is_error);
        assert_eq!(output.text, "Error: Unknown tool: delete_everything");
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_error_text() {
        let output = offline_tool()
            .call("search_documentation", serde_json::json!({ "query": 5 }))
            .await;
        assert!(output.is_error);
        assert!(output.text.starts_with("Error: Invalid arguments"));
    }
}
