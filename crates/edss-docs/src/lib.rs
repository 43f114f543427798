//! EDSS docs - AI-friendly access to EDSS REST API documentation
//!
//! This crate discovers the published documentation versions, retrieves
//! pages or ZIP downloads, optionally reveals client-rendered content, and
//! extracts endpoints, HTTP methods and authentication hints with
//! pattern-based heuristics.
//!
//! ## Pipeline
//!
//! - [`LinkDiscovery`] - version registry from the index page, TTL cached
//! - [`DocsClient`] - page, archive and HEAD retrieval
//! - [`extract_primary`] - primary HTML and script library from a ZIP
//! - [`HtmlRevealer`] - expands hidden content ([`StaticRevealer`],
//!   [`PassthroughRevealer`], `ChromiumRevealer` with the `browser` feature)
//! - [`extract_endpoints`], [`search`], [`compare_payloads`] - analysis
//!
//! [`DocsTool`] composes these into the operations exposed to an assistant,
//! and [`DocsTool::call`] renders any outcome, including failures, as text.

pub mod archive;
pub mod client;
pub mod compare;
pub mod discovery;
mod error;
pub mod extract;
pub mod reveal;
pub mod search;
mod tool;
mod types;

pub use archive::{extract_primary, ExtractedDocs};
pub use client::{DocsClient, DocsOptions, ResponseMetadata};
pub use compare::compare_payloads;
pub use discovery::{legacy_registry, parse_index, LinkCache, LinkDiscovery};
pub use error::{DocsError, FetchError};
pub use extract::{extract_auth_info, extract_endpoints, extract_http_methods, extract_section};
#[cfg(feature = "browser")]
pub use reveal::ChromiumRevealer;
pub use reveal::{HtmlRevealer, PassthroughRevealer, StaticRevealer};
pub use search::search;
pub use tool::{DocsTool, DocsToolBuilder, ToolOutput, TOOL_NAMES};
pub use types::{
    version_key, AnalyzeEndpointsRequest, ApiVersion, AuthInfo, CompareVersionsRequest,
    ComparisonResult, DiscoverLinksRequest, DocumentPayload, DownloadInfo, DownloadInfoRequest,
    EndpointAnalysis, EndpointDiff, EndpointRecord, GetDocumentationRequest, LinkRegistry,
    Parameter, RegistrySource, SearchMatch, SearchRequest, SearchResponse, SizeSummary,
    VersionDescriptor, VersionSearchResult,
};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Everruns EDSS-Docs/1.0";

/// Default documentation host root
pub const DEFAULT_BASE_URL: &str = "https://edss-docs.example.com/";

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Fetches, searches and analyzes EDSS REST API documentation.

- Discovers published documentation versions (releases, API v3/v4)
- Retrieves pages or ZIP downloads, optionally revealing hidden content
- Extracts endpoints, HTTP methods and authentication hints
- Compares latest against trunk"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# EDSS Docs Tools

Access to the EDSS REST API documentation site.

## Operations
- `discover_links`: list documentation versions (`force_refresh` bypasses the 10 minute cache)
- `get_documentation`: fetch a version; `section` narrows to a heading, `enhanced` uses the ZIP download and reveals collapsed content
- `search_documentation`: case-insensitive literal search (max 50 matches); `version: "all"` searches latest and trunk
- `analyze_endpoints`: endpoints, HTTP methods and authentication keywords; `detailed` adds descriptions and parameters
- `compare_versions`: size difference of latest vs trunk; `focus: ["endpoints"]` adds an endpoint diff
- `get_download_info`: size, type and modification date of the ZIP download

## Versions
- `version`: "latest" (default), "trunk", or a discovered release name
- `api_version`: "v3" or "v4" (default)

## Examples

### Fetch the pools section of the latest v4 docs
```json
{"version": "latest", "api_version": "v4", "section": "Pools"}
```

### Search every version
```json
{"query": "snapshot", "version": "all"}
```

### Detailed endpoint analysis of trunk
```json
{"version": "trunk", "detailed": true}
```

## Error Handling
- Unknown versions list the available keys
- Network and archive failures are returned as text prefixed with "Error:"
- Endpoint extraction is heuristic and may be incomplete
"#;
