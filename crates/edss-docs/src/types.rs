//! Core types for EDSS docs

use crate::error::DocsError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// API documentation generation published under a release
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// REST API v3
    V3,
    /// REST API v4
    #[default]
    V4,
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "v3" => Ok(ApiVersion::V3),
            "v4" => Ok(ApiVersion::V4),
            _ => Err("Invalid API version: must be v3 or v4".to_string()),
        }
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiVersion::V3 => write!(f, "v3"),
            ApiVersion::V4 => write!(f, "v4"),
        }
    }
}

/// Build the registry key for a release and API version
pub fn version_key(release: &str, api_version: ApiVersion) -> String {
    format!("{}_{}", release.to_lowercase(), api_version)
}

/// One documented release/API-version pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDescriptor {
    /// Release name as it appears in the link path
    pub release: String,
    /// API generation
    pub api_version: ApiVersion,
    /// HTML documentation page
    pub page_url: String,
    /// ZIP download of the same documentation
    pub zip_url: String,
    /// Anchor text of the discovered link
    pub link_text: String,
    /// False for entries of the built-in legacy table
    pub discovered: bool,
}

/// Where the registry entries came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrySource {
    /// Parsed from the documentation index page
    Discovered,
    /// Built-in fallback table
    Legacy,
}

/// Mapping of `<release>_<api>` keys to version descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRegistry {
    pub entries: BTreeMap<String, VersionDescriptor>,
    /// Unix seconds at population time
    pub discovered_at: u64,
    pub source: RegistrySource,
}

impl LinkRegistry {
    /// Look up a descriptor by exact key
    pub fn get(&self, key: &str) -> Option<&VersionDescriptor> {
        self.entries.get(key)
    }

    /// Number of entries, aliases included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Resolve a release name and API version to a descriptor
    pub fn resolve(
        &self,
        release: &str,
        api_version: ApiVersion,
    ) -> Result<(String, &VersionDescriptor), DocsError> {
        let key = version_key(release, api_version);
        match self.entries.get(&key) {
            Some(descriptor) => Ok((key, descriptor)),
            None => Err(DocsError::UnknownVersion {
                key,
                available: self.keys(),
            }),
        }
    }
}

/// Documentation content produced for one request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPayload {
    /// Registry key of the version
    pub version: String,
    /// URL the content was fetched from
    pub url: String,
    /// "page", "enhanced" or "unprocessed"
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub content: String,
    /// Character count of `content`
    pub length: usize,
}

/// Parameter name/type pair found near an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
}

/// An endpoint reported by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl EndpointRecord {
    /// Identity used when diffing endpoint sets
    pub fn signature(&self) -> (Option<&str>, &str) {
        (self.method.as_deref(), self.path.as_str())
    }
}

/// Authentication signals found in a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub found: bool,
    pub keywords: Vec<String>,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Byte offset of the match
    pub position: usize,
    /// 1-based line number
    pub line: usize,
    pub matched_text: String,
    pub context: String,
}

/// Size comparison of two payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeSummary {
    pub latest_size: usize,
    pub trunk_size: usize,
    /// `trunk_size - latest_size`
    pub size_difference: i64,
    /// Relative to `latest_size`; absent when latest is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_difference: Option<f64>,
    pub identical: bool,
}

/// Endpoints present in only one of the compared versions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointDiff {
    pub latest_count: usize,
    pub trunk_count: usize,
    pub only_in_latest: Vec<EndpointRecord>,
    pub only_in_trunk: Vec<EndpointRecord>,
}

/// Result of comparing `latest` against `trunk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub summary: SizeSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_diff: Option<EndpointDiff>,
}

/// Request for the discover_links operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DiscoverLinksRequest {
    /// Ignore the cached registry and re-scan the index page
    #[serde(default)]
    pub force_refresh: bool,
}

/// Request for the get_documentation operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetDocumentationRequest {
    /// Release name: "latest", "trunk" or a discovered release (default "latest")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// API version: v3 or v4 (default v4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<ApiVersion>,

    /// Return only the section under the matching heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Use the ZIP download and reveal client-rendered content
    #[serde(default)]
    pub enhanced: bool,
}

impl GetDocumentationRequest {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            ..Default::default()
        }
    }

    pub fn api_version(mut self, api_version: ApiVersion) -> Self {
        self.api_version = Some(api_version);
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn enhanced(mut self) -> Self {
        self.enhanced = true;
        self
    }
}

/// Request for the search operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    /// Literal text to look for (case-insensitive)
    pub query: String,

    /// Release to search, or "all" for both latest and trunk (default "latest")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// API version: v3 or v4 (default v4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<ApiVersion>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Request for the analyze_endpoints operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeEndpointsRequest {
    /// Release name (default "latest")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// API version: v3 or v4 (default v4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<ApiVersion>,

    /// Attach descriptions and parameters to each endpoint
    #[serde(default)]
    pub detailed: bool,

    /// Analyze the revealed ZIP content instead of the page
    #[serde(default)]
    pub enhanced: bool,
}

/// Request for the compare_versions operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CompareVersionsRequest {
    /// Aspects to compare; "endpoints" adds an endpoint diff
    #[serde(default)]
    pub focus: Vec<String>,

    /// API version: v3 or v4 (default v4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<ApiVersion>,
}

/// Request for the download_info operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DownloadInfoRequest {
    /// Release name (default "latest")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// API version: v3 or v4 (default v4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<ApiVersion>,
}

/// Search hits for one version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionSearchResult {
    pub version: String,
    pub url: String,
    pub match_count: usize,
    pub matches: Vec<SearchMatch>,
}

/// Response of the search operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<VersionSearchResult>,
}

/// Response of the analyze_endpoints operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointAnalysis {
    pub version: String,
    pub url: String,
    pub mode: String,
    pub total_endpoints: usize,
    pub endpoints: Vec<EndpointRecord>,
    pub http_methods: BTreeSet<String>,
    pub authentication: AuthInfo,
}

/// Metadata of a documentation ZIP download
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadInfo {
    pub version: String,
    pub url: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(release: &str) -> VersionDescriptor {
        VersionDescriptor {
            release: release.to_string(),
            api_version: ApiVersion::V4,
            page_url: format!("https://docs.example/docs/EDSS/{}/documentation/v4/", release),
            zip_url: format!(
                "https://docs.example/docs/EDSS/{}/documentation/v4/get_doc.php?t=zip",
                release
            ),
            link_text: release.to_string(),
            discovered: true,
        }
    }

    #[test]
    fn test_api_version_from_str() {
        assert_eq!(ApiVersion::from_str("v3").unwrap(), ApiVersion::V3);
        assert_eq!(ApiVersion::from_str("V4").unwrap(), ApiVersion::V4);
        assert!(ApiVersion::from_str("v5").is_err());
    }

    #[test]
    fn test_api_version_serde() {
        assert_eq!(serde_json::to_string(&ApiVersion::V3).unwrap(), "\"v3\"");
        let parsed: ApiVersion = serde_json::from_str("\"v4\"").unwrap();
        assert_eq!(parsed, ApiVersion::V4);
    }

    #[test]
    fn test_version_key_lowercases_release() {
        assert_eq!(version_key("Acme", ApiVersion::V4), "acme_v4");
        assert_eq!(version_key("trunk", ApiVersion::V3), "trunk_v3");
    }

    #[test]
    fn test_registry_resolve() {
        let mut entries = BTreeMap::new();
        entries.insert("acme_v4".to_string(), descriptor("Acme"));
        let registry = LinkRegistry {
            entries,
            discovered_at: 0,
            source: RegistrySource::Discovered,
        };

        let (key, found) = registry.resolve("ACME", ApiVersion::V4).unwrap();
        assert_eq!(key, "acme_v4");
        assert_eq!(found.release, "Acme");

        let err = registry.resolve("acme", ApiVersion::V3).unwrap_err();
        assert!(err.to_string().contains("acme_v3"));
        assert!(err.to_string().contains("acme_v4"));
    }

    #[test]
    fn test_endpoint_record_serialization() {
        let record = EndpointRecord {
            method: None,
            path: "/api/v4/pools".to_string(),
            description: None,
            parameters: Vec::new(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"path":"/api/v4/pools"}"#);

        let detailed = EndpointRecord {
            method: Some("GET".to_string()),
            parameters: vec![Parameter {
                name: "name".to_string(),
                param_type: "string".to_string(),
            }],
            ..record
        };
        let json = serde_json::to_string(&detailed).unwrap();
        assert!(json.contains(r#""method":"GET""#));
        assert!(json.contains(r#""type":"string""#));
    }

    #[test]
    fn test_request_defaults_from_empty_json() {
        let req: GetDocumentationRequest = serde_json::from_str("{}").unwrap();
        assert!(req.version.is_none());
        assert!(!req.enhanced);

        let req: CompareVersionsRequest = serde_json::from_str("{}").unwrap();
        assert!(req.focus.is_empty());
    }

    #[test]
    fn test_request_builder() {
        let req = GetDocumentationRequest::new("trunk")
            .api_version(ApiVersion::V3)
            .section("Pools")
            .enhanced();
        assert_eq!(req.version.as_deref(), Some("trunk"));
        assert_eq!(req.api_version, Some(ApiVersion::V3));
        assert_eq!(req.section.as_deref(), Some("Pools"));
        assert!(req.enhanced);
    }
}
