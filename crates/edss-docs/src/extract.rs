//! Heuristic endpoint and schema extraction
//!
//! Patterns run over raw HTML text, not a DOM. Matches from all patterns
//! are pooled and de-duplicated as raw strings only, so a quoted
//! `/api/v4/volumes` and a `GET /api/v4/volumes` pair are both reported.

use crate::error::DocsError;
use crate::types::{AuthInfo, EndpointRecord, Parameter};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

/// Recognized HTTP methods
pub const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// Keywords signalling authentication documentation
pub const AUTH_KEYWORDS: &[&str] = &[
    "authentication",
    "authorization",
    "bearer",
    "token",
    "api key",
    "api_key",
    "basic auth",
    "oauth",
    "login",
    "password",
    "session",
];

/// Characters searched before an endpoint for its description
const DESCRIPTION_WINDOW: usize = 500;

/// Characters searched after an endpoint for parameters
const PARAMETER_WINDOW: usize = 1000;

static ENDPOINT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Quoted absolute API paths
        Regex::new(r#"["'](/api/v\d+/[^"'\s<>]*)["']"#).unwrap(),
        // endpoint: /path
        Regex::new(r#"(?i)endpoint:\s*["']?(/[^"'\s<>]+)"#).unwrap(),
        // url: "/api/..."
        Regex::new(r#"(?i)url:\s*["']([^"'\s<>]*/api/[^"'\s<>]*)["']"#).unwrap(),
        // METHOD /path
        Regex::new(&format!(r#"\b((?:{})\s+/[^\s"'<>]*)"#, method_alternation())).unwrap(),
    ]
});

static METHOD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b({})\b", method_alternation())).unwrap());

static METHOD_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^({})\s+(\S+)$", method_alternation())).unwrap());

static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p>").unwrap());

static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"\\]+)"\s*:\s*"([^"\\]*)""#).unwrap());

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h([1-6])([^>]*)>(.*?)</h[1-6]\s*>").unwrap());

static ID_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bid\s*=\s*["']([^"']*)["']"#).unwrap());

/// Extract endpoint records from HTML text
///
/// Output order is pattern order, then document order; the first
/// occurrence of each raw match string is kept.
pub fn extract_endpoints(html: &str, detailed: bool) -> Vec<EndpointRecord> {
    let mut seen = HashSet::new();
    let mut pooled: Vec<(&str, usize, usize)> = Vec::new();

    for pattern in ENDPOINT_PATTERNS.iter() {
        for caps in pattern.captures_iter(html) {
            let Some(m) = caps.get(1) else { continue };
            if seen.insert(m.as_str()) {
                pooled.push((m.as_str(), m.start(), m.end()));
            }
        }
    }

    pooled
        .into_iter()
        .map(|(raw, start, end)| {
            let (method, path) = split_method(raw);
            let (description, parameters) = if detailed {
                (describe(html, start), parameters_after(html, end))
            } else {
                (None, Vec::new())
            };
            EndpointRecord {
                method,
                path,
                description,
                parameters,
            }
        })
        .collect()
}

/// Uppercase HTTP method tokens anywhere in the text
pub fn extract_http_methods(html: &str) -> BTreeSet<String> {
    METHOD_TOKEN
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Case-insensitive search for authentication keywords
pub fn extract_auth_info(html: &str) -> AuthInfo {
    let lower = html.to_lowercase();
    let keywords: Vec<String> = AUTH_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(*keyword))
        .map(|keyword| keyword.to_string())
        .collect();

    AuthInfo {
        found: !keywords.is_empty(),
        keywords,
    }
}

/// Narrow a document to the section under a matching heading
///
/// The heading matches when its `id` equals `section` or its text contains
/// it, both case-insensitively. The section runs up to the next heading of
/// the same or a higher level.
pub fn extract_section(html: &str, section: &str) -> Result<String, DocsError> {
    let needle = section.trim().to_lowercase();
    if needle.is_empty() {
        return Err(DocsError::MissingParameter("section"));
    }

    let headings: Vec<_> = HEADING
        .captures_iter(html)
        .filter_map(|caps| {
            let level: u8 = caps[1].parse().ok()?;
            let whole = caps.get(0)?;
            Some((level, whole.start(), caps[2].to_string(), caps[3].to_string()))
        })
        .collect();

    let found = headings.iter().position(|(_, _, attrs, inner)| {
        let id_matches = ID_ATTR
            .captures(attrs)
            .is_some_and(|id| id[1].to_lowercase() == needle);
        id_matches || strip_tags(inner).to_lowercase().contains(&needle)
    });

    let Some(index) = found else {
        return Err(DocsError::SectionNotFound(section.to_string()));
    };

    let (level, start) = (headings[index].0, headings[index].1);
    let end = headings[index + 1..]
        .iter()
        .find(|(other, _, _, _)| *other <= level)
        .map_or(html.len(), |(_, pos, _, _)| *pos);

    Ok(html[start..end].to_string())
}

fn method_alternation() -> String {
    HTTP_METHODS.join("|")
}

fn split_method(raw: &str) -> (Option<String>, String) {
    match METHOD_PAIR.captures(raw) {
        Some(caps) => (Some(caps[1].to_string()), caps[2].to_string()),
        None => (None, raw.to_string()),
    }
}

/// Text of the last paragraph ending before `pos`, within the window
fn describe(html: &str, pos: usize) -> Option<String> {
    let window = &html[floor_char_boundary(html, pos.saturating_sub(DESCRIPTION_WINDOW))..pos];
    PARAGRAPH
        .captures_iter(window)
        .last()
        .map(|caps| strip_tags(&caps[1]))
        .filter(|text| !text.is_empty())
}

/// `"key": "value"` pairs following `pos`, within the window
fn parameters_after(html: &str, pos: usize) -> Vec<Parameter> {
    let window = &html[pos..floor_char_boundary(html, pos + PARAMETER_WINDOW)];
    let mut seen = HashSet::new();
    KEY_VALUE
        .captures_iter(window)
        .filter(|caps| seen.insert((caps[1].to_string(), caps[2].to_string())))
        .map(|caps| Parameter {
            name: caps[1].to_string(),
            param_type: caps[2].to_string(),
        })
        .collect()
}

fn strip_tags(html: &str) -> String {
    let text = TAG.replace_all(html, " ");
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Largest char boundary not above `index`
pub(crate) fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(method: Option<&str>, path: &str) -> EndpointRecord {
        EndpointRecord {
            method: method.map(str::to_string),
            path: path.to_string(),
            description: None,
            parameters: Vec::new(),
        }
    }

    #[test]
    fn test_method_pairs_in_prose() {
        let endpoints = extract_endpoints("GET /api/v4/volumes and POST /api/v4/pools", false);
        assert_eq!(
            endpoints,
            vec![
                record(Some("GET"), "/api/v4/volumes"),
                record(Some("POST"), "/api/v4/pools"),
            ]
        );
    }

    #[test]
    fn test_patterns_are_not_merged_across_shapes() {
        let html = r#"<a href="/api/v4/volumes">Volumes</a> <code>GET /api/v4/volumes</code>"#;
        let endpoints = extract_endpoints(html, false);
        assert_eq!(
            endpoints,
            vec![
                record(None, "/api/v4/volumes"),
                record(Some("GET"), "/api/v4/volumes"),
            ]
        );
    }

    #[test]
    fn test_labeled_patterns_pool_identical_strings() {
        let html = r#"
            Endpoint: /pools/{pool}/volumes
            $.ajax({ url: "/api/v4/pools/{pool}/snapshots", type: "GET" });
            endpoint: /pools/{pool}/volumes
        "#;
        let endpoints = extract_endpoints(html, false);
        let paths: Vec<_> = endpoints.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/api/v4/pools/{pool}/snapshots",
                "/pools/{pool}/volumes",
            ]
        );
        assert!(endpoints.iter().all(|e| e.method.is_none()));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let html = r#"<p>List</p><code>GET /api/v4/pools</code> "/api/v3/users" DELETE /api/v4/pools/{id}"#;
        let first = extract_endpoints(html, true);
        let second = extract_endpoints(html, true);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_detailed_description_and_parameters() {
        let html = r#"
            <h3>Create pool</h3>
            <p>Creates a new <b>storage</b> pool.</p>
            <pre>POST /api/v4/pools</pre>
            <pre>{"name": "string", "vdevs": "array", "name": "string"}</pre>
        "#;
        let endpoints = extract_endpoints(html, true);
        assert_eq!(endpoints.len(), 1);

        let pool = &endpoints[0];
        assert_eq!(pool.method.as_deref(), Some("POST"));
        assert_eq!(pool.description.as_deref(), Some("Creates a new storage pool."));
        assert_eq!(
            pool.parameters,
            vec![
                Parameter {
                    name: "name".to_string(),
                    param_type: "string".to_string()
                },
                Parameter {
                    name: "vdevs".to_string(),
                    param_type: "array".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_description_window_is_bounded() {
        let filler = "x".repeat(DESCRIPTION_WINDOW + 10);
        let html = format!("<p>Far away</p>{filler} GET /api/v4/pools");
        let endpoints = extract_endpoints(&html, true);
        assert_eq!(endpoints[0].description, None);
    }

    #[test]
    fn test_every_listed_method_is_recognized() {
        for verb in HTTP_METHODS {
            let html = format!("{verb} /api/v4/pools");
            let endpoints = extract_endpoints(&html, false);
            assert_eq!(endpoints, vec![record(Some(*verb), "/api/v4/pools")]);
            assert!(extract_http_methods(&html).contains(*verb));
        }
    }

    #[test]
    fn test_extract_http_methods() {
        let methods = extract_http_methods("GET a, POST b, get c, PATCHED, OPTIONS d, GET e");
        let expected: BTreeSet<String> = ["GET", "OPTIONS", "POST"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(methods, expected);
    }

    #[test]
    fn test_extract_auth_info() {
        let info = extract_auth_info("Use HTTP Basic Auth with your Password.");
        assert!(info.found);
        assert_eq!(info.keywords, vec!["basic auth", "password"]);

        let none = extract_auth_info("<p>Pools and volumes</p>");
        assert!(!none.found);
        assert!(none.keywords.is_empty());
    }

    #[test]
    fn test_extract_section_by_text_and_id() {
        let html = r#"<h1>API</h1><h2 id="pools">Storage Pools</h2><p>pools</p><h3>Create</h3><p>c</p><h2>Volumes</h2><p>v</p>"#;

        let section = extract_section(html, "storage pools").unwrap();
        assert_eq!(
            section,
            r#"<h2 id="pools">Storage Pools</h2><p>pools</p><h3>Create</h3><p>c</p>"#
        );

        let by_id = extract_section(html, "POOLS").unwrap();
        assert_eq!(by_id, section);

        let last = extract_section(html, "volumes").unwrap();
        assert_eq!(last, "<h2>Volumes</h2><p>v</p>");
    }

    #[test]
    fn test_extract_section_missing() {
        let err = extract_section("<h1>API</h1>", "Snapshots").unwrap_err();
        assert!(matches!(err, DocsError::SectionNotFound(_)));
        assert!(matches!(
            extract_section("<h1>API</h1>", "  "),
            Err(DocsError::MissingParameter("section"))
        ));
    }

    #[test]
    fn test_floor_char_boundary() {
        let s = "aé";
        assert_eq!(floor_char_boundary(s, 2), 1);
        assert_eq!(floor_char_boundary(s, 10), s.len());
        assert_eq!(floor_char_boundary(s, 0), 0);
    }
}
