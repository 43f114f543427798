//! In-memory reading of documentation ZIP archives

use crate::error::DocsError;
use std::io::{Cursor, Read};
use tracing::{debug, error};
use zip::ZipArchive;

/// Substring identifying the bundled client script library
pub const SCRIPT_MARKER: &str = "jquery";

const HTML_EXTENSION: &str = ".html";
const SCRIPT_EXTENSION: &str = ".js";

/// Primary document and optional script library from an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocs {
    /// Archive entry name of the HTML document
    pub html_entry: String,
    pub html: String,
    /// Archive entry name of the script library
    pub script_entry: Option<String>,
    pub script_library: Option<String>,
}

/// Extract the first HTML entry and the first marked script entry
///
/// Entries are visited in archive order. Non-UTF-8 bytes are replaced
/// rather than rejected.
pub fn extract_primary(zip_bytes: &[u8]) -> Result<ExtractedDocs, DocsError> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))
        .map_err(|e| DocsError::Extraction(format!("invalid ZIP archive: {e}")))?;

    let mut html: Option<(String, String)> = None;
    let mut script: Option<(String, String)> = None;

    for index in 0..archive.len() {
        if html.is_some() && script.is_some() {
            break;
        }

        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                error!(index, error = %e, "Unreadable archive entry");
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let lower = name.to_lowercase();
        let wants_html = html.is_none() && lower.ends_with(HTML_EXTENSION);
        let wants_script =
            script.is_none() && lower.contains(SCRIPT_MARKER) && lower.ends_with(SCRIPT_EXTENSION);
        if !wants_html && !wants_script {
            continue;
        }

        let mut bytes = Vec::new();
        if let Err(e) = entry.read_to_end(&mut bytes) {
            error!(entry = %name, error = %e, "Failed to read archive entry");
            continue;
        }
        let text = String::from_utf8_lossy(&bytes).into_owned();

        if wants_html {
            debug!(entry = %name, size = bytes.len(), "Found primary HTML document");
            html = Some((name, text));
        } else {
            debug!(entry = %name, size = bytes.len(), "Found script library");
            script = Some((name, text));
        }
    }

    let (html_entry, html) =
        html.ok_or_else(|| DocsError::Extraction("no HTML file found in archive".to_string()))?;
    let (script_entry, script_library) = script.unzip();

    Ok(ExtractedDocs {
        html_entry,
        html,
        script_entry,
        script_library,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Build an in-memory archive from (name, content) pairs; names ending
    /// in `/` become directories.
    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            if name.ends_with('/') {
                writer.add_directory(name.to_string(), options).unwrap();
            } else {
                writer.start_file(name.to_string(), options).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_html_and_script_unmodified() {
        let html = "<html><body><h1>EDSS REST API</h1></body></html>";
        let script = "/*! jQuery */ (function(){ window.$ = {}; })();";
        let zip = build_zip(&[
            ("docs/", ""),
            ("docs/index.html", html),
            ("docs/js/jquery-3.6.0.min.js", script),
        ]);

        let extracted = extract_primary(&zip).unwrap();
        assert_eq!(extracted.html_entry, "docs/index.html");
        assert_eq!(extracted.html, html);
        assert_eq!(
            extracted.script_entry.as_deref(),
            Some("docs/js/jquery-3.6.0.min.js")
        );
        assert_eq!(extracted.script_library.as_deref(), Some(script));
    }

    #[test]
    fn test_first_html_entry_wins() {
        let zip = build_zip(&[
            ("appendix.html", "<p>appendix</p>"),
            ("index.html", "<p>index</p>"),
        ]);
        let extracted = extract_primary(&zip).unwrap();
        assert_eq!(extracted.html_entry, "appendix.html");
        assert_eq!(extracted.html, "<p>appendix</p>");
    }

    #[test]
    fn test_missing_script_is_not_an_error() {
        let zip = build_zip(&[("index.html", "<p>x</p>"), ("app.js", "var a;")]);
        let extracted = extract_primary(&zip).unwrap();
        assert!(extracted.script_library.is_none());
        assert!(extracted.script_entry.is_none());
    }

    #[test]
    fn test_no_html_entry_fails() {
        let zip = build_zip(&[("readme.txt", "hello"), ("jquery.js", "x")]);
        let err = extract_primary(&zip).unwrap_err();
        assert!(matches!(err, DocsError::Extraction(_)));
        assert!(err.to_string().contains("no HTML file"));
    }

    #[test]
    fn test_invalid_archive_fails() {
        let err = extract_primary(b"<html>not a zip</html>").unwrap_err();
        assert!(err.to_string().contains("invalid ZIP archive"));
    }
}
