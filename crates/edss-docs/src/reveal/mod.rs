//! Revealing client-rendered documentation content
//!
//! Extracted documentation hides much of its content behind toggles and
//! `display: none` wrappers that the bundled script library opens in a
//! browser. An [`HtmlRevealer`] turns such a document into a fully
//! expanded HTML string. Backends are swappable: a headless browser where
//! scripting is available, a style-only rewrite where it is not.

#[cfg(feature = "browser")]
mod chromium;
mod static_style;

#[cfg(feature = "browser")]
pub use chromium::ChromiumRevealer;
pub use static_style::StaticRevealer;

use crate::error::DocsError;
use async_trait::async_trait;
use std::time::Duration;

/// Classes marking elements that expand content when clicked
pub const TOGGLE_CLASSES: &[&str] = &["toggle", "expand-toggle", "collapsible"];

/// Classes of wrappers that are hidden until a toggle opens them
pub const CONTENT_WRAPPER_CLASSES: &[&str] = &[
    "collapse",
    "collapsed",
    "hidden-content",
    "method-details",
    "endpoint-details",
    "schema-content",
];

/// Time allowed for the injected library to initialize
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Expands hidden content of an HTML document
#[async_trait]
pub trait HtmlRevealer: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Return `html` with hidden content made visible
    ///
    /// Only an unavailable backend is an error. Failures of individual
    /// reveal steps are logged and the best-effort document is returned.
    async fn reveal(&self, html: &str, script_library: &str) -> Result<String, DocsError>;
}

/// Revealer that returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRevealer;

#[async_trait]
impl HtmlRevealer for PassthroughRevealer {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    async fn reveal(&self, html: &str, _script_library: &str) -> Result<String, DocsError> {
        Ok(html.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_returns_input() {
        let html = r#"<div class="collapse" style="display:none">hidden</div>"#;
        let revealed = PassthroughRevealer.reveal(html, "var x;").await.unwrap();
        assert_eq!(revealed, html);
        assert_eq!(PassthroughRevealer.name(), "passthrough");
    }

    #[test]
    fn test_revealers_are_object_safe() {
        let revealers: Vec<Box<dyn HtmlRevealer>> =
            vec![Box::new(PassthroughRevealer), Box::new(StaticRevealer::new())];
        let names: Vec<_> = revealers.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["passthrough", "static"]);
    }
}
