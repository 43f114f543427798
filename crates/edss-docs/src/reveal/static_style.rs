//! Style-only revealer
//!
//! Works on inline `style` attributes without running any script, so toggle
//! activation is skipped. Content wrappers are forced visible and
//! `display: none` declarations are dropped elsewhere. Documents without
//! wrappers or hidden declarations come back byte-identical.

use super::{HtmlRevealer, CONTENT_WRAPPER_CLASSES, TOGGLE_CLASSES};
use crate::error::DocsError;
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

/// Declaration applied to content wrappers
const VISIBLE: &str = "display: block";

static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+style\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

static DISPLAY_NONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)display\s*:\s*none\s*(?:!important)?\s*;?\s*").unwrap());

static DISPLAY_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)display\s*:[^;]*;?\s*").unwrap());

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

static OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([a-zA-Z][a-zA-Z0-9-]*)(\s[^<>]*?)(/?)>").unwrap());

/// Revealer for environments without a script engine
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRevealer;

impl StaticRevealer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HtmlRevealer for StaticRevealer {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn reveal(&self, html: &str, _script_library: &str) -> Result<String, DocsError> {
        let toggles = count_toggles(html);
        if toggles > 0 {
            debug!(toggles, "Toggle activation skipped without a script engine");
        }
        Ok(strip_hidden_styles(&force_visible_wrappers(html)))
    }
}

/// Give every content wrapper an explicit visible `display`
///
/// Other declarations of an existing `style` attribute are kept.
pub fn force_visible_wrappers(html: &str) -> String {
    let mut forced = 0usize;
    let result = OPEN_TAG.replace_all(html, |caps: &Captures| {
        let attrs = &caps[2];
        if !has_class(attrs, CONTENT_WRAPPER_CLASSES) {
            return caps[0].to_string();
        }

        let existing = STYLE_ATTR
            .captures(attrs)
            .and_then(|style| style.get(1).or_else(|| style.get(2)))
            .map_or("", |m| m.as_str());
        let kept = DISPLAY_ANY.replace_all(existing, "");
        let kept = kept.trim().trim_end_matches(';').trim_end();
        let style = if kept.is_empty() {
            VISIBLE.to_string()
        } else {
            format!("{kept}; {VISIBLE}")
        };
        let quote = if style.contains('"') { '\'' } else { '"' };

        forced += 1;
        let attrs = STYLE_ATTR.replace(attrs, "");
        format!(
            "<{}{} style={quote}{style}{quote}{}>",
            &caps[1],
            attrs.trim_end(),
            &caps[3]
        )
    });
    if forced > 0 {
        debug!(forced, "Forced content wrappers visible");
    }
    result.into_owned()
}

/// Remove `display: none` declarations from inline styles
///
/// A `style` attribute left empty is dropped entirely.
pub fn strip_hidden_styles(html: &str) -> String {
    let mut stripped = 0usize;
    let result = STYLE_ATTR.replace_all(html, |caps: &Captures| {
        let (quote, value) = match (caps.get(1), caps.get(2)) {
            (Some(v), _) => ('"', v.as_str()),
            (None, Some(v)) => ('\'', v.as_str()),
            (None, None) => return caps[0].to_string(),
        };
        if !DISPLAY_NONE.is_match(value) {
            return caps[0].to_string();
        }

        stripped += 1;
        let cleaned = DISPLAY_NONE.replace_all(value, "");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            String::new()
        } else {
            format!(" style={quote}{cleaned}{quote}")
        }
    });
    if stripped > 0 {
        debug!(stripped, "Removed hidden display declarations");
    }
    result.into_owned()
}

/// Whether the `class` attribute within `attrs` names one of `classes`
fn has_class(attrs: &str, classes: &[&str]) -> bool {
    CLASS_ATTR.captures(attrs).is_some_and(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str())
            .split_whitespace()
            .any(|class| classes.contains(&class))
    })
}

fn count_toggles(html: &str) -> usize {
    OPEN_TAG
        .captures_iter(html)
        .filter(|caps| has_class(&caps[2], TOGGLE_CLASSES))
        .count()
}
