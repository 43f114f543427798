//! Headless Chromium revealer
//!
//! Each call launches a disposable browser, loads the document, injects the
//! bundled script library and drives the reveal steps from page script.

use super::{HtmlRevealer, CONTENT_WRAPPER_CLASSES, SETTLE_DELAY, TOGGLE_CLASSES};
use crate::error::DocsError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Counters reported by the in-page reveal script
#[derive(Debug, Default, Deserialize)]
struct RevealReport {
    activated: u32,
    failed: u32,
    revealed: u32,
    stripped: u32,
}

/// Revealer backed by a headless Chromium instance
#[derive(Debug, Clone)]
pub struct ChromiumRevealer {
    settle_delay: Duration,
    chrome_executable: Option<PathBuf>,
}

impl Default for ChromiumRevealer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromiumRevealer {
    pub fn new() -> Self {
        Self {
            settle_delay: SETTLE_DELAY,
            chrome_executable: None,
        }
    }

    /// Override the wait between script injection and reveal
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Use a specific Chrome/Chromium binary
    pub fn chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    async fn reveal_in_page(&self, page: &Page, html: &str, script_library: &str) -> String {
        if let Err(e) = page.evaluate(inject_script(script_library)).await {
            warn!(error = %e, "Script library injection failed");
        }

        tokio::time::sleep(self.settle_delay).await;

        match page.evaluate(reveal_script()).await {
            Ok(result) => match result.into_value::<RevealReport>() {
                Ok(report) => {
                    if report.failed > 0 {
                        warn!(failed = report.failed, "Some toggles could not be activated");
                    }
                    debug!(
                        activated = report.activated,
                        revealed = report.revealed,
                        stripped = report.stripped,
                        "Reveal steps applied"
                    );
                }
                Err(e) => warn!(error = %e, "Unreadable reveal report"),
            },
            Err(e) => warn!(error = %e, "Reveal script failed"),
        }

        match page.content().await {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Could not serialize revealed document, returning input");
                html.to_string()
            }
        }
    }
}

#[async_trait]
impl HtmlRevealer for ChromiumRevealer {
    fn name(&self) -> &'static str {
        "chromium"
    }

    async fn reveal(&self, html: &str, script_library: &str) -> Result<String, DocsError> {
        let mut builder = BrowserConfig::builder().no_sandbox();
        if let Some(ref path) = self.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| DocsError::Processing(format!("invalid browser config: {e}")))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DocsError::Processing(format!("failed to launch browser: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "Browser handler event error");
                }
            }
        });

        let result = match browser.new_page("about:blank").await {
            Ok(page) => match page.set_content(html).await {
                Ok(_) => Ok(self.reveal_in_page(&page, html, script_library).await),
                Err(e) => Err(DocsError::Processing(format!(
                    "failed to load document: {e}"
                ))),
            },
            Err(e) => Err(DocsError::Processing(format!("failed to open page: {e}"))),
        };

        if let Err(e) = browser.close().await {
            warn!(error = %e, "Failed to close browser");
        }
        handler_task.abort();

        result
    }
}

fn inject_script(script_library: &str) -> String {
    let source = serde_json::to_string(script_library).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        "(() => {{ const s = document.createElement('script'); s.textContent = {source}; \
         (document.head || document.documentElement).appendChild(s); return true; }})()"
    )
}

fn class_selector(classes: &[&str]) -> String {
    classes
        .iter()
        .map(|c| format!(".{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn reveal_script() -> String {
    format!(
        r#"(() => {{
  const report = {{ activated: 0, failed: 0, revealed: 0, stripped: 0 }};
  document.querySelectorAll('{toggles}').forEach((el) => {{
    try {{ el.click(); report.activated++; }} catch (e) {{ report.failed++; }}
  }});
  document.querySelectorAll('{wrappers}').forEach((el) => {{
    if (el.style.display === 'none') {{ el.style.removeProperty('display'); }}
    else {{ el.style.display = 'block'; }}
    report.revealed++;
  }});
  document.querySelectorAll('[style]').forEach((el) => {{
    if (el.style.display === 'none') {{ el.style.removeProperty('display'); report.stripped++; }}
  }});
  return report;
}})()"#,
        toggles = class_selector(TOGGLE_CLASSES),
        wrappers = class_selector(CONTENT_WRAPPER_CLASSES),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_script_escapes_source() {
        let script = inject_script("var a = \"</script>\";\n");
        assert!(script.contains(r#"s.textContent = "var a = \"</script>\";\n";"#));
    }

    #[test]
    fn test_reveal_script_selectors() {
        let script = reveal_script();
        assert!(script.contains(".toggle, .expand-toggle, .collapsible"));
        assert!(script.contains(".collapse, .collapsed"));
    }
}
