//! Literal, case-insensitive search with context windows

use crate::error::DocsError;
use crate::extract::floor_char_boundary;
use crate::types::SearchMatch;
use regex::RegexBuilder;

/// Maximum matches returned per document
pub const MAX_MATCHES: usize = 50;

/// Characters of context captured on each side of a match
pub const CONTEXT_CHARS: usize = 100;

/// Find up to [`MAX_MATCHES`] occurrences of `query` in `text`
///
/// The query is escaped before compilation, so regex metacharacters match
/// themselves.
pub fn search(text: &str, query: &str) -> Result<Vec<SearchMatch>, DocsError> {
    if query.is_empty() {
        return Err(DocsError::MissingParameter("query"));
    }

    let pattern = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .map_err(|e| DocsError::InvalidArguments(format!("unusable query: {e}")))?;

    let mut line = 1;
    let mut counted_to = 0;

    let matches = pattern
        .find_iter(text)
        .take(MAX_MATCHES)
        .map(|m| {
            line += text[counted_to..m.start()].matches('\n').count();
            counted_to = m.start();

            let before = floor_char_boundary(text, m.start().saturating_sub(CONTEXT_CHARS));
            let after = floor_char_boundary(text, m.end() + CONTEXT_CHARS);
            SearchMatch {
                position: m.start(),
                line,
                matched_text: m.as_str().to_string(),
                context: text[before..after].to_string(),
            }
        })
        .collect();

    Ok(matches)
}
