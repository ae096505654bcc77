//! Body wrappers for the two rich-text formats the remote APIs accept.
//!
//! Jira fields take an Atlassian Document Format tree; Confluence content
//! takes HTML-like "storage" markup.

use serde_json::{json, Value};

/// Wrap plain text into a minimal ADF document: one paragraph, one text
/// node, the text carried verbatim.
pub fn paragraph_doc(text: &str) -> Value {
    json!({
        "version": 1,
        "type": "doc",
        "content": [
            {
                "type": "paragraph",
                "content": [{ "type": "text", "text": text }],
            }
        ],
    })
}

/// Wrap plain text in a paragraph tag unless it already looks like
/// storage markup (trimmed string starts with `<`).
pub fn ensure_storage_markup(text: &str) -> String {
    if text.trim_start().starts_with('<') {
        text.to_string()
    } else {
        format!("<p>{text}</p>")
    }
}
