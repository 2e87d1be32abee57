//! User-facing text for a failed model stream.

use serde_json::Value;

use crate::markdown::MarkdownRenderer;
use crate::utils::json_path;

/// Message to show for a stream failure with raw message `raw`.
///
/// Model APIs embed a JSON body after a textual prefix, e.g.
/// `HTTP 400: {"error": {"message": "API key not valid"}}`. When the text from
/// the first `{` parses and has `error.message`, that message is rendered as
/// markdown and returned. Otherwise `raw` is returned verbatim.
pub fn recover_error_message(raw: &str, markdown: &dyn MarkdownRenderer) -> String {
    let Some(start) = raw.find('{') else {
        return raw.to_string();
    };

    let parsed: Value = match serde_json::from_str(&raw[start..]) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "unable to parse the error message");
            return raw.to_string();
        }
    };

    if parsed.get("error").is_none() {
        return raw.to_string();
    }
    match json_path::get_path(&parsed, "error.message").and_then(Value::as_str) {
        Some(message) => markdown.render(message),
        None => {
            tracing::warn!("error payload has no message field");
            raw.to_string()
        }
    }
}
