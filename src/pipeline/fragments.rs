//! Gemini `streamGenerateContent` chunks → [`StreamFragment`]s.
//!
//! Each chunk is a full `GenerateContentResponse`:
//! `{candidates: [{content: {parts: [...]}}]}`. Parts map as follows:
//! - `functionCall` → function-call
//! - `text` with `thought: true` → thought-text
//! - other `text` → answer-text

use futures::{stream, StreamExt};
use serde_json::Value;

use crate::error::Error;
use crate::types::StreamFragment;
use crate::{BoxStream, Result};

/// Fragments carried by one chunk, in part order.
///
/// A chunk with a top-level `error` object fails with an error whose message
/// embeds `{"error": ...}` so it can be recovered at the turn boundary.
pub fn fragments_from_chunk(chunk: &Value) -> Result<Vec<StreamFragment>> {
    if let Some(error) = chunk.get("error") {
        return Err(Error::StreamConsumption(format!(
            "Model stream error: {}",
            serde_json::json!({ "error": error })
        )));
    }

    let mut fragments = Vec::new();
    let candidates = chunk
        .get("candidates")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for candidate in candidates {
        let parts = candidate
            .pointer("/content/parts")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for part in parts {
            if let Some(call) = part.get("functionCall") {
                let name = call.get("name").and_then(Value::as_str).unwrap_or_default();
                let args = call.get("args").cloned().unwrap_or(Value::Object(Default::default()));
                fragments.push(StreamFragment::function_call(name, args));
                continue;
            }

            let text = match part.get("text").and_then(Value::as_str) {
                Some(t) if !t.is_empty() => t,
                _ => continue,
            };
            if part.get("thought").and_then(Value::as_bool).unwrap_or(false) {
                fragments.push(StreamFragment::thought(text));
            } else {
                fragments.push(StreamFragment::answer(text));
            }
        }
    }

    Ok(fragments)
}

/// Flatten a stream of decoded chunks into a stream of fragments. The first
/// error is yielded and ends nothing by itself; consumers stop on it.
pub fn map_chunks(input: BoxStream<'static, Value>) -> BoxStream<'static, StreamFragment> {
    let stream = input.flat_map(|item| {
        let items: Vec<Result<StreamFragment>> = match item.and_then(|chunk| fragments_from_chunk(&chunk)) {
            Ok(fragments) => fragments.into_iter().map(Ok).collect(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(items)
    });
    Box::pin(stream)
}
