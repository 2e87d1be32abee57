//! Streaming decoder (Bytes -> JSON Value) for Server-Sent Events.

use crate::BoxStream;
use bytes::Bytes;
use futures::{stream, StreamExt};
use serde_json::Value;

/// A minimal SSE decoder:
/// - splits by delimiter (default "\n\n"; CRLF line endings are normalized first)
/// - strips `prefix` (default "data: ")
/// - stops on `done_signal` (default "[DONE]")
#[derive(Debug, Clone)]
pub struct SseDecoder {
    delimiter: String,
    prefix: String,
    done_signal: String,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

impl SseDecoder {
    pub fn new(
        delimiter: Option<String>,
        prefix: Option<String>,
        done_signal: Option<String>,
    ) -> Self {
        Self {
            delimiter: delimiter.unwrap_or_else(|| "\n\n".to_string()),
            prefix: prefix.unwrap_or_else(|| "data: ".to_string()),
            done_signal: done_signal.unwrap_or_else(|| "[DONE]".to_string()),
        }
    }

    /// Decode a byte stream into one JSON value per SSE frame. Comment and
    /// non-JSON frames are skipped; transport errors pass through in order.
    ///
    /// Bytes are buffered until a full frame is present, so a multi-byte
    /// character split across network chunks is decoded intact.
    pub fn decode_stream(&self, input: BoxStream<'static, Bytes>) -> BoxStream<'static, Value> {
        let decoder = self.clone();

        let stream = stream::unfold((input, Vec::<u8>::new()), move |(mut input, mut buf)| {
            let decoder = decoder.clone();
            async move {
                loop {
                    if let Some(frame) = decoder.take_frame(&mut buf) {
                        if decoder.is_done(&frame) {
                            return None;
                        }
                        if let Some(v) = decoder.parse_payload(&frame) {
                            return Some((Ok(v), (input, buf)));
                        }
                        continue;
                    }

                    // Need more data.
                    match input.next().await {
                        Some(Ok(bytes)) => {
                            buf.extend_from_slice(&bytes);
                            normalize_crlf(&mut buf);
                        }
                        Some(Err(e)) => return Some((Err(e), (input, buf))),
                        None => {
                            // EOF: try parse remaining buffer once
                            let rest = String::from_utf8_lossy(&buf).into_owned();
                            if decoder.is_done(&rest) {
                                return None;
                            }
                            return decoder
                                .parse_payload(&rest)
                                .map(|v| (Ok(v), (input, Vec::new())));
                        }
                    }
                }
            }
        });

        Box::pin(stream)
    }

    /// Split the first complete frame off `buf`, dropping its delimiter.
    fn take_frame(&self, buf: &mut Vec<u8>) -> Option<String> {
        let delimiter = self.delimiter.as_bytes();
        if delimiter.is_empty() {
            return None;
        }
        let idx = buf.windows(delimiter.len()).position(|w| w == delimiter)?;
        let frame = String::from_utf8_lossy(&buf[..idx]).into_owned();
        buf.drain(..idx + delimiter.len());
        Some(frame)
    }

    fn is_done(&self, frame: &str) -> bool {
        let t = frame.trim();
        t == self.done_signal
            || t.strip_prefix("data:").map(str::trim) == Some(self.done_signal.as_str())
    }

    fn parse_payload(&self, raw: &str) -> Option<Value> {
        let trimmed = raw.trim();
        // Ignore empty frames and SSE comment lines
        if trimmed.is_empty() || trimmed.starts_with(':') {
            return None;
        }

        // A frame may carry several `data:` lines; join their payloads.
        let payload: String = trimmed
            .lines()
            .filter_map(|line| {
                line.strip_prefix(self.prefix.as_str())
                    .or_else(|| line.strip_prefix("data:").map(str::trim_start))
            })
            .collect::<Vec<_>>()
            .join("\n");
        let payload = if payload.is_empty() { trimmed } else { payload.as_str() };

        match serde_json::from_str(payload) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!(error = %e, "skipping non-JSON SSE frame");
                None
            }
        }
    }
}

/// Rewrite `\r\n` as `\n` in place. A trailing `\r` is kept until its pair arrives.
fn normalize_crlf(buf: &mut Vec<u8>) {
    if !buf.contains(&b'\r') {
        return;
    }
    let mut out = Vec::with_capacity(buf.len());
    let mut i = 0;
    while i < buf.len() {
        if buf[i] == b'\r' && buf.get(i + 1) == Some(&b'\n') {
            i += 1;
            continue;
        }
        out.push(buf[i]);
        i += 1;
    }
    *buf = out;
}
