//! Line-oriented SSE decoding for the Codex `/responses` stream.
//!
//! Only `data:` lines carry payload. Each payload is decoded on its own; a
//! line that is not valid JSON is skipped so heartbeats or truncated lines
//! never abort the stream.

use crate::types::{StreamEvent, Usage};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Sentinel payload marking the end of the stream.
pub(crate) const DONE_SENTINEL: &str = "[DONE]";

/// Splits incoming byte chunks into complete lines.
///
/// Bytes are buffered until a newline arrives, so multi-byte UTF-8 sequences
/// and lines split across network chunks are reassembled before decoding.
#[derive(Debug, Default)]
pub(crate) struct SseLineDecoder {
    buffer: Vec<u8>,
}

impl SseLineDecoder {
    /// Feed one chunk and return every line it completed, in order.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            lines.push(decode_line(&self.buffer[start..end]));
            start = end + 1;
        }
        self.buffer.drain(..start);
        lines
    }

    /// Flush a trailing line that was not newline-terminated.
    pub(crate) fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = decode_line(&self.buffer);
        self.buffer.clear();
        Some(line)
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Return the trimmed payload of a `data:` line.
pub(crate) fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}

/// Decode one SSE line into an event. `None` for non-data, empty, or malformed lines.
pub(crate) fn parse_sse_line(line: &str) -> Option<StreamEvent> {
    data_payload(line).and_then(parse_event_payload)
}

/// Wire shape of the events this client acts on, keyed by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WireEvent {
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta {
        #[serde(default)]
        delta: Option<String>,
    },
    #[serde(rename = "response.completed", alias = "response.done")]
    Completed {
        #[serde(default)]
        response: Value,
    },
    #[serde(other)]
    Other,
}

/// Decode one `data:` payload.
pub(crate) fn parse_event_payload(payload: &str) -> Option<StreamEvent> {
    if payload.is_empty() {
        return None;
    }
    if payload == DONE_SENTINEL {
        return Some(StreamEvent::Done);
    }
    let event: WireEvent = match serde_json::from_str(payload) {
        Ok(event) => event,
        Err(err) => {
            debug!(error = %err, "skipping undecodable stream event");
            return None;
        }
    };
    Some(match event {
        WireEvent::OutputTextDelta { delta } => StreamEvent::TextDelta(delta.unwrap_or_default()),
        WireEvent::Completed { response } => StreamEvent::Completed {
            text: final_output_text(&response),
            usage: response.get("usage").and_then(parse_usage),
        },
        WireEvent::Other => StreamEvent::Unrecognized,
    })
}

/// Find the authoritative text in `response.output[type=message].content[type=output_text]`.
///
/// When several parts match, the last one wins.
fn final_output_text(response: &Value) -> Option<String> {
    let output = response.get("output").and_then(Value::as_array)?;
    output
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .last()
        .map(str::to_string)
}

/// Map a responses-style usage object; absent counters default to zero.
fn parse_usage(usage: &Value) -> Option<Usage> {
    if !usage.is_object() {
        return None;
    }
    Some(Usage {
        prompt_tokens: read_u64(usage, "input_tokens"),
        cached_prompt_tokens: usage
            .get("input_tokens_details")
            .map(|details| read_u64(details, "cached_tokens"))
            .unwrap_or_default(),
        completion_tokens: read_u64(usage, "output_tokens"),
        total_tokens: read_u64(usage, "total_tokens"),
    })
}

/// Read an unsigned counter given as number or numeric string.
fn read_u64(value: &Value, key: &str) -> u64 {
    match value.get(key) {
        Some(Value::Number(num)) => num.as_u64().unwrap_or_default(),
        Some(Value::String(text)) => text.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}
