//! Builds the JSON body for `POST /codex/responses`.

use crate::types::{Message, Role};
use serde_json::{json, Value};
use tracing::warn;

/// Instructions used when neither the caller nor the message list supplies any.
pub(crate) const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant.";

/// Fixed per-client request settings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestOptions<'a> {
    pub(crate) model: &'a str,
    pub(crate) verbosity: &'a str,
}

/// Resolve the `instructions` field.
///
/// An explicit `system` argument wins. Otherwise the last system-role entry
/// is used; earlier ones are dropped with a warning.
pub(crate) fn resolve_instructions(messages: &[Message], system: Option<&str>) -> String {
    let system_entries: Vec<&Message> = messages
        .iter()
        .filter(|message| message.role == Role::System)
        .collect();
    if system_entries.len() > 1 {
        warn!(
            count = system_entries.len(),
            "multiple system messages supplied; only the last one is used"
        );
    }
    system
        .or_else(|| system_entries.last().map(|message| message.content.as_str()))
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(DEFAULT_INSTRUCTIONS)
        .to_string()
}

/// Build the request payload. Streaming is always requested; the backend only streams.
pub(crate) fn build_codex_payload(
    messages: &[Message],
    system: Option<&str>,
    options: RequestOptions<'_>,
) -> Value {
    let input: Vec<Value> = messages
        .iter()
        .filter(|message| message.role != Role::System)
        .map(|message| json!({ "role": message.role, "content": message.content }))
        .collect();

    json!({
        "model": options.model,
        "stream": true,
        "input": input,
        "store": false,
        "instructions": resolve_instructions(messages, system),
        "text": { "verbosity": options.verbosity },
        "include": ["reasoning.encrypted_content"],
        "tool_choice": "auto",
        "parallel_tool_calls": true,
    })
}
