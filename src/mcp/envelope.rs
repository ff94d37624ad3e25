//! Best-effort unwrapping of the MCP tool result envelope:
//! `result[0].content[0].text` holding a JSON-encoded payload.
//!
//! Each step returns `None` on any shape mismatch so the caller can fall
//! back to the outer message.

use crate::mcp::types::ToolOutput;
use serde_json::Value;

/// Step 1: `result` as a non-empty sequence of items.
pub fn result_items(message: &Value) -> Option<&[Value]> {
    message
        .get("result")?
        .as_array()
        .filter(|items| !items.is_empty())
        .map(Vec::as_slice)
}

/// Step 2: the first item's `content`, as a non-empty sequence.
pub fn first_content(items: &[Value]) -> Option<&[Value]> {
    items
        .first()?
        .get("content")?
        .as_array()
        .filter(|content| !content.is_empty())
        .map(Vec::as_slice)
}

/// Step 3: the first content element's non-empty `text`.
pub fn first_text(content: &[Value]) -> Option<&str> {
    content
        .first()?
        .get("text")?
        .as_str()
        .filter(|text| !text.is_empty())
}

/// Step 4: decode the text as JSON.
pub fn decode_payload(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

pub fn extract_payload(message: &Value) -> Option<Value> {
    result_items(message)
        .and_then(first_content)
        .and_then(first_text)
        .and_then(decode_payload)
}

/// Unwrap a JSON-RPC response into its payload, or keep it whole.
pub fn unwrap_tool_result(message: Value) -> ToolOutput {
    match extract_payload(&message) {
        Some(payload) => ToolOutput::Decoded(payload),
        None => ToolOutput::RawOuter(message),
    }
}
