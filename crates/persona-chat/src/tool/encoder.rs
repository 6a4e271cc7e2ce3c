//! Turning a tool's result record into the `tool` message the model reads.

use serde_json::Value;

use crate::chat::ChatMessage;

/// The record sent back when a tool produced nothing usable.
pub fn empty_result() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Encodes `result` as a `tool` message answering `tool_call_id`.
///
/// Map keys keep their insertion order, so equal inputs always produce
/// byte-identical content.
///
/// ```rust
/// use persona_chat::tool::encode;
/// use serde_json::json;
///
/// let msg = encode("call_1", &json!({"recorded": true}));
/// assert_eq!(msg.tool_call_id(), Some("call_1"));
/// assert_eq!(msg.tool_result_block().unwrap().content, r#"{"recorded":true}"#);
/// ```
pub fn encode(tool_call_id: &str, result: &Value) -> ChatMessage {
    ChatMessage::tool_result(tool_call_id, result.to_string())
}
