//! Helper functions for creating tool handlers.

use std::future::Future;

use serde_json::Value;

use super::{FnToolHandler, ToolError};
use crate::provider::ToolDefinition;

/// Creates a [`ToolHandler`](super::ToolHandler) from a closure.
///
/// The closure receives the tool's JSON arguments and returns the result
/// record. Clone anything the future needs before the `async move` block;
/// the future must be `'static`.
///
/// ```rust
/// use persona_chat::tool::tool_fn;
/// use persona_chat::{JsonSchema, ToolDefinition};
/// use serde_json::{json, Value};
///
/// let handler = tool_fn(
///     ToolDefinition {
///         name: "record_unknown_question".into(),
///         description: "Record a question that couldn't be answered".into(),
///         parameters: JsonSchema::new(json!({
///             "type": "object",
///             "properties": { "question": { "type": "string" } },
///             "required": ["question"]
///         })),
///     },
///     |_input: Value| async move { Ok(json!({"recorded": true})) },
/// );
/// ```
pub fn tool_fn<F, Fut>(definition: ToolDefinition, handler: F) -> FnToolHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    FnToolHandler {
        definition,
        handler,
    }
}
