//! Tool handler trait and the closure-backed implementation.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use super::ToolError;
use crate::provider::ToolDefinition;

/// A single tool that the model can invoke.
///
/// Implement this trait for tools with their own state. For simple tools,
/// use [`super::tool_fn`] to wrap a closure. A tool that needs a shared
/// dependency (an HTTP client, a notifier) captures it at construction;
/// there is no per-call context argument.
///
/// The trait is object-safe (boxed futures) so handlers can be stored as
/// `Arc<dyn ToolHandler>`.
///
/// ```rust
/// use persona_chat::tool::{ToolError, ToolHandler};
/// use persona_chat::{JsonSchema, ToolDefinition};
/// use serde_json::{json, Value};
/// use std::future::Future;
/// use std::pin::Pin;
///
/// struct Echo;
///
/// impl ToolHandler for Echo {
///     fn definition(&self) -> ToolDefinition {
///         ToolDefinition {
///             name: "echo".into(),
///             description: "Returns its arguments".into(),
///             parameters: JsonSchema::new(json!({"type": "object"})),
///         }
///     }
///
///     fn execute<'a>(
///         &'a self,
///         input: Value,
///     ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + 'a>> {
///         Box::pin(async move { Ok(input) })
///     }
/// }
/// ```
pub trait ToolHandler: Send + Sync {
    /// Returns the tool's definition (name, description, parameter schema).
    fn definition(&self) -> ToolDefinition;

    /// Executes the tool with the given JSON arguments.
    ///
    /// The returned value is the tool's result record; the loop serializes
    /// it into the `tool` message sent back to the model.
    fn execute<'a>(
        &'a self,
        input: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + 'a>>;
}

/// A tool handler backed by an async closure, created by [`super::tool_fn`].
pub struct FnToolHandler<F> {
    pub(crate) definition: ToolDefinition,
    pub(crate) handler: F,
}

impl<F> std::fmt::Debug for FnToolHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnToolHandler")
            .field("name", &self.definition.name)
            .finish_non_exhaustive()
    }
}

impl<F, Fut> ToolHandler for FnToolHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn execute<'a>(
        &'a self,
        input: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + 'a>> {
        Box::pin((self.handler)(input))
    }
}
