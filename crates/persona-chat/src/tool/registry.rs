//! Tool registry: the name → handler table consulted by the loop.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::{ToolError, ToolHandler};
use crate::provider::ToolDefinition;

/// A registry of tool handlers, indexed by name.
///
/// Built once at start-up and shared (usually behind an `Arc`) by every
/// turn. Lookups of unknown names return `None`; nothing here panics on
/// model-supplied input.
///
/// ```rust
/// use persona_chat::tool::{ToolRegistry, tool_fn};
/// use persona_chat::{JsonSchema, ToolDefinition};
/// use serde_json::json;
///
/// let mut registry = ToolRegistry::new();
/// registry.register(tool_fn(
///     ToolDefinition {
///         name: "ping".into(),
///         description: "Liveness check".into(),
///         parameters: JsonSchema::new(json!({"type": "object"})),
///     },
///     |_| async { Ok(json!({"pong": true})) },
/// ));
///
/// assert!(registry.contains("ping"));
/// assert!(registry.resolve("pong").is_none());
/// ```
#[derive(Default, Clone)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool handler.
    ///
    /// If a handler with the same name already exists, it is replaced.
    pub fn register(&mut self, handler: impl ToolHandler + 'static) -> &mut Self {
        let name = handler.definition().name;
        self.handlers.insert(name, Arc::new(handler));
        self
    }

    /// The declarations of all registered tools, sorted by name.
    ///
    /// Sorting keeps the request body identical across turns.
    pub fn declare(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.handlers.values().map(|h| h.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Returns the handler for `name`, or `None` if no such tool exists.
    pub fn resolve(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.handlers.get(name)
    }

    /// Returns whether a tool with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Returns the number of registered tools.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invokes a tool directly, outside the orchestration loop.
    ///
    /// Used by callers that run a tool on the visitor's behalf (a contact
    /// form, for instance) and want the same handler the model sees.
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let handler = self
            .resolve(name)
            .ok_or_else(|| ToolError::new(format!("unknown tool '{name}'")))?;
        handler.execute(arguments).await
    }
}
