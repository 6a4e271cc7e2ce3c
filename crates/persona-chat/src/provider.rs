//! Provider trait and request types.
//!
//! This module defines the model backend boundary:
//!
//! - **[`Provider`]**: the trait every backend implements, using native
//!   async-fn-in-traits.
//!
//! - **[`DynProvider`]**: an object-safe mirror of `Provider` that uses
//!   boxed futures. A blanket `impl<T: Provider> DynProvider for T`
//!   bridges the two, so a [`Chatbot`](crate::Chatbot) can hold any
//!   backend as `Arc<dyn DynProvider>`.
//!
//! A model call is a single request/response: the orchestration loop
//! awaits it and branches on [`ChatResponse::stop_reason`].

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::{ChatMessage, ChatResponse};
use crate::error::LlmError;

/// The core trait every model backend implements.
///
/// `Provider` is **not** object-safe because AFIT returns `impl Future`.
/// Use [`DynProvider`] for dynamic dispatch; every `Provider`
/// implements it automatically.
pub trait Provider: Send + Sync {
    /// Sends a chat completion request and returns the full response.
    fn generate(
        &self,
        params: &ChatParams,
    ) -> impl Future<Output = Result<ChatResponse, LlmError>> + Send;

    /// Returns static metadata describing this provider instance.
    fn metadata(&self) -> ProviderMetadata;
}

/// Object-safe counterpart of [`Provider`] for dynamic dispatch.
pub trait DynProvider: Send + Sync {
    /// Boxed-future version of [`Provider::generate`].
    fn generate_boxed<'a>(
        &'a self,
        params: &'a ChatParams,
    ) -> Pin<Box<dyn Future<Output = Result<ChatResponse, LlmError>> + Send + 'a>>;

    /// Returns static metadata describing this provider instance.
    fn metadata(&self) -> ProviderMetadata;
}

impl<T: Provider> DynProvider for T {
    fn generate_boxed<'a>(
        &'a self,
        params: &'a ChatParams,
    ) -> Pin<Box<dyn Future<Output = Result<ChatResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.generate(params))
    }

    fn metadata(&self) -> ProviderMetadata {
        Provider::metadata(self)
    }
}

/// Describes a provider instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Human-readable provider name (e.g. `"openai"`).
    pub name: Cow<'static, str>,
    /// The model identifier (e.g. `"gpt-4o-mini"`).
    pub model: String,
}

/// Parameters for one model call.
///
/// The loop owns a `ChatParams` for the duration of a turn and extends
/// [`messages`](Self::messages) in place; everything else is copied from
/// the [`Chatbot`](crate::Chatbot)'s template.
///
/// ```rust
/// use persona_chat::{ChatParams, ChatMessage};
///
/// let params = ChatParams {
///     messages: vec![ChatMessage::user("Hello")],
///     max_tokens: Some(256),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatParams {
    /// The working message sequence.
    pub messages: Vec<ChatMessage>,
    /// Tool declarations the model may invoke.
    pub tools: Option<Vec<ToolDefinition>>,
    /// Controls whether and how the model uses tools.
    pub tool_choice: Option<ToolChoice>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens.
    pub max_tokens: Option<u32>,
    /// Per-request transport timeout. Skipped during serialization.
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

/// Controls whether the model should use tools and, if so, which ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ToolChoice {
    /// The model decides whether to call a tool.
    Auto,
    /// The model must not call any tools.
    None,
    /// The model must call at least one tool.
    Required,
    /// The model must call this specific tool.
    Specific(String),
}

/// A tool declaration advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool's name, matched against [`ToolCall::name`](crate::ToolCall::name).
    pub name: String,
    /// Shown to the model so it knows when to use this tool.
    pub description: String,
    /// JSON Schema describing the tool's expected arguments.
    pub parameters: JsonSchema,
}

/// A JSON Schema document describing tool parameters.
///
/// ```rust
/// use persona_chat::JsonSchema;
///
/// let schema = JsonSchema::new(serde_json::json!({
///     "type": "object",
///     "properties": { "question": { "type": "string" } },
///     "required": ["question"]
/// }));
/// assert_eq!(schema.required(), vec!["question"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema(Value);

impl JsonSchema {
    /// Creates a schema from a raw JSON value.
    pub fn new(schema: Value) -> Self {
        Self(schema)
    }

    /// Returns a reference to the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Names listed under the schema's top-level `required` key.
    pub fn required(&self) -> Vec<&str> {
        self.0
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}
