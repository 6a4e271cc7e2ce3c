//! Tool registry and the tool-calling orchestration loop.
//!
//! # Architecture
//!
//! ```text
//!   ToolHandler          one tool (declaration + async execute)
//!       │
//!   ToolRegistry         name → handler table, built once at start-up
//!       │
//!   tool_loop()          model call → run requested tools → feed results back
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use persona_chat::tool::{ToolLoopConfig, ToolRegistry, tool_fn, tool_loop};
//! use persona_chat::{ChatMessage, ChatParams, JsonSchema, ToolDefinition};
//! use serde_json::{Value, json};
//!
//! # async fn example(provider: &dyn persona_chat::DynProvider) -> Result<(), persona_chat::LlmError> {
//! let mut registry = ToolRegistry::new();
//! registry.register(tool_fn(
//!     ToolDefinition {
//!         name: "record_unknown_question".into(),
//!         description: "Record a question that couldn't be answered".into(),
//!         parameters: JsonSchema::new(json!({
//!             "type": "object",
//!             "properties": { "question": { "type": "string" } },
//!             "required": ["question"]
//!         })),
//!     },
//!     |input: Value| async move {
//!         println!("unknown question: {}", input["question"]);
//!         Ok(json!({"recorded": true}))
//!     },
//! ));
//!
//! let params = ChatParams {
//!     messages: vec![
//!         ChatMessage::system("You are a helpful assistant."),
//!         ChatMessage::user("What's the weather?"),
//!     ],
//!     ..Default::default()
//! };
//!
//! let result = tool_loop(provider, &registry, params, ToolLoopConfig::default()).await?;
//! println!("{}", result.reply());
//! # Ok(())
//! # }
//! ```

mod config;
mod encoder;
mod error;
mod execution;
mod handler;
mod helpers;
pub(crate) mod loop_core;
mod loop_sync;
mod registry;

pub use config::{LoopState, ToolLoopConfig, ToolLoopResult};
pub use encoder::{empty_result, encode};
pub use error::ToolError;
pub use execution::{ToolExecution, ToolOutcome, parse_arguments};
pub use handler::{FnToolHandler, ToolHandler};
pub use helpers::tool_fn;
pub use loop_sync::tool_loop;
pub use registry::ToolRegistry;
