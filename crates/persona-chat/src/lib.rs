//! # persona-chat
//!
//! Tool-calling chat orchestration for a personal-website assistant.
//!
//! A visitor's message, their prior history and a system prompt describing
//! the persona go to a chat-completion backend together with a set of
//! callback tools. When the model asks for tools, they are run, their
//! results are fed back, and the model is called again until it answers.
//!
//! This crate contains no network code. Backends live in sibling crates
//! and implement [`Provider`] (or its object-safe counterpart
//! [`DynProvider`]).
//!
//! # Architecture
//!
//! ```text
//!  ┌─────────────────────┐   ┌─────────────────────┐
//!  │ persona-chat-server │──▶│ persona-chat-openai │
//!  └──────────┬──────────┘   └──────────┬──────────┘
//!             │                         │
//!             ▼                         ▼
//!  ┌──────────────────────────────────────────────┐
//!  │                 persona-chat                 │
//!  │  (Chatbot, tool loop, Provider trait, ...)   │
//!  └──────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use persona_chat::{Chatbot, Persona, ToolRegistry};
//!
//! # async fn example(provider: Arc<dyn persona_chat::DynProvider>) -> Result<(), persona_chat::LlmError> {
//! let persona = Persona::new("Rohit", "Data engineer.");
//! let bot = Chatbot::new(provider, Arc::new(ToolRegistry::new()), persona.system_prompt());
//! let reply = bot.chat("What kinds of projects has Rohit worked on?", &[]).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`chat`] | Messages, content blocks, tool calls, and responses |
//! | [`context`] | Assembling and validating the working sequence |
//! | [`error`] | Unified [`LlmError`] |
//! | [`persona`] | The persona and its system prompt |
//! | [`provider`] | The [`Provider`] trait and request parameters |
//! | [`tool`] | Tool registry and the orchestration loop |
//! | [`usage`] | Token counts |

#![warn(missing_docs)]

pub mod chat;
mod chatbot;
pub mod context;
pub mod error;
pub mod persona;
pub mod provider;
pub mod tool;
pub mod usage;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

pub use chat::{ChatMessage, ChatResponse, ChatRole, ContentBlock, StopReason, ToolCall, ToolResult};
pub use chatbot::Chatbot;
pub use error::LlmError;
pub use persona::Persona;
pub use provider::{
    ChatParams, DynProvider, JsonSchema, Provider, ProviderMetadata, ToolChoice, ToolDefinition,
};
pub use tool::{ToolHandler, ToolLoopConfig, ToolRegistry};
pub use usage::Usage;
