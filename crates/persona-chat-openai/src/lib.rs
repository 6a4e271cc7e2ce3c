//! `OpenAI` Chat Completions provider for `persona-chat`.
//!
//! Any server that speaks the Chat Completions wire format works; point
//! [`OpenAiConfig::base_url`] at it.
//!
//! ```rust,no_run
//! use persona_chat_openai::{OpenAiConfig, OpenAiProvider};
//!
//! # fn example() -> Result<(), persona_chat::LlmError> {
//! let provider = OpenAiProvider::new(OpenAiConfig {
//!     api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
//!     ..Default::default()
//! })?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod convert;
mod provider;
mod types;

pub use config::OpenAiConfig;
pub use provider::OpenAiProvider;
