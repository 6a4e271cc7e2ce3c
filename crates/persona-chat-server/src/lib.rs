//! Website chat server for a `persona-chat` assistant.
//!
//! The binary wires an [`OpenAiProvider`](persona_chat_openai::OpenAiProvider),
//! the two recording [`tools`] and a [`Notifier`](notify::Notifier) into a
//! [`Chatbot`](persona_chat::Chatbot), then serves it with [`app::build_app`].
//! Everything is assembled once in [`build_state`] and shared by `Arc`.

#![warn(missing_docs)]

pub mod app;
pub mod config;
pub mod notify;
pub mod page;
pub mod tools;

use std::sync::Arc;

use anyhow::{Context, Result};
use persona_chat::Chatbot;
use persona_chat_openai::OpenAiProvider;
use tracing::info;

use crate::app::AppState;
use crate::config::AppConfig;
use crate::notify::{LogNotifier, Notifier, PushoverNotifier};

/// Builds the shared application state from resolved configuration.
pub fn build_state(config: AppConfig) -> Result<Arc<AppState>> {
    let provider =
        OpenAiProvider::new(config.openai).context("failed to create OpenAI provider")?;

    let notifier: Arc<dyn Notifier> = match config.pushover {
        Some(credentials) => {
            info!("notifications via Pushover");
            Arc::new(PushoverNotifier::new(reqwest::Client::new(), credentials))
        }
        None => {
            info!("no Pushover credentials; notifications will be logged");
            Arc::new(LogNotifier)
        }
    };

    let chatbot = Chatbot::new(
        Arc::new(provider),
        Arc::new(tools::registry(notifier)),
        config.persona.system_prompt(),
    )
    .with_config(config.tool_loop)
    .with_params(config.params);

    Ok(Arc::new(AppState::new(chatbot, &config.persona.name)))
}
