//! The caller-facing entry point: one visitor message in, one reply out.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::chat::ChatMessage;
use crate::context::{build_messages, validate_history};
use crate::error::LlmError;
use crate::provider::{ChatParams, DynProvider};
use crate::tool::{ToolLoopConfig, ToolLoopResult, ToolRegistry, tool_loop};

/// A configured assistant: a model backend, the tools it may call, and
/// the system prompt it speaks under.
///
/// Built once at start-up and shared; `Chatbot` is `Send + Sync` and holds
/// no per-conversation state, so turns of different conversations can run
/// concurrently.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use persona_chat::{Chatbot, Persona, ToolRegistry};
///
/// # async fn example(provider: Arc<dyn persona_chat::DynProvider>) -> Result<(), persona_chat::LlmError> {
/// let persona = Persona::new("Rohit", "Data engineer, ten years in analytics.");
/// let bot = Chatbot::new(provider, Arc::new(ToolRegistry::new()), persona.system_prompt());
///
/// let reply = bot.chat("What do you work on?", &[]).await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Chatbot {
    provider: Arc<dyn DynProvider>,
    registry: Arc<ToolRegistry>,
    system_prompt: String,
    config: ToolLoopConfig,
    params: ChatParams,
}

impl std::fmt::Debug for Chatbot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chatbot")
            .field("provider", &self.provider.metadata())
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Chatbot {
    /// Creates a chatbot with the default [`ToolLoopConfig`].
    pub fn new(
        provider: Arc<dyn DynProvider>,
        registry: Arc<ToolRegistry>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            registry,
            system_prompt: system_prompt.into(),
            config: ToolLoopConfig::default(),
            params: ChatParams::default(),
        }
    }

    /// Replaces the loop configuration.
    #[must_use]
    pub fn with_config(mut self, config: ToolLoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets request parameters (temperature, token cap, ...) applied to
    /// every model call. Its `messages` and `tools` are ignored.
    #[must_use]
    pub fn with_params(mut self, params: ChatParams) -> Self {
        self.params = ChatParams {
            messages: Vec::new(),
            tools: None,
            ..params
        };
        self
    }

    /// The tool registry this chatbot exposes to the model.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// The rendered system prompt.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Runs one turn and returns the model's final reply text.
    ///
    /// `history` is never modified. On error nothing about the turn should
    /// be recorded by the caller.
    pub async fn chat(&self, user_message: &str, history: &[ChatMessage]) -> Result<String, LlmError> {
        let result = self.chat_turn(user_message, history).await?;
        Ok(result.reply().to_owned())
    }

    /// Runs one turn and returns the full loop result.
    #[instrument(skip_all, fields(model = %self.provider.metadata().model, history = history.len()))]
    pub async fn chat_turn(
        &self,
        user_message: &str,
        history: &[ChatMessage],
    ) -> Result<ToolLoopResult, LlmError> {
        validate_history(history)?;

        let params = ChatParams {
            messages: build_messages(&self.system_prompt, history, user_message),
            ..self.params.clone()
        };
        let result = tool_loop(
            self.provider.as_ref(),
            &self.registry,
            params,
            self.config.clone(),
        )
        .await?;

        info!(
            iterations = result.iterations,
            tool_calls = result.tool_executions.len(),
            input_tokens = result.total_usage.input_tokens,
            output_tokens = result.total_usage.output_tokens,
            "turn complete"
        );
        Ok(result)
    }
}
