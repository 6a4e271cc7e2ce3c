//! Command-line and environment configuration.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use persona_chat::{ChatParams, Persona, ToolChoice, ToolLoopConfig};
use persona_chat_openai::OpenAiConfig;
use tracing::warn;

/// Website chat server that answers visitor questions as a persona.
///
/// Every flag falls back to an environment variable; a `.env` file in the
/// working directory is loaded first.
#[derive(Parser)]
#[command(name = "persona-chat-server", version, about)]
pub struct Args {
    /// Host name or IP address to bind the HTTP server to.
    #[arg(long, env = "BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 7860)]
    pub port: u16,

    /// Name of the person the assistant represents.
    #[arg(long, env = "PERSONA_NAME")]
    pub persona_name: String,

    /// Plain-text background summary the assistant answers from.
    #[arg(long, env = "SUMMARY_PATH", default_value = "summary.txt")]
    pub summary_path: PathBuf,

    /// `OpenAI` API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Base URL of a Chat Completions compatible API.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// Model identifier.
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    /// Sampling temperature. The API default applies when unset.
    #[arg(long, env = "OPENAI_TEMPERATURE")]
    pub temperature: Option<f32>,

    /// Cap on generated tokens per model call.
    #[arg(long, env = "OPENAI_MAX_TOKENS", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_tokens: Option<u32>,

    /// Whether the model may call the recording tools.
    #[arg(long, env = "TOOL_CHOICE", value_enum, default_value_t = ToolMode::Auto)]
    pub tool_choice: ToolMode,

    /// Pushover user key. Without both Pushover values, notifications are
    /// only logged.
    #[arg(long, env = "PUSHOVER_USER", hide_env_values = true)]
    pub pushover_user: Option<String>,

    /// Pushover application token.
    #[arg(long, env = "PUSHOVER_TOKEN", hide_env_values = true)]
    pub pushover_token: Option<String>,

    /// Maximum model calls per visitor message.
    #[arg(
        long,
        env = "MAX_TOOL_ITERATIONS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_iterations: u32,

    /// Seconds to wait for one model call.
    #[arg(
        long,
        env = "MODEL_TIMEOUT_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub model_timeout_secs: u64,

    /// Seconds to wait for one tool call.
    #[arg(
        long,
        env = "TOOL_TIMEOUT_SECS",
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tool_timeout_secs: u64,

    /// Run the tool requests of one model response concurrently.
    #[arg(long, env = "PARALLEL_TOOLS")]
    pub parallel_tools: bool,
}

/// How the model is told to treat the declared tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToolMode {
    /// The model decides when to record.
    Auto,
    /// Tools stay declared but the model must not call them.
    None,
}

impl From<ToolMode> for ToolChoice {
    fn from(mode: ToolMode) -> Self {
        match mode {
            ToolMode::Auto => ToolChoice::Auto,
            ToolMode::None => ToolChoice::None,
        }
    }
}

/// Pushover credentials.
#[derive(Clone)]
pub struct PushoverCredentials {
    /// Application token.
    pub token: String,
    /// User key.
    pub user: String,
}

impl std::fmt::Debug for PushoverCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverCredentials")
            .field("token", &"[REDACTED]")
            .field("user", &"[REDACTED]")
            .finish()
    }
}

/// Resolved server configuration, built once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address to listen on.
    pub addr: SocketAddr,
    /// The persona, with its summary already loaded.
    pub persona: Persona,
    /// Model backend settings.
    pub openai: OpenAiConfig,
    /// Notification credentials, if configured.
    pub pushover: Option<PushoverCredentials>,
    /// Orchestration loop limits.
    pub tool_loop: ToolLoopConfig,
    /// Request parameters applied to every model call.
    pub params: ChatParams,
}

impl Args {
    /// Resolves the arguments into an [`AppConfig`], reading the summary
    /// file from disk.
    pub fn into_config(self) -> Result<AppConfig> {
        let addr = resolve_bind(&self.bind, self.port)?;

        let summary = std::fs::read_to_string(&self.summary_path).with_context(|| {
            format!("failed to read summary file {}", self.summary_path.display())
        })?;
        if summary.trim().is_empty() {
            warn!(path = %self.summary_path.display(), "summary file is empty");
        }

        let pushover = match (self.pushover_token, self.pushover_user) {
            (Some(token), Some(user)) if !token.is_empty() && !user.is_empty() => {
                Some(PushoverCredentials { token, user })
            }
            (None, None) => None,
            _ => {
                warn!("only one of PUSHOVER_TOKEN and PUSHOVER_USER is set; notifications will be logged");
                None
            }
        };

        Ok(AppConfig {
            addr,
            persona: Persona::new(self.persona_name, summary),
            openai: OpenAiConfig {
                api_key: self.openai_api_key,
                model: self.model,
                base_url: self.openai_base_url,
                ..Default::default()
            },
            pushover,
            tool_loop: ToolLoopConfig {
                max_iterations: self.max_iterations,
                model_timeout: Some(Duration::from_secs(self.model_timeout_secs)),
                tool_timeout: Some(Duration::from_secs(self.tool_timeout_secs)),
                parallel_tool_execution: self.parallel_tools,
            },
            params: ChatParams {
                tool_choice: Some(self.tool_choice.into()),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                ..Default::default()
            },
        })
    }
}

/// Resolves `host` (an IP literal or a host name such as `localhost`) to
/// the first socket address it names.
fn resolve_bind(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("invalid bind address {host}"))?
        .next()
        .with_context(|| format!("bind address {host} resolved to nothing"))
}
