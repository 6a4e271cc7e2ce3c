//! Tool loop configuration, state, and result types.

use std::time::Duration;

use crate::chat::{ChatMessage, ChatResponse};
use crate::usage::Usage;

use super::execution::ToolExecution;

/// Configuration for [`tool_loop`](super::tool_loop).
///
/// ```rust
/// use persona_chat::tool::ToolLoopConfig;
/// use std::time::Duration;
///
/// let config = ToolLoopConfig {
///     max_iterations: 4,
///     tool_timeout: Some(Duration::from_secs(5)),
///     ..Default::default()
/// };
/// assert!(!config.parallel_tool_execution);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLoopConfig {
    /// Maximum number of model calls in one turn. Default: 10.
    ///
    /// A model that is still asking for tools when the bound is reached
    /// ends the turn with
    /// [`LlmError::MaxIterationsExceeded`](crate::LlmError::MaxIterationsExceeded).
    pub max_iterations: u32,
    /// Deadline for each model call. Default: 60 s.
    pub model_timeout: Option<Duration>,
    /// Deadline for each tool invocation. Default: 15 s.
    ///
    /// An expired tool is answered with the empty record; the turn goes on.
    pub tool_timeout: Option<Duration>,
    /// Run the tools of one batch concurrently. Default: false.
    ///
    /// Results are appended in request order either way.
    pub parallel_tool_execution: bool,
}

impl Default for ToolLoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model_timeout: Some(Duration::from_secs(60)),
            tool_timeout: Some(Duration::from_secs(15)),
            parallel_tool_execution: false,
        }
    }
}

/// Where the loop is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the next model response.
    AwaitingModel,
    /// The last response asked for tools; they are being run.
    HandlingToolCalls,
    /// A final response has been received.
    Done,
}

/// The result of a completed tool loop.
#[derive(Debug, Clone)]
pub struct ToolLoopResult {
    /// The final model response.
    pub response: ChatResponse,
    /// The full working sequence sent on the last model call: system
    /// prompt, history, user message, and every assistant/tool exchange.
    pub messages: Vec<ChatMessage>,
    /// How many model calls were made.
    pub iterations: u32,
    /// Usage summed across every model call.
    pub total_usage: Usage,
    /// One entry per tool request handled, in the order they were answered.
    pub tool_executions: Vec<ToolExecution>,
}

impl ToolLoopResult {
    /// The final reply text, or an empty string if the model sent none.
    pub fn reply(&self) -> &str {
        self.response.text().unwrap_or_default()
    }
}
