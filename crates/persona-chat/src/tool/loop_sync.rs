//! Runs a whole turn to completion.

use tracing::instrument;

use crate::error::LlmError;
use crate::provider::{ChatParams, DynProvider};

use super::ToolRegistry;
use super::config::{LoopState, ToolLoopConfig, ToolLoopResult};
use super::loop_core::LoopCore;

/// Runs the model in a tool-calling loop until it produces a final answer.
///
/// Each iteration:
/// 1. Calls the provider with the working sequence and the registry's
///    declarations (overwriting `params.tools`)
/// 2. If the response asks for tools, appends the assistant message, then
///    one `tool` message per request, in request order
/// 3. Repeats until a response comes back without tool requests
///
/// `params.messages` must already hold the system prompt, history and
/// the new user message; see [`build_messages`](crate::context::build_messages).
///
/// # Errors
///
/// - Any provider error, unchanged
/// - [`LlmError::Timeout`] when a model call misses `config.model_timeout`
/// - [`LlmError::MaxIterationsExceeded`] when the model is still asking
///   for tools after `config.max_iterations` calls
///
/// Tool failures are never errors here; they are recorded on the result's
/// [`tool_executions`](ToolLoopResult::tool_executions).
#[instrument(skip_all, fields(max_iterations = config.max_iterations, tools = registry.len()))]
pub async fn tool_loop(
    provider: &dyn DynProvider,
    registry: &ToolRegistry,
    mut params: ChatParams,
    config: ToolLoopConfig,
) -> Result<ToolLoopResult, LlmError> {
    let declarations = registry.declare();
    params.tools = (!declarations.is_empty()).then_some(declarations);

    let mut core = LoopCore::new(params, config);
    while core.state() != LoopState::Done {
        core.step(provider, registry).await?;
    }
    Ok(core.into_result())
}
