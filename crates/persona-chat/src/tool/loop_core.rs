//! The iteration engine behind [`tool_loop`](super::tool_loop).
//!
//! `LoopCore` owns the working sequence for one turn and advances a
//! three-state machine:
//!
//! ```text
//!   AwaitingModel ──(final response)──────────▶ Done
//!        ▲    │
//!        │    └──(tool requests)──▶ HandlingToolCalls
//!        └─────────────(results appended)────────┘
//! ```
//!
//! The provider and registry are passed by reference to [`step`](LoopCore::step)
//! so the core has no opinion on how they are owned.

use tracing::debug;

use crate::chat::ChatResponse;
use crate::error::LlmError;
use crate::provider::{ChatParams, DynProvider};
use crate::usage::Usage;

use super::ToolRegistry;
use super::config::{LoopState, ToolLoopConfig, ToolLoopResult};
use super::execution::{ToolExecution, execute_batch};

// ── LoopCore ────────────────────────────────────────────────────────

pub(crate) struct LoopCore {
    params: ChatParams,
    config: ToolLoopConfig,
    state: LoopState,
    iterations: u32,
    total_usage: Usage,
    pending: Option<ChatResponse>,
    executions: Vec<ToolExecution>,
}

impl LoopCore {
    pub(crate) fn new(params: ChatParams, config: ToolLoopConfig) -> Self {
        Self {
            params,
            config,
            state: LoopState::AwaitingModel,
            iterations: 0,
            total_usage: Usage::default(),
            pending: None,
            executions: Vec::new(),
        }
    }

    pub(crate) fn state(&self) -> LoopState {
        self.state
    }

    /// Advances the machine by one transition.
    ///
    /// Errors are terminal: the caller must not step again after one.
    pub(crate) async fn step(
        &mut self,
        provider: &dyn DynProvider,
        registry: &ToolRegistry,
    ) -> Result<LoopState, LlmError> {
        match self.state {
            LoopState::AwaitingModel => self.await_model(provider).await?,
            LoopState::HandlingToolCalls => self.handle_tool_calls(registry).await,
            LoopState::Done => {}
        }
        Ok(self.state)
    }

    // ── AwaitingModel ───────────────────────────────────────────

    async fn await_model(&mut self, provider: &dyn DynProvider) -> Result<(), LlmError> {
        if self.iterations >= self.config.max_iterations {
            return Err(LlmError::MaxIterationsExceeded {
                limit: self.config.max_iterations,
            });
        }
        self.iterations += 1;
        debug!(
            iteration = self.iterations,
            messages = self.params.messages.len(),
            "calling model"
        );

        let fut = provider.generate_boxed(&self.params);
        let response = match self.config.model_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| LlmError::timeout(limit))??,
            None => fut.await?,
        };
        self.total_usage += &response.usage;

        self.state = if response.wants_tools() {
            LoopState::HandlingToolCalls
        } else {
            LoopState::Done
        };
        self.pending = Some(response);
        Ok(())
    }

    // ── HandlingToolCalls ───────────────────────────────────────

    async fn handle_tool_calls(&mut self, registry: &ToolRegistry) {
        let Some(response) = self.pending.take() else {
            self.state = LoopState::AwaitingModel;
            return;
        };

        let assistant = response.into_assistant_message();
        let calls: Vec<_> = assistant.tool_calls().into_iter().cloned().collect();
        debug!(count = calls.len(), "handling tool requests");

        self.params.messages.push(assistant);
        let executions = execute_batch(registry, &calls, &self.config).await;
        self.params
            .messages
            .extend(executions.iter().map(ToolExecution::to_message));
        self.executions.extend(executions);

        self.state = LoopState::AwaitingModel;
    }

    // ── Result ──────────────────────────────────────────────────

    pub(crate) fn into_result(self) -> ToolLoopResult {
        ToolLoopResult {
            response: self.pending.unwrap_or_default(),
            messages: self.params.messages,
            iterations: self.iterations,
            total_usage: self.total_usage,
            tool_executions: self.executions,
        }
    }

    #[cfg(test)]
    pub(crate) fn messages(&self) -> &[crate::chat::ChatMessage] {
        &self.params.messages
    }
}

impl std::fmt::Debug for LoopCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopCore")
            .field("state", &self.state)
            .field("iterations", &self.iterations)
            .field("tool_executions", &self.executions.len())
            .finish_non_exhaustive()
    }
}
