//! Running one batch of tool requests.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde_json::Value;
use tracing::{info, warn};

use crate::chat::{ChatMessage, ToolCall};

use super::ToolRegistry;
use super::config::ToolLoopConfig;
use super::encoder::{empty_result, encode};

/// How a single tool request was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// The handler returned a result record.
    Completed,
    /// No tool with the requested name is registered.
    UnknownTool,
    /// The handler returned an error or panicked.
    Failed(String),
    /// The handler did not finish before the tool deadline.
    TimedOut(Duration),
}

/// Record of one handled tool request.
#[derive(Debug, Clone)]
pub struct ToolExecution {
    /// The request id, echoed on the `tool` message.
    pub call_id: String,
    /// The requested tool name.
    pub tool_name: String,
    /// How the request was resolved.
    pub outcome: ToolOutcome,
    /// Set when the arguments did not parse as a JSON object; holds the
    /// parse error. The tool still ran, with empty arguments.
    pub malformed_arguments: Option<String>,
    /// The record that was encoded into the `tool` message.
    pub result: Value,
    /// Wall-clock time spent in the handler.
    pub duration: Duration,
}

/// Parses raw tool-call arguments into a JSON object.
///
/// Blank input counts as an empty object. Anything that is not a JSON
/// object is rejected with a description of the problem.
pub fn parse_arguments(raw: &str) -> Result<Value, String> {
    if raw.trim().is_empty() {
        return Ok(empty_result());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Executes every request of a batch and returns one record per request,
/// in request order.
///
/// When `config.parallel_tool_execution` is set the handlers run
/// concurrently via `futures::future::join_all`, which still yields
/// results in input order.
pub(crate) async fn execute_batch(
    registry: &ToolRegistry,
    calls: &[ToolCall],
    config: &ToolLoopConfig,
) -> Vec<ToolExecution> {
    if config.parallel_tool_execution && calls.len() > 1 {
        let futures: Vec<_> = calls
            .iter()
            .map(|call| execute_one(registry, call, config.tool_timeout))
            .collect();
        return futures::future::join_all(futures).await;
    }

    let mut executions = Vec::with_capacity(calls.len());
    for call in calls {
        executions.push(execute_one(registry, call, config.tool_timeout).await);
    }
    executions
}

async fn execute_one(
    registry: &ToolRegistry,
    call: &ToolCall,
    timeout: Option<Duration>,
) -> ToolExecution {
    info!(tool = %call.name, call_id = %call.id, "Tool called");

    let (arguments, malformed_arguments) = match parse_arguments(&call.arguments) {
        Ok(args) => (args, None),
        Err(reason) => {
            warn!(
                tool = %call.name,
                call_id = %call.id,
                error = %reason,
                "malformed tool arguments, invoking with empty arguments"
            );
            (empty_result(), Some(reason))
        }
    };

    let start = Instant::now();
    let (outcome, result) = match registry.resolve(&call.name) {
        None => {
            warn!(tool = %call.name, call_id = %call.id, "model requested an unknown tool");
            (ToolOutcome::UnknownTool, empty_result())
        }
        Some(handler) => {
            let fut =
                AssertUnwindSafe(async move { handler.execute(arguments).await }).catch_unwind();
            let finished = match timeout {
                Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| limit),
                None => Ok(fut.await),
            };
            match finished {
                Ok(Ok(Ok(value))) => (ToolOutcome::Completed, value),
                Ok(Ok(Err(e))) => {
                    warn!(tool = %call.name, call_id = %call.id, error = %e, "tool failed");
                    (ToolOutcome::Failed(e.message), empty_result())
                }
                Ok(Err(payload)) => {
                    let reason = panic_message(payload.as_ref());
                    warn!(tool = %call.name, call_id = %call.id, panic = %reason, "tool panicked");
                    (
                        ToolOutcome::Failed(format!("tool panicked: {reason}")),
                        empty_result(),
                    )
                }
                Err(limit) => {
                    warn!(tool = %call.name, call_id = %call.id, ?limit, "tool timed out");
                    (ToolOutcome::TimedOut(limit), empty_result())
                }
            }
        }
    };

    ToolExecution {
        call_id: call.id.clone(),
        tool_name: call.name.clone(),
        outcome,
        malformed_arguments,
        result,
        duration: start.elapsed(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

impl ToolExecution {
    /// The `tool` message answering this request.
    pub fn to_message(&self) -> ChatMessage {
        encode(&self.call_id, &self.result)
    }
}
