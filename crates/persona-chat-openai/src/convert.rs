//! Conversion between core types and `OpenAI` wire types.

use persona_chat::chat::{ChatMessage, ChatResponse, ChatRole, ContentBlock, StopReason, ToolCall};
use persona_chat::error::LlmError;
use persona_chat::provider::{ChatParams, ToolChoice};
use persona_chat::usage::Usage;
use serde_json::Value;

use crate::config::OpenAiConfig;
use crate::types::{
    ErrorResponse, FunctionCallRequest, FunctionDef, Message, Request, Tool, ToolCallRequest,
};

// ── Request conversion ───────────────────────────────────────────────

/// Builds an `OpenAI` request body that borrows from `params`.
pub(crate) fn build_request<'a>(params: &'a ChatParams, config: &'a OpenAiConfig) -> Request<'a> {
    let tools = params.tools.as_ref().map(|tools| {
        tools
            .iter()
            .map(|t| Tool {
                tool_type: "function",
                function: FunctionDef {
                    name: &t.name,
                    description: &t.description,
                    parameters: t.parameters.as_value(),
                },
            })
            .collect()
    });

    Request {
        model: &config.model,
        messages: params.messages.iter().map(convert_message).collect(),
        temperature: params.temperature,
        max_completion_tokens: params.max_tokens,
        tools,
        tool_choice: params.tool_choice.as_ref().map(convert_tool_choice),
    }
}

fn convert_message(msg: &ChatMessage) -> Message<'_> {
    match msg.role {
        ChatRole::System | ChatRole::User => Message {
            role: if msg.role == ChatRole::System {
                "system"
            } else {
                "user"
            },
            content: Some(msg.text().unwrap_or_default()),
            tool_calls: None,
            tool_call_id: None,
        },
        ChatRole::Assistant => {
            let tool_calls: Vec<_> = msg
                .content
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolCall(call) => Some(ToolCallRequest {
                        id: &call.id,
                        call_type: "function",
                        function: FunctionCallRequest {
                            name: &call.name,
                            arguments: &call.arguments,
                        },
                    }),
                    _ => None,
                })
                .collect();
            Message {
                role: "assistant",
                content: msg.text(),
                tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                tool_call_id: None,
            }
        }
        ChatRole::Tool => {
            let result = msg.tool_result_block();
            Message {
                role: "tool",
                content: Some(result.map_or("", |r| r.content.as_str())),
                tool_calls: None,
                tool_call_id: result.map(|r| r.tool_call_id.as_str()),
            }
        }
    }
}

fn convert_tool_choice(choice: &ToolChoice) -> Value {
    match choice {
        ToolChoice::None => Value::String("none".into()),
        ToolChoice::Required => Value::String("required".into()),
        ToolChoice::Specific(name) => serde_json::json!({
            "type": "function",
            "function": { "name": name }
        }),
        _ => Value::String("auto".into()),
    }
}

// ── Response conversion ──────────────────────────────────────────────

/// Converts an `OpenAI` response into a [`ChatResponse`].
///
/// Tool-call arguments are passed through as the raw text the API sent.
pub(crate) fn convert_response(resp: crate::types::Response) -> ChatResponse {
    let choice = resp.choices.into_iter().next();
    let mut content = Vec::new();
    let mut finish_reason = None;

    if let Some(choice) = choice {
        if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
            content.push(ContentBlock::Text(text));
        }
        for tc in choice.message.tool_calls.unwrap_or_default() {
            content.push(ContentBlock::ToolCall(ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            }));
        }
        finish_reason = choice.finish_reason;
    }

    let usage = resp.usage.map_or_else(Usage::default, |u| Usage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });

    ChatResponse {
        content,
        usage,
        stop_reason: finish_reason
            .as_deref()
            .map_or(StopReason::EndTurn, convert_stop_reason),
        model: resp.model,
    }
}

/// Maps an `OpenAI` `finish_reason` to a [`StopReason`].
pub(crate) fn convert_stop_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::EndTurn,
        "tool_calls" | "function_call" => StopReason::ToolUse,
        "length" => StopReason::MaxTokens,
        "content_filter" => StopReason::ContentFilter,
        other => {
            tracing::warn!(finish_reason = other, "Unexpected OpenAI finish_reason");
            StopReason::Other(other.to_owned())
        }
    }
}

// ── Error conversion ─────────────────────────────────────────────────

/// Converts an HTTP status and error body into an [`LlmError`].
pub(crate) fn convert_error(status: http::StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map_or_else(|_| body.to_string(), |e| e.error.message);

    if status == http::StatusCode::UNAUTHORIZED || status == http::StatusCode::FORBIDDEN {
        return LlmError::Auth(message);
    }
    if status == http::StatusCode::BAD_REQUEST {
        return LlmError::InvalidRequest(message);
    }

    let retryable = matches!(status.as_u16(), 429 | 500 | 502 | 503);
    LlmError::Http {
        status: Some(status),
        message,
        retryable,
    }
}
