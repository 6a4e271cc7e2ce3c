//! Conversation messages, tool calls, and model responses.
//!
//! A conversation is an ordered `Vec<ChatMessage>`. Each message has a
//! [`ChatRole`] and one or more [`ContentBlock`]s. Order is significant:
//! providers replay the sequence verbatim, and a `tool` message is only
//! valid directly after the assistant message that requested it.
//!
//! ```text
//!   system      "You are acting as …"
//!   user        "What's the weather?"
//!   assistant   ToolCall { id: "call_1", name: "record_unknown_question", … }
//!   tool        ToolResult { tool_call_id: "call_1", content: "{\"recorded\":true}" }
//!   assistant   "I'm not able to answer that, but I've noted your question."
//! ```

use serde::{Deserialize, Serialize};

use crate::usage::Usage;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions for the model. Only the first message of a working
    /// sequence may carry this role.
    System,
    /// The visitor.
    User,
    /// The model.
    Assistant,
    /// A tool result answering an earlier assistant tool call.
    Tool,
}

/// One piece of a message's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text(String),
    /// A request from the model to invoke a tool.
    ToolCall(ToolCall),
    /// The encoded result of a tool invocation.
    ToolResult(ToolResult),
}

/// A model-issued request to invoke a named tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Backend-assigned identifier, unique within one model turn.
    pub id: String,
    /// Name of the registered tool to invoke.
    pub name: String,
    /// The arguments exactly as the backend serialized them.
    ///
    /// Kept as raw text so that a malformed payload reaches the
    /// orchestration loop instead of being silently dropped by the
    /// provider adapter.
    pub arguments: String,
}

/// The encoded output of a tool, tagged with the call it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The [`ToolCall::id`] this result answers.
    pub tool_call_id: String,
    /// Serialized result record.
    pub content: String,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: ChatRole,
    /// The message body.
    pub content: Vec<ContentBlock>,
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: vec![ContentBlock::Text(text.into())],
        }
    }

    /// Creates a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: vec![ContentBlock::Text(text.into())],
        }
    }

    /// Creates an assistant message with plain text.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: vec![ContentBlock::Text(text.into())],
        }
    }

    /// Creates a tool message answering `tool_call_id`.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: vec![ContentBlock::ToolResult(ToolResult {
                tool_call_id: tool_call_id.into(),
                content: content.into(),
            })],
        }
    }

    /// Returns the first text block, if any.
    pub fn text(&self) -> Option<&str> {
        first_text(&self.content)
    }

    /// Returns the tool calls carried by this message, in order.
    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        collect_tool_calls(&self.content)
    }

    /// Returns the id of the call this message answers, for `tool` messages.
    pub fn tool_call_id(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::ToolResult(result) => Some(result.tool_call_id.as_str()),
            _ => None,
        })
    }

    /// Returns the tool result carried by this message, if any.
    pub fn tool_result_block(&self) -> Option<&ToolResult> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::ToolResult(result) => Some(result),
            _ => None,
        })
    }
}

/// Why the model stopped generating (the backend's "finish reason").
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Normal completion.
    #[default]
    EndTurn,
    /// The model wants one or more tools called.
    ToolUse,
    /// The output hit the token limit.
    MaxTokens,
    /// The output was withheld by a content filter.
    ContentFilter,
    /// A reason this crate does not model explicitly.
    Other(String),
}

/// A complete response from one model call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Text and tool-call blocks, in the order the backend produced them.
    pub content: Vec<ContentBlock>,
    /// Token usage reported for this call.
    pub usage: Usage,
    /// The backend's finish reason.
    pub stop_reason: StopReason,
    /// The model that produced the response.
    pub model: String,
}

impl ChatResponse {
    /// An empty response with [`StopReason::EndTurn`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the first text block, if any.
    pub fn text(&self) -> Option<&str> {
        first_text(&self.content)
    }

    /// Returns the tool calls in this response, in order.
    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        collect_tool_calls(&self.content)
    }

    /// True when the finish reason asks for tools *and* at least one
    /// call is attached.
    ///
    /// A `ToolUse` finish reason with no calls, or calls attached to a
    /// normal completion, both count as a final answer.
    pub fn wants_tools(&self) -> bool {
        self.stop_reason == StopReason::ToolUse
            && self
                .content
                .iter()
                .any(|b| matches!(b, ContentBlock::ToolCall(_)))
    }

    /// Converts the response into the assistant message that is replayed
    /// to the backend on the next call.
    pub fn into_assistant_message(self) -> ChatMessage {
        ChatMessage {
            role: ChatRole::Assistant,
            content: self.content,
        }
    }
}

fn first_text(content: &[ContentBlock]) -> Option<&str> {
    content.iter().find_map(|block| match block {
        ContentBlock::Text(text) => Some(text.as_str()),
        _ => None,
    })
}

fn collect_tool_calls(content: &[ContentBlock]) -> Vec<&ToolCall> {
    content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ToolCall(call) => Some(call),
            _ => None,
        })
        .collect()
}
