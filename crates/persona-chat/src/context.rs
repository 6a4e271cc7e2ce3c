//! Building the working sequence for a turn.
//!
//! The model sees, in order: one system prompt, the visitor's prior
//! history verbatim, and the new user message. The history belongs to the
//! caller and is only ever borrowed here.
//!
//! ```rust
//! use persona_chat::context::build_messages;
//! use persona_chat::{ChatMessage, ChatRole};
//!
//! let history = vec![
//!     ChatMessage::user("Hi"),
//!     ChatMessage::assistant("Hello! Ask me anything about my work."),
//! ];
//! let messages = build_messages("You are acting as Rohit.", &history, "What do you do?");
//!
//! assert_eq!(messages.len(), 4);
//! assert_eq!(messages[0].role, ChatRole::System);
//! assert_eq!(messages[3].text(), Some("What do you do?"));
//! ```

use std::collections::HashSet;

use crate::chat::{ChatMessage, ChatRole};
use crate::error::LlmError;

/// Assembles `[system, ...history, user]`.
///
/// Pure: `history` is cloned into the result and left untouched.
pub fn build_messages(
    system_prompt: &str,
    history: &[ChatMessage],
    user_message: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend_from_slice(history);
    messages.push(ChatMessage::user(user_message));
    messages
}

/// Checks caller-supplied history against the conversation invariants.
///
/// Rejects a `system` message anywhere in the history, a `tool` message
/// that does not answer a pending request of the assistant message just
/// before it, and assistant tool requests left unanswered.
pub fn validate_history(history: &[ChatMessage]) -> Result<(), LlmError> {
    let mut pending: HashSet<&str> = HashSet::new();

    for (index, message) in history.iter().enumerate() {
        match message.role {
            ChatRole::System => {
                return Err(LlmError::InvalidRequest(format!(
                    "history[{index}]: system messages are not allowed in history"
                )));
            }
            ChatRole::Tool => {
                let id = message.tool_call_id().ok_or_else(|| {
                    LlmError::InvalidRequest(format!(
                        "history[{index}]: tool message has no tool_call_id"
                    ))
                })?;
                if !pending.remove(id) {
                    return Err(LlmError::InvalidRequest(format!(
                        "history[{index}]: tool message answers unknown request '{id}'"
                    )));
                }
            }
            ChatRole::User | ChatRole::Assistant => {
                if !pending.is_empty() {
                    return Err(unanswered(index, &pending));
                }
                if message.role == ChatRole::Assistant {
                    pending.extend(message.tool_calls().into_iter().map(|c| c.id.as_str()));
                }
            }
        }
    }

    if pending.is_empty() {
        Ok(())
    } else {
        Err(unanswered(history.len(), &pending))
    }
}

fn unanswered(index: usize, pending: &HashSet<&str>) -> LlmError {
    let mut ids: Vec<&str> = pending.iter().copied().collect();
    ids.sort_unstable();
    LlmError::InvalidRequest(format!(
        "history[{index}]: tool requests without results: {}",
        ids.join(", ")
    ))
}

/// The history to hand back after a successful turn: the prior history
/// followed by the new user message and the final reply.
///
/// Intermediate tool exchanges are not included.
pub fn extend_history(history: &[ChatMessage], user_message: &str, reply: &str) -> Vec<ChatMessage> {
    let mut next = Vec::with_capacity(history.len() + 2);
    next.extend_from_slice(history);
    next.push(ChatMessage::user(user_message));
    next.push(ChatMessage::assistant(reply));
    next
}
