//! The two tools the assistant may call.
//!
//! Both forward a one-line summary to the site owner through a
//! [`Notifier`] and answer `{"recorded": true}`.

use std::sync::Arc;

use persona_chat::tool::{ToolError, tool_fn};
use persona_chat::{JsonSchema, ToolDefinition, ToolRegistry};
use serde_json::{Value, json};

use crate::notify::Notifier;

/// Name of the contact-capture tool.
pub const RECORD_USER_DETAILS: &str = "record_user_details";
/// Name of the unanswered-question tool.
pub const RECORD_UNKNOWN_QUESTION: &str = "record_unknown_question";

const DEFAULT_NAME: &str = "Name not provided";
const DEFAULT_NOTES: &str = "not provided";

/// Builds a registry holding both tools, sharing one notifier.
pub fn registry(notifier: Arc<dyn Notifier>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register(tool_fn(record_user_details_definition(), {
            let notifier = Arc::clone(&notifier);
            move |args| {
                let notifier = Arc::clone(&notifier);
                async move { record_user_details(notifier.as_ref(), &args).await }
            }
        }))
        .register(tool_fn(record_unknown_question_definition(), move |args| {
            let notifier = Arc::clone(&notifier);
            async move { record_unknown_question(notifier.as_ref(), &args).await }
        }));
    registry
}

fn record_user_details_definition() -> ToolDefinition {
    ToolDefinition {
        name: RECORD_USER_DETAILS.into(),
        description: "Use this tool to record that a user is interested in being in touch \
                      and provided an email address"
            .into(),
        parameters: JsonSchema::new(json!({
            "type": "object",
            "properties": {
                "email": {
                    "type": "string",
                    "description": "The email address of this user"
                },
                "name": {
                    "type": "string",
                    "description": "The user's name, if they provided it"
                },
                "notes": {
                    "type": "string",
                    "description": "Any additional information about the conversation that's worth recording to give context"
                }
            },
            "required": ["email"],
            "additionalProperties": false
        })),
    }
}

fn record_unknown_question_definition() -> ToolDefinition {
    ToolDefinition {
        name: RECORD_UNKNOWN_QUESTION.into(),
        description: "Always use this tool to record any question that couldn't be answered \
                      as you didn't know the answer"
            .into(),
        parameters: JsonSchema::new(json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question that couldn't be answered"
                }
            },
            "required": ["question"],
            "additionalProperties": false
        })),
    }
}

/// A non-blank string argument, trimmed.
fn string_arg<'a>(args: &'a Value, name: &str) -> Option<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

async fn record_user_details(notifier: &dyn Notifier, args: &Value) -> Result<Value, ToolError> {
    let email = string_arg(args, "email").ok_or_else(|| ToolError::missing_argument("email"))?;
    let name = string_arg(args, "name").unwrap_or(DEFAULT_NAME);
    let notes = string_arg(args, "notes").unwrap_or(DEFAULT_NOTES);

    notifier
        .notify(&format!(
            "Recording {name} with email {email} and notes {notes}"
        ))
        .await?;
    Ok(json!({"recorded": true}))
}

async fn record_unknown_question(
    notifier: &dyn Notifier,
    args: &Value,
) -> Result<Value, ToolError> {
    let question =
        string_arg(args, "question").ok_or_else(|| ToolError::missing_argument("question"))?;

    notifier.notify(&format!("Recording {question}")).await?;
    Ok(json!({"recorded": true}))
}
