//! Tool error type.

/// Error returned by a tool handler.
///
/// Never escapes the orchestration loop: a failing tool is answered with
/// the empty record and the loop continues.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    /// Human-readable error description.
    pub message: String,
}

impl ToolError {
    /// Creates a new tool error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A required argument was absent or not a string.
    pub fn missing_argument(name: &str) -> Self {
        Self::new(format!("missing required argument '{name}'"))
    }
}
