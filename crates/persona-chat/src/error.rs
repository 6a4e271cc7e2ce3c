//! Unified error type for a chat turn.
//!
//! Every provider maps its native errors into [`LlmError`], and the tool
//! loop adds its own terminal fault ([`LlmError::MaxIterationsExceeded`]).
//! Anything that reaches the caller of [`Chatbot::chat`](crate::Chatbot::chat)
//! is one of these variants; the caller decides what text to show the
//! visitor.
//!
//! Tool-level problems (unknown tool, malformed arguments, a failing tool)
//! are *not* represented here. They are absorbed by the loop and recorded
//! as a [`ToolOutcome`](crate::tool::ToolOutcome).
//!
//! # Retryability
//!
//! ```rust
//! use persona_chat::LlmError;
//!
//! fn should_retry(err: &LlmError) -> bool {
//!     match err {
//!         LlmError::Http { retryable, .. } => *retryable,
//!         LlmError::Provider { retryable, .. } => *retryable,
//!         LlmError::Timeout { .. } => true,
//!         _ => false,
//!     }
//! }
//! ```

/// The unified error type returned by providers and the tool loop.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    /// An HTTP-level failure (transport error, unexpected status code).
    ///
    /// `status` is `None` when the request never received a response
    /// (e.g. DNS failure, connection reset).
    #[error("HTTP error (status={status:?}): {message}")]
    Http {
        /// The HTTP status code, if one was received.
        status: Option<http::StatusCode>,
        /// A human-readable description of the failure.
        message: String,
        /// Whether the caller should retry this request.
        retryable: bool,
    },

    /// The API key or token was rejected.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The request was malformed (missing fields, invalid history).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A provider-specific error that doesn't map to another variant.
    #[error("Provider error ({code}): {message}")]
    Provider {
        /// Provider-defined error code (e.g. `"overloaded"`).
        code: String,
        /// Human-readable error description.
        message: String,
        /// Whether the caller should retry this request.
        retryable: bool,
    },

    /// The response body could not be parsed.
    #[error("Response format error: {message}")]
    ResponseFormat {
        /// What went wrong during parsing.
        message: String,
        /// The raw response body, for diagnostics.
        raw: String,
    },

    /// A model call exceeded its deadline.
    #[error("Operation timed out after {elapsed_ms}ms")]
    Timeout {
        /// Milliseconds elapsed before the timeout fired.
        elapsed_ms: u64,
    },

    /// The model kept requesting tools past the configured bound.
    #[error("tool loop did not finish within {limit} model calls")]
    MaxIterationsExceeded {
        /// The configured maximum number of model calls per turn.
        limit: u32,
    },
}

impl LlmError {
    /// Returns `true` if the error is transient and the request may succeed on retry.
    ///
    /// ```rust
    /// use persona_chat::LlmError;
    ///
    /// let err = LlmError::Timeout { elapsed_ms: 5000 };
    /// assert!(err.is_retryable());
    ///
    /// let err = LlmError::Auth("bad key".into());
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { retryable, .. } | Self::Provider { retryable, .. } => *retryable,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Builds a [`LlmError::Timeout`] from a [`Duration`](std::time::Duration).
    pub fn timeout(limit: std::time::Duration) -> Self {
        Self::Timeout {
            elapsed_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::ResponseFormat {
            message: err.to_string(),
            raw: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_error_display_http() {
        let err = LlmError::Http {
            status: Some(http::StatusCode::TOO_MANY_REQUESTS),
            message: "rate limited".into(),
            retryable: true,
        };
        let display = format!("{err}");
        assert!(display.contains("429"));
        assert!(display.contains("rate limited"));
    }

    #[test]
    fn test_error_display_auth() {
        let err = LlmError::Auth("bad key".into());
        assert!(format!("{err}").contains("bad key"));
    }

    #[test]
    fn test_error_display_provider() {
        let err = LlmError::Provider {
            code: "overloaded".into(),
            message: "server busy".into(),
            retryable: true,
        };
        let display = format!("{err}");
        assert!(display.contains("overloaded"));
        assert!(display.contains("server busy"));
    }

    #[test]
    fn test_error_display_max_iterations() {
        let err = LlmError::MaxIterationsExceeded { limit: 4 };
        assert!(format!("{err}").contains("4 model calls"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_timeout_from_duration() {
        let err = LlmError::timeout(Duration::from_millis(1500));
        assert!(matches!(err, LlmError::Timeout { elapsed_ms: 1500 }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_retryable_flags() {
        let err = LlmError::Http {
            status: None,
            message: "reset".into(),
            retryable: false,
        };
        assert!(!err.is_retryable());
        assert!(!LlmError::InvalidRequest("x".into()).is_retryable());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LlmError>();
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
        let llm_err: LlmError = json_err.into();
        assert!(matches!(llm_err, LlmError::ResponseFormat { .. }));
    }
}
