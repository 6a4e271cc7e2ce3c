//! Owner notifications.
//!
//! Tools report what they record through a [`Notifier`]. In production
//! that is [`PushoverNotifier`]; without credentials the server falls back
//! to [`LogNotifier`].

use std::future::Future;
use std::pin::Pin;

use persona_chat::tool::ToolError;
use tracing::{info, instrument};

use crate::config::PushoverCredentials;

/// Default Pushover message endpoint.
pub const PUSHOVER_URL: &str = "https://api.pushover.net/1/messages.json";

/// Delivers a short text message to the site owner.
pub trait Notifier: Send + Sync {
    /// Sends `text`. A delivery failure is reported as a [`ToolError`].
    fn notify<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), ToolError>> + Send + 'a>>;
}

/// Sends notifications through the Pushover messages API.
#[derive(Debug, Clone)]
pub struct PushoverNotifier {
    client: reqwest::Client,
    credentials: PushoverCredentials,
    endpoint: String,
}

impl PushoverNotifier {
    /// Creates a notifier posting to [`PUSHOVER_URL`].
    pub fn new(client: reqwest::Client, credentials: PushoverCredentials) -> Self {
        Self {
            client,
            credentials,
            endpoint: PUSHOVER_URL.into(),
        }
    }

    /// Overrides the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[instrument(skip_all)]
    async fn send(&self, text: &str) -> Result<(), ToolError> {
        let form = [
            ("token", self.credentials.token.as_str()),
            ("user", self.credentials.user.as_str()),
            ("message", text),
        ];
        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| ToolError::new(format!("pushover request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::new(format!(
                "pushover returned {status}: {body}"
            )));
        }
        Ok(())
    }
}

impl Notifier for PushoverNotifier {
    fn notify<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), ToolError>> + Send + 'a>> {
        Box::pin(self.send(text))
    }
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), ToolError>> + Send + 'a>> {
        Box::pin(async move {
            info!(message = text, "notification");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Form, Router};

    use super::*;

    type Captured = Arc<Mutex<Vec<Vec<(String, String)>>>>;

    async fn spawn_pushover(status: StatusCode) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route(
                "/1/messages.json",
                post(
                    move |State(c): State<Captured>, Form(form): Form<Vec<(String, String)>>| async move {
                        c.lock().unwrap().push(form);
                        status
                    },
                ),
            )
            .with_state(captured.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/1/messages.json"), captured)
    }

    fn notifier(endpoint: String) -> PushoverNotifier {
        PushoverNotifier::new(
            reqwest::Client::new(),
            PushoverCredentials {
                token: "app-token".into(),
                user: "user-key".into(),
            },
        )
        .with_endpoint(endpoint)
    }

    #[tokio::test]
    async fn test_pushover_posts_form() {
        let (url, captured) = spawn_pushover(StatusCode::OK).await;
        notifier(url)
            .notify("Recording What's your favourite colour?")
            .await
            .unwrap();

        let forms = captured.lock().unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(
            forms[0],
            vec![
                ("token".to_owned(), "app-token".to_owned()),
                ("user".to_owned(), "user-key".to_owned()),
                (
                    "message".to_owned(),
                    "Recording What's your favourite colour?".to_owned()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_pushover_error_status_is_tool_error() {
        let (url, _captured) = spawn_pushover(StatusCode::BAD_REQUEST).await;
        let err = notifier(url).notify("hi").await.unwrap_err();
        assert!(err.message.contains("400"));
    }

    #[tokio::test]
    async fn test_pushover_unreachable_is_tool_error() {
        let err = notifier("http://127.0.0.1:9/1/messages.json".into())
            .notify("hi")
            .await
            .unwrap_err();
        assert!(err.message.starts_with("pushover request failed"));
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        assert!(LogNotifier.notify("anything").await.is_ok());
    }

    #[test]
    fn test_default_endpoint() {
        let n = PushoverNotifier::new(
            reqwest::Client::new(),
            PushoverCredentials {
                token: String::new(),
                user: String::new(),
            },
        );
        assert_eq!(n.endpoint, PUSHOVER_URL);
    }
}
