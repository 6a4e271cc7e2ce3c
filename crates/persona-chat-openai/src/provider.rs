//! `OpenAI` `Provider` implementation.

use persona_chat::ChatResponse;
use persona_chat::error::LlmError;
use persona_chat::provider::{ChatParams, Provider, ProviderMetadata};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use crate::config::OpenAiConfig;
use crate::convert;

/// `OpenAI` provider implementing [`Provider`] over the Chat Completions API.
///
/// # Example
///
/// ```rust,no_run
/// use persona_chat_openai::{OpenAiConfig, OpenAiProvider};
/// use persona_chat::{ChatParams, ChatMessage, Provider};
///
/// # async fn example() -> Result<(), persona_chat::LlmError> {
/// let provider = OpenAiProvider::new(OpenAiConfig {
///     api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
///     ..Default::default()
/// })?;
///
/// let response = provider.generate(&ChatParams {
///     messages: vec![ChatMessage::user("Hello!")],
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a provider from configuration.
    ///
    /// If `config.client` is `Some`, that client is reused. Otherwise a new
    /// client is built with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::InvalidRequest`] if the HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let client = match config.client.clone() {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = config.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(|e| {
                    LlmError::InvalidRequest(format!("failed to build HTTP client: {e}"))
                })?
            }
        };
        Ok(Self { config, client })
    }

    fn default_headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", self.config.api_key);
        headers.insert(
            "authorization",
            HeaderValue::from_str(&auth_value)
                .map_err(|_| LlmError::Auth("API key contains invalid header characters".into()))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        if let Some(org) = &self.config.organization {
            headers.insert(
                "openai-organization",
                HeaderValue::from_str(org).map_err(|_| {
                    LlmError::InvalidRequest(
                        "Organization ID contains invalid header characters".into(),
                    )
                })?,
            );
        }

        Ok(headers)
    }

    fn completions_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    async fn send_request(&self, params: &ChatParams) -> Result<reqwest::Response, LlmError> {
        let request_body = convert::build_request(params, &self.config);

        let mut req = self
            .client
            .post(self.completions_url())
            .headers(self.default_headers()?)
            .json(&request_body);

        if let Some(timeout) = params.timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout {
                    elapsed_ms: params
                        .timeout
                        .or(self.config.timeout)
                        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
                }
            } else {
                LlmError::Http {
                    status: e.status().map(|s| {
                        http::StatusCode::from_u16(s.as_u16())
                            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
                    }),
                    message: e.to_string(),
                    retryable: e.is_connect(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let http_status = http::StatusCode::from_u16(status.as_u16())
                .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
            return Err(convert::convert_error(http_status, &body));
        }

        Ok(response)
    }
}

impl Provider for OpenAiProvider {
    #[instrument(skip_all, fields(model = %self.config.model, messages = params.messages.len()))]
    async fn generate(&self, params: &ChatParams) -> Result<ChatResponse, LlmError> {
        let response = self.send_request(params).await?;

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::ResponseFormat {
                message: format!("Failed to read OpenAI response body: {e}"),
                raw: String::new(),
            })?;

        let api_response: crate::types::Response =
            serde_json::from_str(&body).map_err(|e| LlmError::ResponseFormat {
                message: format!("Failed to parse OpenAI response: {e}"),
                raw: body,
            })?;

        let response = convert::convert_response(api_response);
        debug!(
            stop_reason = ?response.stop_reason,
            tool_calls = response.tool_calls().len(),
            "OpenAI response"
        );
        Ok(response)
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "openai".into(),
            model: self.config.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn provider(config: OpenAiConfig) -> OpenAiProvider {
        OpenAiProvider::new(config).unwrap()
    }

    #[test]
    fn test_metadata() {
        let meta = Provider::metadata(&provider(OpenAiConfig {
            model: "gpt-4o".into(),
            ..Default::default()
        }));
        assert_eq!(meta.name, "openai");
        assert_eq!(meta.model, "gpt-4o");
    }

    #[test]
    fn test_completions_url() {
        let p = provider(OpenAiConfig::default());
        assert_eq!(
            p.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_completions_url_trailing_slash() {
        let p = provider(OpenAiConfig {
            base_url: "https://proxy.example.com/v1/".into(),
            ..Default::default()
        });
        assert_eq!(
            p.completions_url(),
            "https://proxy.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_headers() {
        let p = provider(OpenAiConfig {
            api_key: "sk-test123".into(),
            ..Default::default()
        });
        let headers = p.default_headers().unwrap();
        assert_eq!(headers.get("authorization").unwrap(), "Bearer sk-test123");
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert!(headers.get("openai-organization").is_none());
    }

    #[test]
    fn test_default_headers_with_org() {
        let p = provider(OpenAiConfig {
            api_key: "sk-test123".into(),
            organization: Some("org-abc".into()),
            ..Default::default()
        });
        let headers = p.default_headers().unwrap();
        assert_eq!(headers.get("openai-organization").unwrap(), "org-abc");
    }

    #[test]
    fn test_default_headers_invalid_key() {
        let p = provider(OpenAiConfig {
            api_key: "invalid\nkey".into(),
            ..Default::default()
        });
        assert!(matches!(p.default_headers().unwrap_err(), LlmError::Auth(_)));
    }

    #[test]
    fn test_new_with_custom_client() {
        let custom_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        let p = provider(OpenAiConfig {
            client: Some(custom_client),
            ..Default::default()
        });
        assert_eq!(Provider::metadata(&p).name, "openai");
    }

    #[test]
    fn test_new_with_timeout() {
        let p = OpenAiProvider::new(OpenAiConfig {
            timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        });
        assert!(p.is_ok());
    }
}
