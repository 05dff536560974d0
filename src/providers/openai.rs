//! OpenAI-compatible chat completions provider
//!
//! Sends the conversation to `{api_base}/chat/completions` with a bearer key.
//! Any server speaking the same protocol (OpenAI, Azure-style gateways, local
//! proxies) can be used by changing `api_base`.

use crate::config::OpenAiConfig;
use crate::error::{ChatError, Result};
use crate::providers::{
    CompletionOptions, CompletionResponse, Message, Provider, Role, TokenUsage,
};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI chat completions provider
///
/// # Examples
///
/// ```no_run
/// use modechat::config::OpenAiConfig;
/// use modechat::providers::{CompletionOptions, Message, OpenAiProvider, Provider};
///
/// # async fn example() -> modechat::error::Result<()> {
/// let config = OpenAiConfig {
///     api_key: Some("sk-...".to_string()),
///     ..Default::default()
/// };
/// let provider = OpenAiProvider::new(config)?;
/// let reply = provider
///     .complete(&[Message::user("Hello!")], &CompletionOptions::default())
///     .await?;
/// println!("{}", reply.message.content);
/// # Ok(())
/// # }
/// ```
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
    api_key: Option<String>,
}

/// Request body for `/chat/completions`
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

/// Response body from `/chat/completions`
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

fn format_api_error(status: reqwest::StatusCode, body: &str) -> ChatError {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        ChatError::MissingCredentials(format!(
            "openai returned {}: {}. Check OPENAI_API_KEY",
            status, body
        ))
    } else {
        ChatError::Provider(format!("OpenAI returned error {}: {}", status, body))
    }
}

impl OpenAiProvider {
    /// Create a new OpenAI provider instance
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built. A missing API key is
    /// only reported when a completion is requested.
    ///
    /// # Examples
    ///
    /// ```
    /// use modechat::config::OpenAiConfig;
    /// use modechat::providers::OpenAiProvider;
    ///
    /// let config = OpenAiConfig {
    ///     api_key: Some("sk-test".to_string()),
    ///     ..Default::default()
    /// };
    /// assert!(OpenAiProvider::new(config).is_ok());
    /// assert!(OpenAiProvider::new(OpenAiConfig::default()).is_ok());
    /// ```
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("No OpenAI API key configured; replies will use the local fallback");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("modechat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChatError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "OpenAI client initialized with model '{}' at {}",
            config.model,
            config.api_base
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ChatError::MissingCredentials("openai".to_string()))?;

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        tracing::debug!("Sending OpenAI request: {} messages", messages.len());

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAI request failed: {}", e);
                ChatError::Provider(format!("OpenAI request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI returned error {}: {}", status, error_text);
            return Err(format_api_error(status, &error_text).into());
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse OpenAI response: {}", e);
            ChatError::Provider(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::Provider("No choices in OpenAI response".to_string()))?;

        let message = Message {
            role: Role::Assistant,
            content: choice.message.content.unwrap_or_default().trim().to_string(),
        };

        let usage = body
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));

        Ok(match usage {
            Some(u) => CompletionResponse::with_usage(message, u),
            None => CompletionResponse::new(message),
        })
    }

    fn get_current_model(&self) -> Result<String> {
        Ok(self.config.model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> OpenAiConfig {
        OpenAiConfig {
            model: "gpt-4o-mini".to_string(),
            api_base: "http://localhost:9999/v1/".to_string(),
            api_key: Some("sk-test".to_string()),
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_at_completion() {
        let mut config = test_config();
        config.api_key = None;
        let provider = OpenAiProvider::new(config.clone()).unwrap();
        let err = provider
            .complete(&[Message::user("Hi")], &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatError>(),
            Some(ChatError::MissingCredentials(_))
        ));

        config.api_key = Some("  ".to_string());
        let provider = OpenAiProvider::new(config).unwrap();
        assert!(provider
            .complete(&[Message::user("Hi")], &CompletionOptions::default())
            .await
            .is_err());
    }

    #[test]
    fn test_completions_url_strips_trailing_slash() {
        let provider = OpenAiProvider::new(test_config()).unwrap();
        assert_eq!(
            provider.completions_url(),
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn test_current_model() {
        let provider = OpenAiProvider::new(test_config()).unwrap();
        assert_eq!(provider.get_current_model().unwrap(), "gpt-4o-mini");
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![Message::system("Be brief"), Message::user("Hi")];
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 0.3,
            max_tokens: 600,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 600);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Hi");
    }

    #[test]
    fn test_response_deserialization_with_null_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn test_unauthorized_maps_to_missing_credentials() {
        let err = format_api_error(reqwest::StatusCode::UNAUTHORIZED, "bad key");
        assert!(matches!(err, ChatError::MissingCredentials(_)));

        let err = format_api_error(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, ChatError::Provider(_)));
    }
}
