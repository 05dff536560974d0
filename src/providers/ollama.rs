//! Ollama provider implementation for modechat
//!
//! This module implements the Provider trait for Ollama, connecting to a local
//! or remote Ollama server through its `/api/chat` endpoint.

use crate::config::OllamaConfig;
use crate::error::{ChatError, Result};
use crate::providers::{
    CompletionOptions, CompletionResponse, Message, Provider, Role, TokenUsage,
};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API provider
///
/// # Examples
///
/// ```no_run
/// use modechat::config::OllamaConfig;
/// use modechat::providers::{CompletionOptions, Message, OllamaProvider, Provider};
///
/// # async fn example() -> modechat::error::Result<()> {
/// let provider = OllamaProvider::new(OllamaConfig::default())?;
/// let completion = provider
///     .complete(&[Message::user("Hello!")], &CompletionOptions::default())
///     .await?;
/// println!("{}", completion.message.content);
/// # Ok(())
/// # }
/// ```
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: OllamaOptions,
}

/// Sampling options in Ollama's naming
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: usize,
    #[serde(default)]
    eval_count: usize,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use modechat::config::OllamaConfig;
    /// use modechat::providers::OllamaProvider;
    ///
    /// let provider = OllamaProvider::new(OllamaConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("modechat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChatError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Ollama provider: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Get the configured Ollama host
    pub fn host(&self) -> &str {
        &self.config.host
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));

        let request = OllamaRequest {
            model: &self.config.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        tracing::debug!("Sending Ollama request: {} messages", messages.len());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama request failed: {}", e);
                ChatError::Provider(format!("Ollama request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {}: {}", status, error_text);
            return Err(ChatError::Provider(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let ollama_response: OllamaResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Ollama response: {}", e);
            ChatError::Provider(format!("Failed to parse Ollama response: {}", e))
        })?;

        tracing::debug!(
            "Ollama response: done={}, prompt_tokens={}, completion_tokens={}",
            ollama_response.done,
            ollama_response.prompt_eval_count,
            ollama_response.eval_count
        );

        let message = Message {
            role: Role::Assistant,
            content: ollama_response.message.content.trim().to_string(),
        };

        let response = if ollama_response.prompt_eval_count > 0 || ollama_response.eval_count > 0 {
            let usage = TokenUsage::new(
                ollama_response.prompt_eval_count,
                ollama_response.eval_count,
            );
            CompletionResponse::with_usage(message, usage)
        } else {
            CompletionResponse::new(message)
        };

        Ok(response)
    }

    fn get_current_model(&self) -> Result<String> {
        Ok(self.config.model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let config = OllamaConfig {
            host: "http://localhost:11434".to_string(),
            model: "llama3.2:latest".to_string(),
        };
        let provider = OllamaProvider::new(config).unwrap();
        assert_eq!(provider.host(), "http://localhost:11434");
        assert_eq!(provider.get_current_model().unwrap(), "llama3.2:latest");
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_request_uses_ollama_option_names() {
        let messages = vec![Message::user("Hi")];
        let request = OllamaRequest {
            model: "llama3.2:latest",
            messages: &messages,
            stream: false,
            options: OllamaOptions {
                temperature: 0.5,
                num_predict: 128,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 128);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_without_counts_deserializes() {
        let body = r#"{"message":{"role":"assistant","content":" hello "},"done":true}"#;
        let parsed: OllamaResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.done);
        assert_eq!(parsed.eval_count, 0);
        assert_eq!(parsed.message.content, " hello ");
    }
}
