//! Provider module for modechat
//!
//! This module contains the completion provider abstraction and its
//! implementations for OpenAI-compatible APIs and Ollama.

pub mod base;
pub mod ollama;
pub mod openai;

pub use base::{
    CompletionOptions, CompletionResponse, Message, Provider, Role, TokenUsage,
};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::{ChatError, Result};

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `provider_type` - Type of provider ("openai" or "ollama")
/// * `config` - Provider configuration
///
/// # Errors
///
/// Returns error if provider type is invalid or initialization fails
pub fn create_provider(provider_type: &str, config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match provider_type {
        "openai" => Ok(Box::new(OpenAiProvider::new(config.openai.clone())?)),
        "ollama" => Ok(Box::new(OllamaProvider::new(config.ollama.clone())?)),
        _ => Err(ChatError::Provider(format!("Unknown provider type: {}", provider_type)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OllamaConfig, OpenAiConfig};

    fn provider_config() -> ProviderConfig {
        ProviderConfig {
            provider_type: "openai".to_string(),
            openai: OpenAiConfig {
                api_key: Some("sk-test".to_string()),
                ..Default::default()
            },
            ollama: OllamaConfig::default(),
        }
    }

    #[test]
    fn test_create_provider_by_type() {
        let config = provider_config();
        assert_eq!(create_provider("openai", &config).unwrap().name(), "openai");
        assert_eq!(create_provider("ollama", &config).unwrap().name(), "ollama");
    }

    #[test]
    fn test_create_provider_unknown_type() {
        let result = create_provider("claude-local", &provider_config());
        assert!(result.is_err());
    }
}
