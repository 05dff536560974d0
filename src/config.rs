//! Configuration management for modechat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main configuration structure for modechat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Completion provider settings
    pub provider: ProviderConfig,
    /// Chat engine behavior
    #[serde(default)]
    pub engine: EngineConfig,
    /// Wikipedia lookup settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Provider configuration
///
/// Specifies which completion API to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use ("openai" or "ollama")
    #[serde(rename = "type")]
    pub provider_type: String,

    /// OpenAI-compatible chat completions configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Model to request
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// API base URL of any OpenAI-compatible endpoint; `/chat/completions`
    /// is appended
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// API key; falls back to `OPENAI_API_KEY` when unset
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            api_base: default_openai_api_base(),
            api_key: None,
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Chat engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of turns kept per session (and sent per request)
    #[serde(default = "default_memory_size")]
    pub memory_size: usize,

    /// Sampling temperature passed to the provider
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum completion tokens per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Run a Wikipedia lookup before answering in knowledge mode
    #[serde(default = "default_enable_knowledge_lookup")]
    pub enable_knowledge_lookup: bool,

    /// Per-mode system prompt overrides, keyed by mode name
    #[serde(default)]
    pub prompts: HashMap<String, String>,
}

fn default_memory_size() -> usize {
    40
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    600
}

fn default_enable_knowledge_lookup() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            memory_size: default_memory_size(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            enable_knowledge_lookup: default_enable_knowledge_lookup(),
            prompts: HashMap::new(),
        }
    }
}

/// Wikipedia lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Wikipedia site root (language edition)
    #[serde(default = "default_wikipedia_base")]
    pub api_base: String,

    /// Number of sentences kept from the article extract
    #[serde(default = "default_sentences")]
    pub sentences: usize,

    /// Timeout for each lookup request (seconds)
    #[serde(default = "default_knowledge_timeout")]
    pub timeout_seconds: u64,
}

fn default_wikipedia_base() -> String {
    "https://en.wikipedia.org".to_string()
}

fn default_sentences() -> usize {
    4
}

fn default_knowledge_timeout() -> u64 {
    10
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            api_base: default_wikipedia_base(),
            sentences: default_sentences(),
            timeout_seconds: default_knowledge_timeout(),
        }
    }
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Sessions idle longer than this are discarded (seconds)
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7860
}

fn default_session_ttl() -> u64 {
    3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_ttl_seconds: default_session_ttl(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "openai".to_string(),
                openai: OpenAiConfig::default(),
                ollama: OllamaConfig::default(),
            },
            engine: EngineConfig::default(),
            knowledge: KnowledgeConfig::default(),
            server: ServerConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("MODECHAT_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            if self.provider.openai.api_key.is_none() {
                self.provider.openai.api_key = Some(api_key);
            }
        }

        if let Ok(api_base) = std::env::var("MODECHAT_OPENAI_API_BASE") {
            self.provider.openai.api_base = api_base;
        }

        if let Ok(ollama_host) = std::env::var("MODECHAT_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("MODECHAT_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        if let Ok(memory_size) = std::env::var("MODECHAT_MEMORY_SIZE") {
            if let Ok(value) = memory_size.parse() {
                self.engine.memory_size = value;
            } else {
                tracing::warn!("Invalid MODECHAT_MEMORY_SIZE: {}", memory_size);
            }
        }

        if let Ok(host) = std::env::var("MODECHAT_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("MODECHAT_PORT") {
            if let Ok(value) = port.parse() {
                self.server.port = value;
            } else {
                tracing::warn!("Invalid MODECHAT_PORT: {}", port);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        use crate::cli::Commands;

        let provider = match &cli.command {
            Commands::Serve {
                provider,
                host,
                port,
            } => {
                if let Some(host) = host {
                    self.server.host = host.clone();
                }
                if let Some(port) = port {
                    self.server.port = *port;
                }
                provider
            }
            Commands::Chat { provider, .. } | Commands::Ask { provider, .. } => provider,
        };

        if let Some(provider) = provider {
            self.provider.provider_type = provider.clone();
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(ChatError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["openai", "ollama"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(ChatError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.engine.memory_size < 2 || self.engine.memory_size > 1000 {
            return Err(ChatError::Config(
                "engine.memory_size must be between 2 and 1000".to_string(),
            )
            .into());
        }

        if !(0.0..=2.0).contains(&self.engine.temperature) {
            return Err(ChatError::Config(
                "engine.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.engine.max_tokens == 0 {
            return Err(ChatError::Config(
                "engine.max_tokens must be greater than 0".to_string(),
            )
            .into());
        }

        if self.knowledge.sentences == 0 || self.knowledge.sentences > 10 {
            return Err(ChatError::Config(
                "knowledge.sentences must be between 1 and 10".to_string(),
            )
            .into());
        }

        if self.knowledge.timeout_seconds == 0 {
            return Err(ChatError::Config(
                "knowledge.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.server.port == 0 {
            return Err(
                ChatError::Config("server.port must be greater than 0".to_string()).into(),
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
