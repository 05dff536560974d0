use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use modechat::config::{Config, KnowledgeConfig, OpenAiConfig};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// OpenAI settings pointing at a mock server
#[allow(dead_code)]
pub fn openai_config(api_base: &str) -> OpenAiConfig {
    OpenAiConfig {
        model: "gpt-4o-mini".to_string(),
        api_base: api_base.to_string(),
        api_key: Some("sk-test".to_string()),
    }
}

/// Wikipedia settings pointing at a mock server
#[allow(dead_code)]
pub fn knowledge_config(api_base: &str) -> KnowledgeConfig {
    KnowledgeConfig {
        api_base: api_base.to_string(),
        sentences: 2,
        timeout_seconds: 5,
    }
}

/// Full configuration with both remote services on mock servers
#[allow(dead_code)]
pub fn mocked_config(openai_base: &str, wikipedia_base: &str) -> Config {
    let mut config = Config::default();
    config.provider.provider_type = "openai".to_string();
    config.provider.openai = openai_config(openai_base);
    config.knowledge = knowledge_config(wikipedia_base);
    config
}

/// Body of a successful chat completion
#[allow(dead_code)]
pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49 }
    })
}
