//! Test utilities for modechat
//!
//! Stub providers and knowledge sources for exercising the engine and the
//! HTTP layer without network access.

use crate::error::{ChatError, Result};
use crate::knowledge::{KnowledgeLookup, KnowledgeSource};
use crate::providers::{CompletionOptions, CompletionResponse, Message, Provider};
use async_trait::async_trait;
use std::sync::Mutex;

/// Provider that returns a fixed reply and records every request
pub struct RecordingProvider {
    reply: String,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl RecordingProvider {
    /// Create a provider answering every request with `reply`
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Messages of the most recent request
    pub fn last_request(&self) -> Option<Vec<Message>> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Number of requests received
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn complete(
        &self,
        messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        Ok(CompletionResponse::new(Message::assistant(self.reply.clone())))
    }

    fn get_current_model(&self) -> Result<String> {
        Ok("recording-model".to_string())
    }
}

/// Provider whose every request fails
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse> {
        Err(ChatError::Provider("connection refused".to_string()).into())
    }
}

/// Knowledge source returning a canned outcome (or failing)
pub struct StaticKnowledge {
    outcome: Option<KnowledgeLookup>,
    queries: Mutex<Vec<String>>,
}

impl StaticKnowledge {
    /// Source answering every query with `outcome`
    pub fn new(outcome: KnowledgeLookup) -> Self {
        Self {
            outcome: Some(outcome),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Source whose lookups always error
    pub fn failing() -> Self {
        Self {
            outcome: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeSource for StaticKnowledge {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn lookup(&self, query: &str) -> Result<KnowledgeLookup> {
        self.queries.lock().unwrap().push(query.to_string());
        self.outcome
            .clone()
            .ok_or_else(|| ChatError::Knowledge("lookup unavailable".to_string()).into())
    }
}
