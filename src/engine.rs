//! Chat engine: one user turn in, one assistant turn out
//!
//! The engine is shared by every session. For each submission it records the
//! user turn, optionally consults the knowledge source, assembles the request
//! (mode instruction, optional context, recent history), calls the provider
//! and records the reply. When the provider fails the reply is a local
//! fallback so the conversation keeps its user/assistant pairing.

use crate::chat_mode::{Mode, SystemPrompts};
use crate::config::EngineConfig;
use crate::error::{ChatError, Result};
use crate::knowledge::{KnowledgeLookup, KnowledgeSource};
use crate::providers::{CompletionOptions, Message, Provider, Role};
use crate::session::{Session, Turn};
use serde::Serialize;
use std::sync::Arc;

/// Characters of the user's message echoed by the fallback reply
const FALLBACK_ECHO_CHARS: usize = 400;

const CONTEXT_PREAMBLE: &str =
    "Use the following external context to answer. Cite it naturally when used.\n";

/// Result of one engine round trip
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    /// Assistant text recorded in the session
    pub text: String,
    /// Mode the reply was produced in
    pub mode: Mode,
    /// Knowledge lookup outcome, when one ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge: Option<KnowledgeLookup>,
    /// Whether the text is the local fallback rather than a model reply
    pub fallback: bool,
}

/// Mode-aware chat engine
pub struct ChatEngine {
    provider: Arc<dyn Provider>,
    knowledge: Option<Arc<dyn KnowledgeSource>>,
    prompts: SystemPrompts,
    options: CompletionOptions,
    memory_size: usize,
    enable_knowledge_lookup: bool,
}

impl ChatEngine {
    /// Create an engine
    ///
    /// # Arguments
    ///
    /// * `provider` - Completion backend
    /// * `knowledge` - Source consulted in knowledge mode, if any
    /// * `config` - Engine settings (history window, sampling, prompt overrides)
    pub fn new(
        provider: Arc<dyn Provider>,
        knowledge: Option<Arc<dyn KnowledgeSource>>,
        config: &EngineConfig,
    ) -> Self {
        tracing::info!(
            provider = provider.name(),
            knowledge = knowledge.as_ref().map(|k| k.name()).unwrap_or("none"),
            "Chat engine initialized"
        );
        Self {
            provider,
            knowledge,
            prompts: SystemPrompts::from_overrides(&config.prompts),
            options: CompletionOptions {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
            memory_size: config.memory_size.max(2),
            enable_knowledge_lookup: config.enable_knowledge_lookup,
        }
    }

    /// System prompt mapping in use
    pub fn prompts(&self) -> &SystemPrompts {
        &self.prompts
    }

    /// Replace the system prompt of one mode
    pub fn set_system_prompt(&mut self, mode: Mode, prompt: impl Into<String>) {
        self.prompts.set(mode, prompt);
    }

    /// History bound applied to sessions created for this engine
    pub fn memory_size(&self) -> usize {
        self.memory_size
    }

    /// Name of the model replies come from
    pub fn model_name(&self) -> String {
        self.provider
            .get_current_model()
            .unwrap_or_else(|_| self.provider.name().to_string())
    }

    /// Answer one user submission within a session
    ///
    /// Switches the session to `mode`, appends the user turn and the
    /// assistant turn, and returns the reply.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Validation`] for blank input; nothing is recorded
    /// in that case. Provider failures do not error: they yield the fallback.
    pub async fn respond(&self, session: &mut Session, input: &str, mode: Mode) -> Result<Reply> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ChatError::Validation("message cannot be empty".to_string()).into());
        }

        if session.mode() != mode {
            let old = session.set_mode(mode);
            tracing::info!(session = %session.id(), "Mode switched from {} to {}", old, mode);
        }

        session.append(Turn::user(input));

        let knowledge = self.lookup(input, mode).await;
        let messages = self.build_messages(session, mode, knowledge.as_ref());

        let (text, fallback) = match self.provider.complete(&messages, &self.options).await {
            Ok(response) => {
                if let Some(usage) = response.usage {
                    tracing::debug!(
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        "Completion usage"
                    );
                }
                (response.message.content.trim().to_string(), false)
            }
            Err(e) => {
                tracing::error!(provider = self.provider.name(), "Completion failed: {:#}", e);
                (local_fallback(&messages), true)
            }
        };

        session.append(Turn::assistant(text.clone()));

        Ok(Reply {
            text,
            mode,
            knowledge,
            fallback,
        })
    }

    async fn lookup(&self, query: &str, mode: Mode) -> Option<KnowledgeLookup> {
        if !mode.uses_knowledge_lookup() || !self.enable_knowledge_lookup {
            return None;
        }
        let source = self.knowledge.as_ref()?;

        match source.lookup(query).await {
            Ok(result) => {
                tracing::info!(
                    source = source.name(),
                    found = result.is_found(),
                    "Knowledge context attached"
                );
                Some(result)
            }
            Err(e) => {
                tracing::warn!(source = source.name(), "Knowledge lookup failed: {:#}", e);
                None
            }
        }
    }

    /// Messages sent to the provider for the current state of `session`
    ///
    /// The mode instruction comes first, then the context message when a
    /// lookup produced one, then as many recent turns as fit in the
    /// history window. The latest turn is always included.
    pub fn build_messages(
        &self,
        session: &Session,
        mode: Mode,
        knowledge: Option<&KnowledgeLookup>,
    ) -> Vec<Message> {
        let mut messages = vec![Message::system(self.prompts.get(mode))];

        if let Some(lookup) = knowledge {
            messages.push(Message::system(format!(
                "{}{}",
                CONTEXT_PREAMBLE,
                lookup.context_block()
            )));
        }

        let window = self.memory_size.saturating_sub(messages.len()).max(1);
        messages.extend(session.recent(window).iter().map(Turn::to_message));
        messages
    }
}

/// Reply used when the provider cannot be reached
pub fn local_fallback(messages: &[Message]) -> String {
    let last_user = messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("");
    let echo: String = last_user.chars().take(FALLBACK_ECHO_CHARS).collect();
    format!("[Local fallback] I can't reach the model. Echo: {}", echo)
}
