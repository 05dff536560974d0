//! Conversation modes and their system instructions
//!
//! Three mutually exclusive presets select the system instruction sent with
//! every request:
//! - Chat: general friendly assistant
//! - Code: senior software engineer persona
//! - Knowledge: factual assistant, backed by a Wikipedia lookup
//!
//! [`SystemPrompts`] holds the mode-to-instruction mapping, including any
//! per-mode overrides loaded from configuration.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

const CHAT_PROMPT: &str = "You are a friendly, concise AI assistant. Be helpful, honest, and \
avoid verbosity. Use simple language unless asked for detail.";

const CODE_PROMPT: &str = "You are a senior software engineer. Provide precise, secure, and \
production-ready answers. Show minimal runnable examples. \
Mention time/space complexity when relevant.";

const KNOWLEDGE_PROMPT: &str = "You are a factual knowledge assistant. When provided with external \
context (e.g., from Wikipedia), cite it naturally and separate facts \
from speculation. If uncertain, say so.";

/// Conversation mode for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// General conversation
    #[default]
    Chat,

    /// Programming help
    #[serde(rename = "code")]
    CodeHelper,

    /// Factual answers enriched with an encyclopedia extract
    Knowledge,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Mode {
    /// All modes, in selector order
    pub const ALL: [Mode; 3] = [Mode::Chat, Mode::CodeHelper, Mode::Knowledge];

    /// Parse a mode from its canonical name
    ///
    /// # Arguments
    ///
    /// * `s` - "chat", "code" or "knowledge" (case-insensitive)
    ///
    /// # Returns
    ///
    /// Returns the parsed Mode or an error if the string is not a mode name
    ///
    /// # Examples
    ///
    /// ```
    /// use modechat::chat_mode::Mode;
    ///
    /// assert_eq!(Mode::parse_str("code").unwrap(), Mode::CodeHelper);
    /// assert!(Mode::parse_str("poetry").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "code" => Ok(Self::CodeHelper),
            "knowledge" => Ok(Self::Knowledge),
            other => Err(format!("Unknown mode: {}", other)),
        }
    }

    /// Map free-form input to a mode, falling back to Chat
    ///
    /// Accepts the canonical names plus a few aliases ("code helper",
    /// "programming", "facts", "knowledge assistant").
    ///
    /// # Examples
    ///
    /// ```
    /// use modechat::chat_mode::Mode;
    ///
    /// assert_eq!(Mode::normalize(" Programming "), Mode::CodeHelper);
    /// assert_eq!(Mode::normalize("facts"), Mode::Knowledge);
    /// assert_eq!(Mode::normalize("whatever"), Mode::Chat);
    /// ```
    pub fn normalize(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "code" | "code helper" | "code_helper" | "programming" => Self::CodeHelper,
            "knowledge" | "facts" | "knowledge assistant" => Self::Knowledge,
            _ => Self::Chat,
        }
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::CodeHelper => "code",
            Self::Knowledge => "knowledge",
        }
    }

    /// Built-in system instruction for this mode
    pub fn default_system_prompt(&self) -> &'static str {
        match self {
            Self::Chat => CHAT_PROMPT,
            Self::CodeHelper => CODE_PROMPT,
            Self::Knowledge => KNOWLEDGE_PROMPT,
        }
    }

    /// Whether a knowledge lookup precedes the completion request
    pub fn uses_knowledge_lookup(&self) -> bool {
        matches!(self, Self::Knowledge)
    }

    /// Get a user-friendly description of this mode
    pub fn description(&self) -> &'static str {
        match self {
            Self::Chat => "Friendly general-purpose assistant",
            Self::CodeHelper => "Precise programming help with runnable examples",
            Self::Knowledge => "Factual answers backed by a Wikipedia lookup",
        }
    }

    /// Get a colored tag representation of this mode
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use modechat::chat_mode::Mode;
    ///
    /// println!("{}", Mode::Knowledge.colored_tag()); // "[KNOWLEDGE]" in cyan
    /// ```
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Chat => format!("[{}]", "CHAT".green()),
            Self::CodeHelper => format!("[{}]", "CODE".purple()),
            Self::Knowledge => format!("[{}]", "KNOWLEDGE".cyan()),
        }
    }
}

/// Mode-to-instruction mapping with optional overrides
///
/// Lookups are total: a mode without an override uses its built-in prompt.
#[derive(Debug, Clone, Default)]
pub struct SystemPrompts {
    overrides: HashMap<Mode, String>,
}

impl SystemPrompts {
    /// Create a mapping that uses only the built-in prompts
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the mapping from configuration overrides keyed by mode name
    ///
    /// Unknown keys are skipped with a warning.
    pub fn from_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut prompts = Self::new();
        for (key, prompt) in overrides {
            match Mode::parse_str(key) {
                Ok(mode) => prompts.set(mode, prompt.clone()),
                Err(e) => tracing::warn!("Ignoring prompt override: {}", e),
            }
        }
        prompts
    }

    /// Set or replace the instruction for a mode
    ///
    /// Blank prompts are ignored so every mode keeps a non-empty instruction.
    pub fn set(&mut self, mode: Mode, prompt: impl Into<String>) {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            tracing::warn!("Ignoring empty system prompt for mode '{}'", mode);
            return;
        }
        self.overrides.insert(mode, prompt);
        tracing::info!("System prompt updated for mode '{}'", mode);
    }

    /// Instruction for the given mode
    pub fn get(&self, mode: Mode) -> &str {
        self.overrides
            .get(&mode)
            .map(String::as_str)
            .unwrap_or_else(|| mode.default_system_prompt())
    }
}
