//! modechat - chatbot with memory and conversation modes
//!
//! This library provides a mode-aware chat engine over pluggable completion
//! providers, with per-session bounded history and a Wikipedia lookup that
//! grounds answers in knowledge mode.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `chat_mode`: Conversation modes and their system instructions
//! - `session`: Turns, bounded session history and the session store
//! - `knowledge`: Wikipedia lookup and context formatting
//! - `engine`: Request assembly, provider call and local fallback
//! - `providers`: Completion backends (OpenAI, Ollama)
//! - `server`: HTTP API and browser chat page
//! - `render`: HTML rendering of chat history
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use modechat::{Config, Mode, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let engine = modechat::commands::build_engine(&config)?;
//!     let mut session = Session::new(Mode::Knowledge, engine.memory_size());
//!     let reply = engine.respond(&mut session, "Who was Ada Lovelace?", Mode::Knowledge).await?;
//!     println!("{}", reply.text);
//!     Ok(())
//! }
//! ```

pub mod chat_mode;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod providers;
pub mod render;
pub mod server;
pub mod session;

// Re-export commonly used types
pub use chat_mode::{Mode, SystemPrompts};
pub use config::Config;
pub use engine::{ChatEngine, Reply};
pub use error::{ChatError, Result};
pub use knowledge::{KnowledgeLookup, KnowledgeSource, WikipediaClient};
pub use session::{Session, SessionStore, Turn};

#[cfg(test)]
pub mod test_utils;
