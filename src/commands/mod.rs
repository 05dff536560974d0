//! Command handlers for modechat
//!
//! This module contains the handlers for each CLI subcommand: the web
//! server, the interactive terminal chat and one-shot questions.

use crate::config::Config;
use crate::engine::ChatEngine;
use crate::error::Result;
use crate::knowledge::{KnowledgeSource, WikipediaClient};
use crate::providers::{create_provider, Provider};
use std::sync::Arc;

pub mod special_commands;

/// Build the chat engine described by the configuration
///
/// # Errors
///
/// Returns error if the provider is unknown or if the knowledge client cannot
/// be constructed. Missing credentials surface as fallback replies instead.
pub fn build_engine(config: &Config) -> Result<ChatEngine> {
    let provider: Arc<dyn Provider> = Arc::from(create_provider(
        &config.provider.provider_type,
        &config.provider,
    )?);

    let knowledge: Option<Arc<dyn KnowledgeSource>> = if config.engine.enable_knowledge_lookup {
        Some(Arc::new(WikipediaClient::new(&config.knowledge)?))
    } else {
        tracing::info!("Knowledge lookup disabled");
        None
    };

    Ok(ChatEngine::new(provider, knowledge, &config.engine))
}

// Web server command handler
pub mod serve {
    use super::*;
    use crate::server::{run_server, AppState};

    /// Start the web chat interface
    ///
    /// Blocks until the server shuts down (Ctrl-C).
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration with CLI overrides applied
    pub async fn run_serve(config: Config) -> Result<()> {
        let engine = Arc::new(build_engine(&config)?);
        tracing::info!(
            model = %engine.model_name(),
            memory_size = engine.memory_size(),
            "Starting web server"
        );

        let state = AppState::new(engine, config.server.session_ttl_seconds);
        run_server(&config.server.host, config.server.port, state).await
    }
}

// Interactive terminal chat handler
pub mod chat {
    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::chat_mode::Mode;
    use crate::providers::Role;
    use crate::session::{Session, Turn};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive chat session in the terminal
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration with CLI overrides applied
    /// * `mode` - Optional initial mode name ("chat", "code" or "knowledge")
    pub async fn run_chat(config: Config, mode: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let engine = build_engine(&config)?;
        let initial_mode = mode.as_deref().map(Mode::normalize).unwrap_or_default();
        let mut session = Session::new(initial_mode, engine.memory_size());

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(initial_mode, &engine.model_name());

        loop {
            let prompt = format!("{} >> ", session.mode().colored_tag());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::SwitchMode(new_mode)) => {
                            let old = session.set_mode(new_mode);
                            println!(
                                "Switched from {} to {} mode\n",
                                old.colored_tag(),
                                new_mode.colored_tag()
                            );
                            continue;
                        }
                        Ok(SpecialCommand::Reset) => {
                            session.reset();
                            println!("{}\n", "Conversation cleared".green());
                            continue;
                        }
                        Ok(SpecialCommand::ShowHistory) => {
                            print_history(session.history());
                            continue;
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status(&session, &engine.model_name());
                            continue;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {}
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    }

                    let mode = session.mode();
                    match engine.respond(&mut session, trimmed, mode).await {
                        Ok(reply) => {
                            if let Some(source) = reply.knowledge.as_ref().and_then(source_line) {
                                println!("{}", source.dimmed());
                            }
                            if reply.fallback {
                                println!("{}", "Model unreachable, local fallback used".yellow());
                            }
                            println!("\n{}\n", reply.text);
                        }
                        Err(e) => {
                            eprintln!("Error: {}\n", e);
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn source_line(lookup: &crate::knowledge::KnowledgeLookup) -> Option<String> {
        use crate::knowledge::KnowledgeLookup;
        match lookup {
            KnowledgeLookup::Found { title, url, .. } => Some(match url {
                Some(url) => format!("Source: Wikipedia, {} ({})", title, url),
                None => format!("Source: Wikipedia, {}", title),
            }),
            KnowledgeLookup::Ambiguous { query, .. } => {
                Some(format!("Source: '{}' is ambiguous on Wikipedia", query))
            }
            KnowledgeLookup::NotFound { .. } => None,
        }
    }

    /// Format turns as a plain-text transcript
    pub fn format_transcript(turns: &[Turn]) -> String {
        turns
            .iter()
            .filter(|turn| turn.role != Role::System)
            .map(|turn| {
                let speaker = match turn.role {
                    Role::User => "You",
                    _ => "Bot",
                };
                format!("{}: {}", speaker, turn.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn print_history(turns: &[Turn]) {
        if turns.is_empty() {
            println!("No messages yet\n");
        } else {
            println!("\n{}\n", format_transcript(turns));
        }
    }

    fn print_welcome_banner(mode: Mode, model: &str) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              modechat Interactive Chat - Welcome!            ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Mode:   {} ({})", mode.colored_tag(), mode.description());
        println!("Model:  {}", model);
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    fn print_status(session: &Session, model: &str) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     modechat Session Status                  ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "Mode:              {} ({})",
            session.mode().colored_tag(),
            session.mode().description()
        );
        println!("Model:             {}", model);
        println!(
            "Conversation Size: {} / {} turns",
            session.len(),
            session.memory_size()
        );
        println!();
    }

}

// One-shot question handler
pub mod ask {
    use super::*;
    use crate::chat_mode::Mode;
    use crate::session::Session;

    /// Send a single prompt and print the reply
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration with CLI overrides applied
    /// * `prompt` - Question to ask
    /// * `mode` - Optional mode name; defaults to chat
    pub async fn run_ask(config: Config, prompt: String, mode: Option<String>) -> Result<()> {
        let engine = build_engine(&config)?;
        let mode = mode.as_deref().map(Mode::normalize).unwrap_or_default();
        let mut session = Session::new(mode, engine.memory_size());

        let reply = engine.respond(&mut session, &prompt, mode).await?;
        if reply.fallback {
            tracing::warn!("Model unreachable, printing local fallback");
        }
        println!("{}", reply.text);
        Ok(())
    }
}
