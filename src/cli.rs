//! Command-line interface definition for modechat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the web server, the terminal chat and
//! one-shot questions.

use clap::{Parser, Subcommand};

/// modechat - chatbot with memory and conversation modes
///
/// Serve a browser chat interface or talk to the model from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "modechat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for modechat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the web chat interface
    Serve {
        /// Override the provider from config (openai, ollama)
        #[arg(short, long)]
        provider: Option<String>,

        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Start an interactive terminal chat
    Chat {
        /// Override the provider from config (openai, ollama)
        #[arg(short, long)]
        provider: Option<String>,

        /// Initial mode: chat, code or knowledge
        #[arg(short, long, default_value = "chat")]
        mode: Option<String>,
    },

    /// Ask a single question and print the reply
    Ask {
        /// Question to send
        prompt: String,

        /// Override the provider from config (openai, ollama)
        #[arg(short, long)]
        provider: Option<String>,

        /// Mode: chat, code or knowledge
        #[arg(short, long, default_value = "chat")]
        mode: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            command: Commands::Serve {
                provider: None,
                host: None,
                port: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Serve { .. }));
    }

    #[test]
    fn test_cli_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["modechat", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Commands::Serve { port, .. } => assert_eq!(port, Some(9000)),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_chat_default_mode() {
        let cli = Cli::try_parse_from(["modechat", "chat"]).unwrap();
        match cli.command {
            Commands::Chat { mode, provider } => {
                assert_eq!(mode, Some("chat".to_string()));
                assert!(provider.is_none());
            }
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_cli_parse_ask() {
        let cli = Cli::try_parse_from([
            "modechat",
            "--verbose",
            "ask",
            "What is the Taj Mahal?",
            "--mode",
            "knowledge",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Ask { prompt, mode, .. } => {
                assert_eq!(prompt, "What is the Taj Mahal?");
                assert_eq!(mode, Some("knowledge".to_string()));
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["modechat"]).is_err());
    }
}
