//! Special commands parser for the terminal chat
//!
//! Special commands change the session instead of being sent to the model:
//! - Switch the conversation mode
//! - Clear the history
//! - Show the transcript or the session status
//! - Display help information
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive.

use crate::chat_mode::Mode;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands available in the terminal chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Switch the conversation mode for subsequent messages
    SwitchMode(Mode),

    /// Clear the conversation history, keeping the mode
    Reset,

    /// Print the conversation so far
    ShowHistory,

    /// Display mode, model and history size
    ShowStatus,

    /// Display help information
    Help,

    /// Leave the chat
    Exit,

    /// Not a special command; send the input to the model
    None,
}

/// Parse user input into a special command
///
/// # Examples
///
/// ```
/// use modechat::chat_mode::Mode;
/// use modechat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(
///     parse_special_command("/mode knowledge").unwrap(),
///     SpecialCommand::SwitchMode(Mode::Knowledge)
/// );
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    match lower.as_str() {
        "/chat" => Ok(SpecialCommand::SwitchMode(Mode::Chat)),
        "/code" => Ok(SpecialCommand::SwitchMode(Mode::CodeHelper)),
        "/knowledge" => Ok(SpecialCommand::SwitchMode(Mode::Knowledge)),

        "/mode" => Err(CommandError::MissingArgument {
            command: "/mode".to_string(),
            usage: "/mode <chat|code|knowledge>".to_string(),
        }),
        input if input.starts_with("/mode ") => {
            let arg = input["/mode ".len()..].trim();
            Mode::parse_str(arg)
                .map(SpecialCommand::SwitchMode)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/mode".to_string(),
                    arg: arg.to_string(),
                })
        }

        "/reset" | "/clear" => Ok(SpecialCommand::Reset),
        "/history" => Ok(SpecialCommand::ShowHistory),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        input if input.starts_with('/') => {
            let command = input.split_whitespace().next().unwrap_or(input);
            Err(CommandError::UnknownCommand(command.to_string()))
        }

        _ => Ok(SpecialCommand::None),
    }
}

/// Print help for the terminal chat
pub fn print_help() {
    println!(
        r#"
Special Commands:

  /mode <name>       Switch mode: chat, code or knowledge
  /chat              Shortcut for /mode chat
  /code              Shortcut for /mode code
  /knowledge         Shortcut for /mode knowledge
  /reset, /clear     Clear the conversation history
  /history           Show the conversation so far
  /status            Show mode, model and history size
  /help, /?          Show this help
  /exit, /quit       Leave the chat (also Ctrl-D)

Modes:

  chat       General conversation
  code       Programming help with short code examples
  knowledge  Answers grounded in a Wikipedia lookup
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_switch_commands() {
        assert_eq!(
            parse_special_command("/mode chat").unwrap(),
            SpecialCommand::SwitchMode(Mode::Chat)
        );
        assert_eq!(
            parse_special_command("/MODE Code").unwrap(),
            SpecialCommand::SwitchMode(Mode::CodeHelper)
        );
        assert_eq!(
            parse_special_command("/knowledge").unwrap(),
            SpecialCommand::SwitchMode(Mode::Knowledge)
        );
        assert_eq!(
            parse_special_command("  /code  ").unwrap(),
            SpecialCommand::SwitchMode(Mode::CodeHelper)
        );
    }

    #[test]
    fn test_mode_requires_argument() {
        let err = parse_special_command("/mode").unwrap_err();
        assert!(matches!(err, CommandError::MissingArgument { .. }));
        assert!(err.to_string().contains("/mode <chat|code|knowledge>"));
    }

    #[test]
    fn test_mode_rejects_unknown_name() {
        let err = parse_special_command("/mode poetry").unwrap_err();
        assert_eq!(
            err,
            CommandError::UnsupportedArgument {
                command: "/mode".to_string(),
                arg: "poetry".to_string(),
            }
        );
    }

    #[test]
    fn test_session_commands() {
        assert_eq!(parse_special_command("/reset").unwrap(), SpecialCommand::Reset);
        assert_eq!(parse_special_command("/clear").unwrap(), SpecialCommand::Reset);
        assert_eq!(
            parse_special_command("/history").unwrap(),
            SpecialCommand::ShowHistory
        );
        assert_eq!(
            parse_special_command("/status").unwrap(),
            SpecialCommand::ShowStatus
        );
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_exit_variants() {
        for input in ["exit", "quit", "/exit", "/QUIT"] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_special_command("/frobnicate now").unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand("/frobnicate".to_string()));
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(
            parse_special_command("What is Rust?").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(
            parse_special_command("exit strategy for startups").unwrap(),
            SpecialCommand::None
        );
    }
}
