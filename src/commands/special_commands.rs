//! Special commands parser for interactive chat
//!
//! Commands are prefixed with `/` and are case-insensitive. The bare words
//! `exit` and `quit` also end the session.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session instead of being sent as a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Clear the conversation and start over
    NewSession,

    /// Show how much of the conversation is replayed into each question
    ShowHistory,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a question
    None,
}

/// Parse user input into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for unrecognized `/` commands
///
/// # Examples
///
/// ```
/// use healthai::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewSession);
/// assert_eq!(parse_special_command("QUIT").unwrap(), SpecialCommand::Exit);
/// assert_eq!(parse_special_command("Is fever dangerous?").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/new" | "/clear" => Ok(SpecialCommand::NewSession),
        "/history" => Ok(SpecialCommand::ShowHistory),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print the chat help text
pub fn print_help() {
    println!(
        r#"
Chat Commands
=============

  /new        - Clear the conversation and start over
  /history    - Show how many messages are kept as context
  /help       - Show this help
  /exit       - Leave the chat (also: exit, quit)

Press Ctrl-C while an answer is streaming to stop it.
Press Ctrl-C or Ctrl-D at the prompt to leave.
"#
    );
}
