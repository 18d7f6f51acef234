//! Command parser for SQL and backslash commands
//!
//! Parses user input to distinguish between SQL statements and CLI meta-commands.

use crate::error::{CLIError, Result};
use crate::state::Tab;

/// Parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Custom SQL statement
    Sql(String),

    /// Meta-commands (backslash commands)
    Quit,
    Help,
    Status,
    Connect,
    SelectTab(Tab),
    Ask(String),
    RunGenerated,
    Metric(String),
    Metrics,
    Export(Option<String>),
    Persist(String),
    Dictionary,
    SetFormat(String),
    Unknown(String),
}

/// Command parser
pub struct CommandParser;

impl CommandParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a command line
    pub fn parse(&self, line: &str) -> Result<Command> {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return Err(CLIError::ParseError("Empty command".into()));
        }

        // Check for backslash commands
        if trimmed.starts_with('\\') {
            return self.parse_meta_command(trimmed);
        }

        // Otherwise, treat as SQL
        Ok(Command::Sql(trimmed.to_string()))
    }

    /// Parse meta-commands (backslash commands)
    fn parse_meta_command(&self, line: &str) -> Result<Command> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match command {
            "\\quit" | "\\q" => Ok(Command::Quit),
            "\\help" | "\\?" => Ok(Command::Help),
            "\\status" | "\\info" => Ok(Command::Status),
            "\\connect" | "\\reconnect" => Ok(Command::Connect),
            "\\tab" => {
                if args.is_empty() {
                    Err(CLIError::ParseError(
                        "\\tab requires: assistant, quick, custom, or dictionary".into(),
                    ))
                } else {
                    args[0]
                        .parse::<Tab>()
                        .map(Command::SelectTab)
                        .map_err(CLIError::ParseError)
                }
            }
            "\\ask" => {
                if rest.is_empty() {
                    Err(CLIError::ParseError("\\ask requires a question".into()))
                } else {
                    // Question text is passed through untouched
                    Ok(Command::Ask(rest.to_string()))
                }
            }
            "\\run" => Ok(Command::RunGenerated),
            "\\metric" => {
                if args.is_empty() {
                    Err(CLIError::ParseError(
                        "\\metric requires a metric key (see \\metrics)".into(),
                    ))
                } else {
                    Ok(Command::Metric(args[0].to_string()))
                }
            }
            "\\metrics" => Ok(Command::Metrics),
            "\\export" => Ok(Command::Export(args.first().map(|s| s.to_string()))),
            "\\persist" | "\\save" => {
                if args.is_empty() {
                    Err(CLIError::ParseError("\\persist requires a table name".into()))
                } else {
                    Ok(Command::Persist(args[0].to_string()))
                }
            }
            "\\dict" | "\\dictionary" => Ok(Command::Dictionary),
            "\\format" => {
                if args.is_empty() {
                    Err(CLIError::ParseError(
                        "\\format requires: table, json, or csv".into(),
                    ))
                } else {
                    Ok(Command::SetFormat(args[0].to_string()))
                }
            }
            _ => Ok(Command::Unknown(command.to_string())),
        }
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}
