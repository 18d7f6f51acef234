//! Error types for querypilot-cli
//!
//! Provides user-friendly error messages and context for common CLI failures.

use querypilot_link::LinkError;
use std::fmt;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CLIError>;

/// Errors that can occur in the CLI
#[derive(Debug)]
pub enum CLIError {
    /// Error from querypilot-link library
    LinkError(LinkError),

    /// Configuration file error
    ConfigurationError(String),

    /// File I/O error
    FileError(String),

    /// Invalid command syntax
    ParseError(String),

    /// User cancelled operation
    Cancelled,

    /// Readline error
    ReadlineError(String),

    /// History file error
    HistoryError(String),

    /// Format error
    FormatError(String),

    /// Data dictionary could not be loaded or parsed
    DictionaryError(String),
}

impl CLIError {
    /// The wrapped link error, if any
    pub fn link_error(&self) -> Option<&LinkError> {
        match self {
            CLIError::LinkError(e) => Some(e),
            _ => None,
        }
    }

    fn format_link_error(err: &LinkError) -> String {
        match err {
            LinkError::ConfigurationError(msg) => msg.clone(),
            LinkError::ConnectionError(msg) => {
                format!("Connection failed: {}", Self::clean_nested_message(msg))
            }
            LinkError::NotConnected => {
                "Not connected to the warehouse (use \\connect)".to_string()
            }
            LinkError::GenerationError(msg) => format!("Could not generate SQL: {}", msg),
            LinkError::ExecutionError { message, .. } => message.clone(),
            LinkError::PersistError(msg) => format!("Could not save results: {}", msg),
            LinkError::NoGeneratedQuery => {
                "No generated SQL to run (ask a question first with \\ask)".to_string()
            }
        }
    }

    fn clean_nested_message(message: &str) -> String {
        let mut cleaned = message.trim();
        let prefixes = [
            "Connection failed:",
            "connection failed:",
            "Network error:",
            "network error:",
        ];

        loop {
            let mut stripped = false;
            for prefix in &prefixes {
                if let Some(rest) = cleaned.strip_prefix(prefix) {
                    cleaned = rest.trim_start();
                    stripped = true;
                    break;
                }
            }

            if !stripped {
                break;
            }
        }

        cleaned.to_string()
    }
}

impl fmt::Display for CLIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CLIError::LinkError(e) => write!(f, "{}", Self::format_link_error(e)),
            CLIError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            CLIError::FileError(msg) => write!(f, "File error: {}", msg),
            CLIError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            CLIError::Cancelled => write!(f, "Operation cancelled"),
            CLIError::ReadlineError(msg) => write!(f, "Input error: {}", msg),
            CLIError::HistoryError(msg) => write!(f, "History error: {}", msg),
            CLIError::FormatError(msg) => write!(f, "Format error: {}", msg),
            CLIError::DictionaryError(msg) => write!(f, "Data dictionary error: {}", msg),
        }
    }
}

impl std::error::Error for CLIError {}

impl From<LinkError> for CLIError {
    fn from(err: LinkError) -> Self {
        CLIError::LinkError(err)
    }
}

impl From<rustyline::error::ReadlineError> for CLIError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        match err {
            rustyline::error::ReadlineError::Interrupted => CLIError::Cancelled,
            rustyline::error::ReadlineError::Eof => CLIError::Cancelled,
            e => CLIError::ReadlineError(e.to_string()),
        }
    }
}

impl From<std::io::Error> for CLIError {
    fn from(err: std::io::Error) -> Self {
        CLIError::FileError(err.to_string())
    }
}

impl From<toml::de::Error> for CLIError {
    fn from(err: toml::de::Error) -> Self {
        CLIError::ConfigurationError(format!("TOML parse error: {}", err))
    }
}

impl From<csv::Error> for CLIError {
    fn from(err: csv::Error) -> Self {
        CLIError::DictionaryError(err.to_string())
    }
}
