//! Error types for querypilot-link
//!
//! Every remote-facing operation converts its own failures into one of the
//! [`LinkError`] kinds below. Raw transport errors ([`TransportError`]) never
//! leave the component that received them.

use thiserror::Error;

/// Errors surfaced by the warehouse client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    /// Missing or invalid connection settings
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Transport or authentication failure while connecting
    #[error("Connection failed: {0}")]
    ConnectionError(String),

    /// An operation needed a live connection and there was none
    #[error("No warehouse connection established")]
    NotConnected,

    /// The AI function produced no usable SQL text
    #[error("AI query generation failed: {0}")]
    GenerationError(String),

    /// The warehouse rejected or failed a statement
    #[error("Query execution failed: {message}")]
    ExecutionError {
        /// Remote message, verbatim
        message: String,
        /// The transport reported the session as unusable
        connection_lost: bool,
    },

    /// Writing a result set back to the warehouse failed
    #[error("Persist failed: {0}")]
    PersistError(String),

    /// `run` was requested before any SQL was generated
    #[error("No generated query to run; ask a question first")]
    NoGeneratedQuery,
}

impl LinkError {
    pub(crate) fn execution(message: impl Into<String>) -> Self {
        LinkError::ExecutionError {
            message: message.into(),
            connection_lost: false,
        }
    }

    /// True when the caller should drop and re-establish the connection
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            LinkError::ExecutionError {
                connection_lost: true,
                ..
            }
        )
    }
}

/// Result type for warehouse client operations
pub type Result<T> = std::result::Result<T, LinkError>;

/// Failures reported by a [`crate::transport::WarehouseSession`]
///
/// Internal to the transport seam; components map these into [`LinkError`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The remote could not be reached
    #[error("{0}")]
    Network(String),

    /// Credentials were rejected (HTTP 401/403)
    #[error("{0}")]
    Unauthorized(String),

    /// The warehouse executed the statement and reported an error
    #[error("{message}")]
    Statement {
        error_code: Option<String>,
        message: String,
    },

    /// The remote answered with something we could not interpret
    #[error("{0}")]
    Protocol(String),
}

impl TransportError {
    /// Whether the session behind this error can still be used
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, TransportError::Network(_) | TransportError::Unauthorized(_))
    }

    /// Message suitable for passing through verbatim
    pub fn remote_message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Protocol(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}
