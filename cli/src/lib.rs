//! Library entry point for querypilot-cli components.
//!
//! Exposes the session state controller, canned metrics, the data
//! dictionary and the terminal surface so integration tests can drive them
//! without going through the binary entry point.

pub mod config;
pub mod dictionary;
pub mod error;
pub mod formatter;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod parser;
pub mod session;
pub mod state;

pub use config::CLIConfiguration;
pub use dictionary::DataDictionary;
pub use error::{CLIError, Result};
pub use formatter::OutputFormatter;
pub use metrics::{CannedMetric, MetricKind, MetricReading, MetricValue, CANNED_METRICS};
pub use session::{CLISession, OutputFormat};
pub use state::{QueryServices, QuestionDraft, SessionState, Tab};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
