//! Data models for querypilot-link.
//!
//! Result sets handed back to callers, the sanitized query newtype, write-back
//! outcomes, and the wire structures of the warehouse statement API.

mod connection_options;
mod export_artifact;
mod generated_query;
mod persist_outcome;
mod result_set;
pub mod statement;

pub use connection_options::ConnectionOptions;
pub use export_artifact::{ExportArtifact, CSV_CONTENT_TYPE, DEFAULT_EXPORT_FILE_NAME};
pub use generated_query::GeneratedQuery;
pub use persist_outcome::PersistOutcome;
pub use result_set::ResultSet;
