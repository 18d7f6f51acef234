//! # querypilot-link: Warehouse Client Library
//!
//! Connects to a SQL warehouse, turns natural-language questions into SQL via
//! a remote AI function, executes statements, and materializes the results.
//!
//! ## Features
//!
//! - **Connection lifecycle**: credentials from the environment, one live
//!   session at a time, idempotent close
//! - **Sanitization**: strips markdown fences, `Generated SQL:` labels and
//!   trailing terminators from AI output
//! - **Query generation**: injection-safe embedding of the question into the
//!   AI function call
//! - **Execution**: one entry point for every statement, remote errors passed
//!   through verbatim
//! - **Materialization**: CSV export and write-back into the warehouse
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use querypilot_link::{
//!     ConnectionManager, ConnectionOptions, NaturalLanguageQueryGenerator, QueryExecutor,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut connection = ConnectionManager::http(ConnectionOptions::default());
//!     connection.connect_from_environment().await?;
//!
//!     let generator = NaturalLanguageQueryGenerator::default();
//!     let sql = generator.generate("how many rides today", &connection).await?;
//!
//!     let result = QueryExecutor::new().execute(sql.as_str(), &connection).await?;
//!     println!("{:?}", result.rows);
//!
//!     connection.close().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod connection;
pub mod credentials;
pub mod error;
pub mod generator;
pub mod literal;
pub mod materialize;
pub mod models;
pub mod query;
pub mod sanitize;
pub mod transport;

// Re-export main types for convenience
pub use client::StatementApiDriver;
pub use connection::{ConnectionManager, ConnectionState};
pub use credentials::WarehouseCredentials;
pub use error::{LinkError, Result, TransportError};
pub use generator::{NaturalLanguageQueryGenerator, DEFAULT_AI_FUNCTION};
pub use materialize::{ResultMaterializer, DEFAULT_PERSIST_NAMESPACE};
pub use models::{
    ConnectionOptions, ExportArtifact, GeneratedQuery, PersistOutcome, ResultSet,
    CSV_CONTENT_TYPE, DEFAULT_EXPORT_FILE_NAME,
};
pub use query::QueryExecutor;
pub use sanitize::{sanitize, sanitize_opt};
pub use transport::{StatementOutput, WarehouseDriver, WarehouseSession};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
