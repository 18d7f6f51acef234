//! Transport seam between the connection manager and the remote warehouse.
//!
//! [`WarehouseDriver`] opens an authenticated [`WarehouseSession`]; the
//! session submits statements and returns raw tabular output. The production
//! driver is [`crate::client::StatementApiDriver`]; tests plug in scripted
//! drivers.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::credentials::WarehouseCredentials;
use crate::error::TransportError;
use crate::models::ConnectionOptions;

/// Raw output of one statement as reported by the warehouse
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementOutput {
    /// Column names from the result descriptor, in warehouse order
    pub columns: Vec<String>,

    /// All rows, every chunk concatenated
    pub rows: Vec<Vec<JsonValue>>,
}

/// Opens sessions against a warehouse
#[async_trait]
pub trait WarehouseDriver: Send + Sync {
    /// Establish an authenticated session
    async fn open(
        &self,
        credentials: &WarehouseCredentials,
        options: &ConnectionOptions,
    ) -> std::result::Result<Box<dyn WarehouseSession>, TransportError>;
}

/// A live session able to run statements
#[async_trait]
pub trait WarehouseSession: Send + Sync {
    /// Submit one statement and wait for its complete result
    async fn execute(&self, statement: &str) -> std::result::Result<StatementOutput, TransportError>;

    /// Release the statement cursor and the session
    async fn close(&self) -> std::result::Result<(), TransportError>;
}
