//! SQL execution against the connected warehouse.
//!
//! Every statement the client sends goes through [`QueryExecutor`]: canned
//! metrics, free-form SQL, generated SQL, the AI invocation itself and the
//! persist write-back.

use log::{debug, warn};
use std::time::Instant;

use crate::{
    connection::ConnectionManager,
    error::{LinkError, Result},
    models::ResultSet,
    sanitize::sanitize,
    transport::StatementOutput,
};

/// Handles SQL execution over a [`ConnectionManager`]'s live session.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Sanitize and execute `sql`, returning the full result set.
    ///
    /// Fails with [`LinkError::NotConnected`] without a live session and with
    /// [`LinkError::ExecutionError`] (remote message verbatim) when the
    /// warehouse rejects the statement. Never retries and never changes the
    /// connection state.
    pub async fn execute(&self, sql: &str, connection: &ConnectionManager) -> Result<ResultSet> {
        connection.session()?;

        let statement = sanitize(sql);
        if statement.is_empty() {
            return Err(LinkError::execution("empty statement"));
        }
        self.execute_raw(&statement, connection).await
    }

    /// Execute `statement` exactly as given (no sanitization)
    pub async fn execute_raw(
        &self,
        statement: &str,
        connection: &ConnectionManager,
    ) -> Result<ResultSet> {
        let session = connection.session()?;

        debug!(
            "[QUERY] Starting query: \"{}\" (len={})",
            sql_preview(statement),
            statement.len()
        );
        let start = Instant::now();

        match session.execute(statement).await {
            Ok(StatementOutput { columns, rows }) => {
                debug!(
                    "[QUERY] Success: rows={} total_ms={}",
                    rows.len(),
                    start.elapsed().as_millis()
                );
                Ok(ResultSet::new(columns, rows))
            }
            Err(e) => {
                warn!(
                    "[QUERY] Failed after {}ms: {}",
                    start.elapsed().as_millis(),
                    e
                );
                Err(LinkError::ExecutionError {
                    message: e.remote_message(),
                    connection_lost: e.is_session_fatal(),
                })
            }
        }
    }
}

/// Single-line preview of a statement for logs
pub(crate) fn sql_preview(sql: &str) -> String {
    let flat = sql.replace('\n', " ");
    if flat.chars().count() > 80 {
        format!("{}...", flat.chars().take(80).collect::<String>())
    } else {
        flat
    }
}
