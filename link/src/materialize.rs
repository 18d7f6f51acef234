//! Result materialization: CSV export and write-back to the warehouse.

use log::{debug, warn};
use serde_json::Value as JsonValue;

use crate::{
    connection::ConnectionManager,
    error::{LinkError, Result},
    literal::{is_qualified_identifier, is_simple_identifier, json_to_sql_literal, quote_identifier},
    models::{ExportArtifact, PersistOutcome, ResultSet, CSV_CONTENT_TYPE, DEFAULT_EXPORT_FILE_NAME},
    query::QueryExecutor,
};

/// Namespace persisted tables land in unless configured otherwise
pub const DEFAULT_PERSIST_NAMESPACE: &str = "agent.shuttler_exports";

/// Turns result sets into files and warehouse tables
#[derive(Debug, Clone)]
pub struct ResultMaterializer {
    namespace: String,
    executor: QueryExecutor,
}

impl Default for ResultMaterializer {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_PERSIST_NAMESPACE.to_string(),
            executor: QueryExecutor::new(),
        }
    }
}

impl ResultMaterializer {
    /// Materializer persisting into `namespace` (`catalog.schema`)
    pub fn new(namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        if !is_qualified_identifier(&namespace) {
            return Err(LinkError::ConfigurationError(format!(
                "Invalid persist namespace '{}'",
                namespace
            )));
        }
        Ok(Self {
            namespace,
            executor: QueryExecutor::new(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Serialize as CSV with a header row. A result set without rows yields
    /// the header only. SQL NULL becomes an empty field.
    pub fn to_exportable_text(result: &ResultSet) -> Vec<u8> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        // Writing into a Vec cannot fail on I/O; records are always well formed
        let _ = writer.write_record(&result.columns);
        for row in &result.rows {
            let _ = writer.write_record(row.iter().map(csv_field));
        }
        writer.into_inner().unwrap_or_default()
    }

    /// CSV export packaged for download
    pub fn export(result: &ResultSet, file_name: Option<&str>) -> ExportArtifact {
        let file_name = file_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_EXPORT_FILE_NAME);
        ExportArtifact {
            file_name: file_name.to_string(),
            content_type: CSV_CONTENT_TYPE.to_string(),
            bytes: Self::to_exportable_text(result),
        }
    }

    /// Statement that replaces `namespace.target` with the contents of `result`
    pub fn build_persist_statement(&self, result: &ResultSet, target: &str) -> Result<String> {
        if !is_simple_identifier(target) {
            return Err(LinkError::PersistError(format!(
                "Invalid target name '{}': use letters, digits and underscores",
                target
            )));
        }
        if result.columns.is_empty() {
            return Err(LinkError::PersistError(
                "Result set has no columns to persist".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for column in &result.columns {
            if !seen.insert(column.to_lowercase()) {
                return Err(LinkError::PersistError(format!(
                    "Duplicate column name '{}'",
                    column
                )));
            }
        }

        let qualified = format!("{}.{}", self.namespace, target);
        let column_list = result
            .columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>();

        if result.is_empty() {
            let typed = column_list
                .iter()
                .map(|c| format!("{} STRING", c))
                .collect::<Vec<_>>()
                .join(", ");
            return Ok(format!("CREATE OR REPLACE TABLE {} ({})", qualified, typed));
        }

        let values = result
            .rows
            .iter()
            .map(|row| {
                let cells = row.iter().map(json_to_sql_literal).collect::<Vec<_>>();
                format!("({})", cells.join(", "))
            })
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM VALUES {} AS t({})",
            qualified,
            values,
            column_list.join(", ")
        ))
    }

    /// Write `result` to `namespace.target`, replacing any existing object.
    ///
    /// Atomic replacement is the warehouse's guarantee: the prior object is
    /// either fully replaced or left untouched.
    pub async fn persist(
        &self,
        result: &ResultSet,
        target: &str,
        connection: &ConnectionManager,
    ) -> Result<PersistOutcome> {
        let statement = self.build_persist_statement(result, target)?;
        let qualified = format!("{}.{}", self.namespace, target);

        debug!(
            "[PERSIST] Writing {} rows to {}",
            result.row_count(),
            qualified
        );

        self.executor
            .execute_raw(&statement, connection)
            .await
            .map_err(|e| {
                warn!("[PERSIST] Write to {} failed: {}", qualified, e);
                match e {
                    LinkError::ExecutionError { message, .. } => LinkError::PersistError(message),
                    other => LinkError::PersistError(other.to_string()),
                }
            })?;

        Ok(PersistOutcome {
            target: qualified,
            rows_written: result.row_count(),
        })
    }
}

fn csv_field(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
    }
}
