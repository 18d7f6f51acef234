//! Wire structures of the SQL Statement Execution API.
//!
//! Only the fields the client reads are modelled; unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Body of `POST /api/2.0/sql/statements`
#[derive(Debug, Clone, Serialize)]
pub struct StatementRequest {
    pub warehouse_id: String,
    pub statement: String,
    pub wait_timeout: String,
    pub on_wait_timeout: String,
    pub format: String,
    pub disposition: String,
}

impl StatementRequest {
    pub fn new(warehouse_id: &str, statement: &str, wait_timeout: String) -> Self {
        Self {
            warehouse_id: warehouse_id.to_string(),
            statement: statement.to_string(),
            wait_timeout,
            on_wait_timeout: "CONTINUE".to_string(),
            format: "JSON_ARRAY".to_string(),
            disposition: "INLINE".to_string(),
        }
    }
}

/// Lifecycle state reported for a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
    #[serde(other)]
    Unknown,
}

impl StatementState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StatementState::Pending | StatementState::Running)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatementStatus {
    pub state: StatementState,
    #[serde(default)]
    pub error: Option<ServiceError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub position: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSchema {
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultManifest {
    #[serde(default)]
    pub schema: ResultSchema,
    #[serde(default)]
    pub total_row_count: Option<u64>,
}

/// One inline chunk of result rows
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultChunk {
    #[serde(default)]
    pub data_array: Option<Vec<Vec<JsonValue>>>,
    #[serde(default)]
    pub next_chunk_internal_link: Option<String>,
}

/// Response of the submit and get-status endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct StatementResponse {
    pub statement_id: String,
    pub status: StatementStatus,
    #[serde(default)]
    pub manifest: Option<ResultManifest>,
    #[serde(default)]
    pub result: Option<ResultChunk>,
}

impl StatementResponse {
    fn ordered_columns(&self) -> Vec<&ColumnInfo> {
        let Some(manifest) = &self.manifest else {
            return Vec::new();
        };
        let mut columns: Vec<&ColumnInfo> = manifest.schema.columns.iter().collect();
        columns.sort_by_key(|c| c.position.unwrap_or(usize::MAX));
        columns
    }

    /// Column names ordered by reported position
    pub fn column_names(&self) -> Vec<String> {
        self.ordered_columns()
            .into_iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Column type names, aligned with [`Self::column_names`]
    pub fn column_types(&self) -> Vec<Option<String>> {
        self.ordered_columns()
            .into_iter()
            .map(|c| c.type_name.clone())
            .collect()
    }
}

/// Convert one `JSON_ARRAY` cell to a typed JSON value.
///
/// The warehouse sends every non-NULL value as a string. Integral and
/// fractional types become numbers and `BOOLEAN` becomes a bool. Anything that
/// does not parse, and every other type, stays a string.
pub fn decode_cell(type_name: Option<&str>, value: JsonValue) -> JsonValue {
    let JsonValue::String(text) = value else {
        return value;
    };
    let kind = type_name.unwrap_or("").trim().to_ascii_uppercase();

    let decoded = match kind.as_str() {
        "BYTE" | "TINYINT" | "SHORT" | "SMALLINT" | "INT" | "INTEGER" | "LONG" | "BIGINT" => {
            text.trim().parse::<i64>().ok().map(JsonValue::from)
        }
        "FLOAT" | "DOUBLE" => parse_fractional(&text),
        "DECIMAL" => text
            .trim()
            .parse::<i64>()
            .ok()
            .map(JsonValue::from)
            .or_else(|| parse_fractional(&text)),
        "BOOLEAN" => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Some(JsonValue::Bool(true)),
            "false" => Some(JsonValue::Bool(false)),
            _ => None,
        },
        _ => None,
    };

    decoded.unwrap_or(JsonValue::String(text))
}

/// Decode every cell of a row against the column types
pub fn decode_row(types: &[Option<String>], row: Vec<JsonValue>) -> Vec<JsonValue> {
    row.into_iter()
        .enumerate()
        .map(|(i, cell)| decode_cell(types.get(i).and_then(|t| t.as_deref()), cell))
        .collect()
}

fn parse_fractional(text: &str) -> Option<JsonValue> {
    text.trim()
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(JsonValue::Number)
}

/// Error body returned with non-2xx HTTP statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
