use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Tabular result of one successful statement
///
/// Columns keep the order the warehouse reported. Every row has exactly one
/// value per column. A `ResultSet` with zero rows is still a successful
/// result and is distinct from "no result" (`Option::None` at the caller).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names in warehouse order
    pub columns: Vec<String>,

    /// Rows aligned to `columns`
    pub rows: Vec<Vec<JsonValue>>,
}

impl ResultSet {
    /// Build a result set, padding or truncating rows to the column count
    pub fn new(columns: Vec<String>, rows: Vec<Vec<JsonValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, JsonValue::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Result set with a header and no rows
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name (case-insensitive, first match)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Value at `row` for the named column
    pub fn value(&self, row: usize, column: &str) -> Option<&JsonValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// First cell of the first row, if any
    pub fn first_value(&self) -> Option<&JsonValue> {
        self.rows.first()?.first()
    }

    /// Get a row as a HashMap by index (for convenience)
    pub fn row_as_map(&self, row_idx: usize) -> Option<HashMap<String, JsonValue>> {
        let row = self.rows.get(row_idx)?;
        let mut map = HashMap::with_capacity(self.columns.len());
        for (name, value) in self.columns.iter().zip(row.iter()) {
            map.insert(name.clone(), value.clone());
        }
        Some(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_are_aligned_to_columns() {
        let rs = ResultSet::new(
            vec!["a".into(), "b".into()],
            vec![vec![json!(1)], vec![json!(1), json!(2), json!(3)]],
        );
        assert_eq!(rs.rows[0], vec![json!(1), JsonValue::Null]);
        assert_eq!(rs.rows[1], vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_empty_keeps_columns() {
        let rs = ResultSet::empty(vec!["total_rides".into()]);
        assert!(rs.is_empty());
        assert_eq!(rs.columns, vec!["total_rides".to_string()]);
        assert_eq!(rs.first_value(), None);
    }

    #[test]
    fn test_value_lookup_by_name() {
        let rs = ResultSet::new(vec!["Revenue".into()], vec![vec![json!("1250.5")]]);
        assert_eq!(rs.value(0, "revenue"), Some(&json!("1250.5")));
        assert_eq!(rs.value(1, "revenue"), None);
        assert_eq!(rs.value(0, "missing"), None);
        assert_eq!(
            rs.row_as_map(0).unwrap().get("Revenue"),
            Some(&json!("1250.5"))
        );
    }
}
