//! SQL literal and identifier embedding.
//!
//! Values that end up inside statement text (user questions, result cells
//! written back by persist) go through these helpers. Single quotes are
//! doubled; nothing else is rewritten.

use serde_json::Value as JsonValue;

/// Escape text for use inside a single-quoted SQL string literal
pub fn escape_single_quotes(text: &str) -> String {
    text.replace('\'', "''")
}

/// Render text as a complete single-quoted SQL string literal
pub fn quote_string(text: &str) -> String {
    format!("'{}'", escape_single_quotes(text))
}

/// Render a back-quoted identifier (backticks inside are doubled)
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// True for `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_simple_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// True for one or more simple identifiers joined by dots (`catalog.schema.fn`)
pub fn is_qualified_identifier(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_simple_identifier)
}

/// Render a result cell as a SQL literal
pub fn json_to_sql_literal(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => quote_string(s),
        JsonValue::Array(_) | JsonValue::Object(_) => quote_string(&value.to_string()),
    }
}
