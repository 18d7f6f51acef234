//! Output formatters for query results
//!
//! Renders result sets as a box table, pretty JSON or CSV, and single metric
//! readings as a labelled value.

use colored::*;
use querypilot_link::{ResultMaterializer, ResultSet};
use serde_json::Value as JsonValue;

use crate::{error::Result, metrics::MetricReading, session::OutputFormat};

/// Maximum column width before truncation
const MAX_COLUMN_WIDTH: usize = 32;

/// Minimum column width when resizing to fit the terminal
const MIN_COLUMN_WIDTH: usize = 6;

pub const EMPTY_RESULT_MESSAGE: &str = "Query executed, but returned no results.";

/// Formats query results for display
pub struct OutputFormatter {
    format: OutputFormat,
    color: bool,
}

impl OutputFormatter {
    /// Create a new formatter
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Get terminal width, defaulting to 80 if unavailable
    fn get_terminal_width() -> usize {
        if let Some((w, _h)) = term_size::dimensions() {
            w
        } else {
            80 // Default fallback
        }
    }

    /// Truncate a string to max width with ellipsis
    fn truncate_value(value: &str, max_width: usize) -> String {
        if value.chars().count() <= max_width {
            value.to_string()
        } else if max_width <= 3 {
            value.chars().take(max_width).collect()
        } else {
            let take = max_width - 3;
            format!("{}...", value.chars().take(take).collect::<String>())
        }
    }

    /// Format a result set in the configured format
    pub fn format_result(&self, result: &ResultSet) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.format_table(result)),
            OutputFormat::Json => self.format_json(result),
            OutputFormat::Csv => self.format_csv(result),
        }
    }

    /// Format as table
    fn format_table(&self, result: &ResultSet) -> String {
        let columns = &result.columns;

        let mut string_rows: Vec<Vec<String>> = Vec::with_capacity(result.rows.len());
        let mut col_widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
        for row in &result.rows {
            let mut srow: Vec<String> = Vec::with_capacity(columns.len());
            for (i, value) in row.iter().enumerate().take(columns.len()) {
                let value = Self::format_json_value(value);
                col_widths[i] = col_widths[i].max(value.chars().count());
                srow.push(value);
            }
            string_rows.push(srow);
        }

        if col_widths.is_empty() {
            return EMPTY_RESULT_MESSAGE.to_string();
        }

        Self::fit_to_terminal(&mut col_widths, Self::get_terminal_width());

        let mut output = String::new();
        output.push_str(&Self::border('┌', '┬', '┐', &col_widths));

        // Header row
        output.push('│');
        for (i, col) in columns.iter().enumerate() {
            output.push(' ');
            let truncated = Self::truncate_value(col, col_widths[i]);
            let padded = format!("{:width$}", truncated, width = col_widths[i]);
            if self.color {
                output.push_str(&padded.bold().to_string());
            } else {
                output.push_str(&padded);
            }
            output.push_str(" │");
        }
        output.push('\n');

        output.push_str(&Self::border('├', '┼', '┤', &col_widths));

        for srow in &string_rows {
            output.push('│');
            for (i, value) in srow.iter().enumerate() {
                output.push(' ');
                let truncated = Self::truncate_value(value, col_widths[i]);
                output.push_str(&format!("{:width$}", truncated, width = col_widths[i]));
                output.push_str(" │");
            }
            output.push('\n');
        }

        output.push_str(&Self::border('└', '┴', '┘', &col_widths));

        if string_rows.is_empty() {
            output.push_str(EMPTY_RESULT_MESSAGE);
        } else {
            let row_count = string_rows.len();
            let row_label = if row_count == 1 { "row" } else { "rows" };
            output.push_str(&format!("({} {})", row_count, row_label));
        }

        output
    }

    fn border(left: char, mid: char, right: char, widths: &[usize]) -> String {
        let mut line = String::new();
        line.push(left);
        for (idx, width) in widths.iter().enumerate() {
            line.push_str(&"─".repeat(width + 2));
            line.push(if idx == widths.len() - 1 { right } else { mid });
        }
        line.push('\n');
        line
    }

    /// Shrink the widest columns until the table fits `terminal_width`
    fn fit_to_terminal(col_widths: &mut [usize], terminal_width: usize) {
        let column_count = col_widths.len();
        let border_padding = column_count * 3 + 1;
        let available = terminal_width
            .saturating_sub(border_padding)
            .max(column_count);

        let mut total_width: usize = col_widths.iter().sum();
        if total_width <= available {
            return;
        }

        for width in col_widths.iter_mut() {
            if *width > MAX_COLUMN_WIDTH {
                *width = MAX_COLUMN_WIDTH;
            }
        }
        total_width = col_widths.iter().sum();

        while total_width > available {
            let floor = if col_widths.iter().any(|w| *w > MIN_COLUMN_WIDTH) {
                MIN_COLUMN_WIDTH
            } else {
                1
            };
            match col_widths
                .iter()
                .enumerate()
                .filter(|(_, width)| **width > floor)
                .max_by_key(|(_, width)| **width)
                .map(|(idx, _)| idx)
            {
                Some(idx) => col_widths[idx] -= 1,
                None => break,
            }
            total_width = col_widths.iter().sum();
        }
    }

    /// Format as JSON: an array of objects keyed by column name
    fn format_json(&self, result: &ResultSet) -> Result<String> {
        let rows: Vec<serde_json::Map<String, JsonValue>> = result
            .rows
            .iter()
            .map(|row| {
                result
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect();
        let json = serde_json::json!({
            "columns": result.columns,
            "rows": rows,
            "row_count": result.row_count(),
        });
        serde_json::to_string_pretty(&json)
            .map_err(|e| crate::error::CLIError::FormatError(e.to_string()))
    }

    /// Format as CSV, identical to the export bytes
    fn format_csv(&self, result: &ResultSet) -> Result<String> {
        String::from_utf8(ResultMaterializer::to_exportable_text(result))
            .map(|s| s.trim_end_matches('\n').to_string())
            .map_err(|e| crate::error::CLIError::FormatError(e.to_string()))
    }

    /// Format a quick-analytics reading
    pub fn format_metric(&self, reading: &MetricReading) -> String {
        match self.format {
            OutputFormat::Json => serde_json::json!({
                "metric": reading.key,
                "label": reading.label,
                "value": reading.display_value(),
            })
            .to_string(),
            OutputFormat::Csv => format!("{},{}", reading.key, reading.display_value()),
            OutputFormat::Table => {
                if self.color {
                    format!(
                        "{}  {}",
                        reading.label.dimmed(),
                        reading.display_value().bold()
                    )
                } else {
                    format!("{}  {}", reading.label, reading.display_value())
                }
            }
        }
    }

    /// Format JSON value for table display
    fn format_json_value(value: &JsonValue) -> String {
        match value {
            JsonValue::Null => "NULL".to_string(),
            JsonValue::Bool(b) => b.to_string(),
            JsonValue::Number(n) => n.to_string(),
            JsonValue::String(s) => s.clone(),
            JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
        }
    }
}
