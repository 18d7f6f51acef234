//! Data dictionary loader
//!
//! The dictionary is a fixed CSV file listing tables and columns. Its bytes
//! are kept verbatim for export; parsing only feeds the table display.

use querypilot_link::{ExportArtifact, ResultSet, CSV_CONTENT_TYPE};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_DICTIONARY_PATH;
use crate::error::{CLIError, Result};

#[derive(Debug, Clone)]
pub struct DataDictionary {
    path: PathBuf,
    raw: Vec<u8>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataDictionary {
    /// Read and parse the dictionary file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path).map_err(|e| {
            CLIError::DictionaryError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut dictionary = Self::from_bytes(raw)?;
        dictionary.path = path.to_path_buf();
        Ok(dictionary)
    }

    /// Parse dictionary content already in memory
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(raw.as_slice());

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(CLIError::DictionaryError(
                "Dictionary file has no header row".to_string(),
            ));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        Ok(Self {
            path: PathBuf::from(DEFAULT_DICTIONARY_PATH),
            raw,
            headers,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The file content exactly as loaded
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Tabular view for the output formatter
    pub fn to_result_set(&self) -> ResultSet {
        let rows = self
            .rows
            .iter()
            .map(|row| row.iter().cloned().map(JsonValue::String).collect())
            .collect();
        ResultSet::new(self.headers.clone(), rows)
    }

    /// Verbatim copy of the file, named after it
    pub fn export(&self) -> ExportArtifact {
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_DICTIONARY_PATH)
            .to_string();
        ExportArtifact {
            file_name,
            content_type: CSV_CONTENT_TYPE.to_string(),
            bytes: self.raw.clone(),
        }
    }
}
