use serde::{Deserialize, Serialize};

/// Content type attached to exported result files
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// File name used when the caller does not supply one
pub const DEFAULT_EXPORT_FILE_NAME: &str = "results.csv";

/// A downloadable rendering of a result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
