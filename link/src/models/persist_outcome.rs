use serde::{Deserialize, Serialize};

/// Outcome of writing a result set back to the warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistOutcome {
    /// Fully qualified object name (`namespace.target`)
    pub target: String,

    /// Number of rows written
    pub rows_written: usize,
}
