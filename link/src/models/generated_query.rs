use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sanitize::sanitize;

/// SQL text produced by the AI function, already sanitized
///
/// Every constructor, deserialization included, runs [`sanitize`], so a
/// `GeneratedQuery` never holds code fences, a `Generated SQL:` label, or a
/// trailing terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct GeneratedQuery(String);

impl GeneratedQuery {
    /// Sanitize a raw AI response. Returns `None` if nothing is left.
    pub fn from_response(raw: &str) -> Option<Self> {
        let cleaned = sanitize(raw);
        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for GeneratedQuery {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::from_response(&raw).ok_or_else(|| "generated query is empty".to_string())
    }
}

impl From<GeneratedQuery> for String {
    fn from(query: GeneratedQuery) -> Self {
        query.0
    }
}

impl fmt::Display for GeneratedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GeneratedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
