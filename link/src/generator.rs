//! Natural-language to SQL generation.
//!
//! The question is embedded as a string literal in a one-row, one-column call
//! to a remote AI function. The single returned value is sanitized into a
//! [`GeneratedQuery`].

use log::{debug, warn};
use serde_json::Value as JsonValue;

use crate::{
    connection::ConnectionManager,
    error::{LinkError, Result},
    literal::{escape_single_quotes, is_qualified_identifier},
    models::GeneratedQuery,
    query::QueryExecutor,
};

/// Remote function used when none is configured
pub const DEFAULT_AI_FUNCTION: &str = "agent.ai.shuttlers_insight";

/// Alias of the single column the invocation returns
pub const GENERATED_COLUMN: &str = "generated_query";

/// Asks the warehouse's AI function to write SQL for a question
#[derive(Debug, Clone)]
pub struct NaturalLanguageQueryGenerator {
    function_name: String,
    executor: QueryExecutor,
}

impl Default for NaturalLanguageQueryGenerator {
    fn default() -> Self {
        Self {
            function_name: DEFAULT_AI_FUNCTION.to_string(),
            executor: QueryExecutor::new(),
        }
    }
}

impl NaturalLanguageQueryGenerator {
    /// Generator calling `function_name` (a dotted identifier such as
    /// `catalog.schema.fn`)
    pub fn new(function_name: impl Into<String>) -> Result<Self> {
        let function_name = function_name.into();
        if !is_qualified_identifier(&function_name) {
            return Err(LinkError::ConfigurationError(format!(
                "Invalid AI function name '{}'",
                function_name
            )));
        }
        Ok(Self {
            function_name,
            executor: QueryExecutor::new(),
        })
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Statement text sent to the warehouse for `question`.
    ///
    /// Every `'` in the question is doubled before embedding.
    pub fn build_invocation(&self, question: &str) -> String {
        format!(
            "SELECT {}('{}') AS {}",
            self.function_name,
            escape_single_quotes(question),
            GENERATED_COLUMN
        )
    }

    /// Generate SQL for `question`.
    ///
    /// Fails with [`LinkError::NotConnected`] (no remote call) when there is
    /// no live session, and with [`LinkError::GenerationError`] when the
    /// call errors, returns no rows, or returns no usable text.
    pub async fn generate(
        &self,
        question: &str,
        connection: &ConnectionManager,
    ) -> Result<GeneratedQuery> {
        if !connection.is_connected() {
            return Err(LinkError::NotConnected);
        }

        let invocation = self.build_invocation(question);
        debug!(
            "[GENERATE] Requesting SQL from {} (question_len={})",
            self.function_name,
            question.len()
        );

        let result = self
            .executor
            .execute_raw(&invocation, connection)
            .await
            .map_err(|e| match e {
                LinkError::NotConnected => LinkError::NotConnected,
                LinkError::ExecutionError { message, .. } => LinkError::GenerationError(message),
                other => LinkError::GenerationError(other.to_string()),
            })?;

        let raw = match result.first_value() {
            None => {
                warn!("[GENERATE] AI function returned no rows");
                return Err(LinkError::GenerationError(
                    "AI function returned no rows".to_string(),
                ));
            }
            Some(JsonValue::String(text)) => text.clone(),
            Some(JsonValue::Null) => {
                return Err(LinkError::GenerationError(
                    "AI function returned NULL".to_string(),
                ))
            }
            Some(other) => {
                return Err(LinkError::GenerationError(format!(
                    "AI function returned a non-text value: {}",
                    other
                )))
            }
        };

        let generated = GeneratedQuery::from_response(&raw).ok_or_else(|| {
            LinkError::GenerationError("AI function returned empty SQL".to_string())
        })?;
        debug!("[GENERATE] Generated {} chars of SQL", generated.as_str().len());
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_escapes_quotes() {
        let generator = NaturalLanguageQueryGenerator::default();
        let sql = generator.build_invocation("It's a test");
        assert_eq!(
            sql,
            "SELECT agent.ai.shuttlers_insight('It''s a test') AS generated_query"
        );
    }

    #[test]
    fn test_invocation_neutralizes_breakout_attempt() {
        let generator = NaturalLanguageQueryGenerator::default();
        let sql = generator.build_invocation("x'); DROP TABLE rides; --");
        let literal = sql
            .strip_prefix("SELECT agent.ai.shuttlers_insight('")
            .and_then(|s| s.strip_suffix("') AS generated_query"))
            .unwrap();
        // Inside the literal, quotes only ever appear in doubled pairs
        assert_eq!(literal.replace("''", "").matches('\'').count(), 0);
    }

    #[test]
    fn test_function_name_validation() {
        assert!(NaturalLanguageQueryGenerator::new("main.ai.ask").is_ok());
        assert!(matches!(
            NaturalLanguageQueryGenerator::new("ai.ask('x')"),
            Err(LinkError::ConfigurationError(_))
        ));
    }
}
