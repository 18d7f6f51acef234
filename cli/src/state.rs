//! Session state and the transitions that drive it
//!
//! `SessionState` is a value: every transition takes `&self` and hands back
//! a new state, so a failed action can never leave a half-updated state
//! behind. The connection is owned separately by the caller and passed in.
//!
//! Transitions:
//!
//! | action | precondition | fields touched on success |
//! |---|---|---|
//! | [`SessionState::select_tab`] | none | tab; draft cleared off the assistant tab |
//! | [`SessionState::submit_question`] | connected | draft |
//! | [`SessionState::run_generated`] | draft present | assistant result |
//! | [`SessionState::run_custom_sql`] | non-blank text | custom result |
//! | [`SessionState::run_canned_metric`] | connected | none |

use querypilot_link::{
    ConnectionManager, ExportArtifact, GeneratedQuery, LinkError, NaturalLanguageQueryGenerator,
    PersistOutcome, QueryExecutor, ResultMaterializer, ResultSet,
};
use std::fmt;
use std::str::FromStr;

use crate::metrics::{CannedMetric, MetricReading};

/// Workspace tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Ask a question, review the generated SQL, run it
    #[default]
    Assistant,
    /// Canned single-value metrics
    QuickAnalytics,
    /// Hand-written SQL
    CustomSql,
    /// Reference data dictionary
    Dictionary,
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Tab::Assistant,
        Tab::QuickAnalytics,
        Tab::CustomSql,
        Tab::Dictionary,
    ];

    /// Short name used by `\tab` and the prompt
    pub fn name(self) -> &'static str {
        match self {
            Tab::Assistant => "assistant",
            Tab::QuickAnalytics => "quick",
            Tab::CustomSql => "custom",
            Tab::Dictionary => "dictionary",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Assistant => "AI Assistant",
            Tab::QuickAnalytics => "Quick Analytics",
            Tab::CustomSql => "Custom SQL",
            Tab::Dictionary => "Data Dictionary",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "assistant" | "ai" | "ask" => Ok(Tab::Assistant),
            "quick" | "analytics" | "metrics" => Ok(Tab::QuickAnalytics),
            "custom" | "sql" => Ok(Tab::CustomSql),
            "dictionary" | "dict" => Ok(Tab::Dictionary),
            other => Err(format!(
                "Unknown tab '{}' (expected assistant, quick, custom or dictionary)",
                other
            )),
        }
    }
}

/// A question together with the SQL generated for it
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub question: String,
    pub generated: GeneratedQuery,
}

/// Components the remote transitions route to
#[derive(Debug, Clone, Default)]
pub struct QueryServices {
    pub generator: NaturalLanguageQueryGenerator,
    pub executor: QueryExecutor,
    pub materializer: ResultMaterializer,
}

impl QueryServices {
    pub fn new(generator: NaturalLanguageQueryGenerator, materializer: ResultMaterializer) -> Self {
        Self {
            generator,
            executor: QueryExecutor::new(),
            materializer,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    active_tab: Tab,
    draft: Option<QuestionDraft>,
    assistant_result: Option<ResultSet>,
    custom_result: Option<ResultSet>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn draft(&self) -> Option<&QuestionDraft> {
        self.draft.as_ref()
    }

    pub fn question(&self) -> Option<&str> {
        self.draft.as_ref().map(|d| d.question.as_str())
    }

    pub fn generated_query(&self) -> Option<&GeneratedQuery> {
        self.draft.as_ref().map(|d| &d.generated)
    }

    /// Result retained for a tab. Only the assistant and custom SQL tabs
    /// keep results.
    pub fn result_for(&self, tab: Tab) -> Option<&ResultSet> {
        match tab {
            Tab::Assistant => self.assistant_result.as_ref(),
            Tab::CustomSql => self.custom_result.as_ref(),
            Tab::QuickAnalytics | Tab::Dictionary => None,
        }
    }

    /// Result for the active tab
    pub fn current_result(&self) -> Option<&ResultSet> {
        self.result_for(self.active_tab)
    }

    /// Switch tabs. Leaving the assistant tab discards the question and its
    /// generated SQL; results are kept.
    pub fn select_tab(&self, tab: Tab) -> SessionState {
        let mut next = self.clone();
        next.active_tab = tab;
        if tab != Tab::Assistant {
            next.draft = None;
        }
        next
    }

    /// Generate SQL for `question` and store both as the draft.
    pub async fn submit_question(
        &self,
        question: &str,
        services: &QueryServices,
        connection: &ConnectionManager,
    ) -> Result<SessionState, LinkError> {
        if !connection.is_connected() {
            return Err(LinkError::NotConnected);
        }

        let generated = services.generator.generate(question, connection).await?;

        let mut next = self.clone();
        next.draft = Some(QuestionDraft {
            question: question.to_string(),
            generated,
        });
        Ok(next)
    }

    /// Execute the draft's generated SQL and store the result.
    pub async fn run_generated(
        &self,
        services: &QueryServices,
        connection: &ConnectionManager,
    ) -> Result<SessionState, LinkError> {
        let sql = match self.generated_query() {
            Some(generated) if !generated.as_str().trim().is_empty() => generated.as_str(),
            _ => return Err(LinkError::NoGeneratedQuery),
        };

        let result = services.executor.execute(sql, connection).await?;

        let mut next = self.clone();
        next.assistant_result = Some(result);
        Ok(next)
    }

    /// Execute user-supplied SQL and store the result in the custom slot.
    pub async fn run_custom_sql(
        &self,
        text: &str,
        services: &QueryServices,
        connection: &ConnectionManager,
    ) -> Result<SessionState, LinkError> {
        if text.trim().is_empty() {
            return Err(LinkError::ExecutionError {
                message: "empty statement".to_string(),
                connection_lost: false,
            });
        }

        let result = services.executor.execute(text, connection).await?;

        let mut next = self.clone();
        next.custom_result = Some(result);
        Ok(next)
    }

    /// Run a fixed metric query. The reading is returned for display and
    /// nothing is stored.
    pub async fn run_canned_metric(
        &self,
        metric: &CannedMetric,
        services: &QueryServices,
        connection: &ConnectionManager,
    ) -> Result<MetricReading, LinkError> {
        let result = services.executor.execute(metric.sql, connection).await?;
        Ok(MetricReading::from_result(metric, &result))
    }

    /// CSV artifact for the result kept on `tab`, if there is one.
    pub fn export_result(&self, tab: Tab, file_name: Option<&str>) -> Option<ExportArtifact> {
        self.result_for(tab)
            .map(|result| ResultMaterializer::export(result, file_name))
    }

    /// Write the result kept on `tab` back to the warehouse.
    pub async fn persist_result(
        &self,
        tab: Tab,
        target: &str,
        services: &QueryServices,
        connection: &ConnectionManager,
    ) -> Result<PersistOutcome, LinkError> {
        let result = self.result_for(tab).ok_or_else(|| {
            LinkError::PersistError(format!("No {} result to save", tab.title()))
        })?;
        services
            .materializer
            .persist(result, target, connection)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(question: &str, sql: &str) -> QuestionDraft {
        QuestionDraft {
            question: question.to_string(),
            generated: GeneratedQuery::from_response(sql).unwrap(),
        }
    }

    fn populated() -> SessionState {
        SessionState {
            active_tab: Tab::Assistant,
            draft: Some(draft("how many rides", "SELECT 1")),
            assistant_result: Some(ResultSet::new(vec!["n".into()], vec![vec![json!(1)]])),
            custom_result: None,
        }
    }

    #[test]
    fn test_tab_parsing() {
        assert_eq!("quick".parse::<Tab>().unwrap(), Tab::QuickAnalytics);
        assert_eq!("SQL".parse::<Tab>().unwrap(), Tab::CustomSql);
        assert_eq!("dict".parse::<Tab>().unwrap(), Tab::Dictionary);
        assert!("charts".parse::<Tab>().is_err());
        for tab in Tab::ALL {
            assert_eq!(tab.name().parse::<Tab>().unwrap(), tab);
        }
    }

    #[test]
    fn test_leaving_assistant_clears_draft_only() {
        let state = populated();
        for tab in [Tab::QuickAnalytics, Tab::CustomSql, Tab::Dictionary] {
            let next = state.select_tab(tab);
            assert_eq!(next.active_tab(), tab);
            assert!(next.question().is_none());
            assert!(next.generated_query().is_none());
            assert_eq!(
                next.result_for(Tab::Assistant),
                state.result_for(Tab::Assistant)
            );
        }
        // original untouched
        assert!(state.draft().is_some());
    }

    #[test]
    fn test_staying_on_assistant_keeps_draft() {
        let state = populated();
        let next = state.select_tab(Tab::Assistant);
        assert_eq!(next, state);
    }

    #[test]
    fn test_results_are_per_tab() {
        let state = populated();
        assert!(state.result_for(Tab::Assistant).is_some());
        assert!(state.result_for(Tab::CustomSql).is_none());
        assert!(state.result_for(Tab::QuickAnalytics).is_none());
        assert!(state.select_tab(Tab::CustomSql).current_result().is_none());
    }

    #[test]
    fn test_export_needs_a_result() {
        let state = populated();
        let artifact = state.export_result(Tab::Assistant, None).unwrap();
        assert_eq!(artifact.file_name, "results.csv");
        assert_eq!(artifact.bytes, b"n\n1\n".to_vec());
        assert!(state.export_result(Tab::CustomSql, None).is_none());
    }
}
