//! Executor, generator and materializer against a scripted warehouse.

mod common;

use common::{env_lookup, ScriptedWarehouse, VALID_ENV};
use querypilot_link::{
    ConnectionManager, LinkError, NaturalLanguageQueryGenerator, QueryExecutor,
    ResultMaterializer, ResultSet, TransportError,
};
use serde_json::json;

async fn connected(warehouse: &ScriptedWarehouse) -> ConnectionManager {
    let mut connection = ConnectionManager::new(warehouse.driver());
    connection
        .connect_from_lookup(env_lookup(VALID_ENV))
        .await
        .unwrap();
    connection
}

#[tokio::test]
async fn test_execute_sanitizes_before_submission() {
    let warehouse = ScriptedWarehouse::new();
    let connection = connected(&warehouse).await;
    warehouse.push_rows(&["n"], vec![vec![json!("1")]]);

    let result = QueryExecutor::new()
        .execute("```sql\nSELECT 1 AS n;\n```", &connection)
        .await
        .unwrap();

    assert_eq!(warehouse.statements(), vec!["SELECT 1 AS n".to_string()]);
    assert_eq!(result.columns, vec!["n".to_string()]);
    assert_eq!(result.rows, vec![vec![json!("1")]]);
}

#[tokio::test]
async fn test_zero_rows_is_a_result_not_an_error() {
    let warehouse = ScriptedWarehouse::new();
    let connection = connected(&warehouse).await;
    warehouse.push_rows(&["id", "fare"], vec![]);

    let result = QueryExecutor::new()
        .execute("SELECT id, fare FROM rides WHERE 1 = 0", &connection)
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.columns, vec!["id".to_string(), "fare".to_string()]);
}

#[tokio::test]
async fn test_remote_error_message_is_verbatim() {
    let warehouse = ScriptedWarehouse::new();
    let connection = connected(&warehouse).await;
    let remote = "[TABLE_OR_VIEW_NOT_FOUND] The table or view `ridez` cannot be found.";
    warehouse.push_error(TransportError::Statement {
        error_code: Some("BAD_REQUEST".into()),
        message: remote.into(),
    });

    let err = QueryExecutor::new()
        .execute("SELECT * FROM ridez", &connection)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LinkError::ExecutionError {
            message: remote.into(),
            connection_lost: false,
        }
    );
}

#[tokio::test]
async fn test_blank_sql_is_not_submitted() {
    let warehouse = ScriptedWarehouse::new();
    let connection = connected(&warehouse).await;

    let err = QueryExecutor::new()
        .execute("```sql\n;\n```", &connection)
        .await
        .unwrap_err();

    assert!(matches!(err, LinkError::ExecutionError { .. }));
    assert!(warehouse.statements().is_empty());
}

#[tokio::test]
async fn test_generate_escapes_and_sanitizes() {
    let warehouse = ScriptedWarehouse::new();
    let connection = connected(&warehouse).await;
    warehouse.push_rows(
        &["generated_query"],
        vec![vec![json!("```sql\nSELECT COUNT(*) FROM rides WHERE note = 'it''s';\n```")]],
    );

    let generated = NaturalLanguageQueryGenerator::default()
        .generate("It's a test", &connection)
        .await
        .unwrap();

    assert_eq!(
        generated.as_str(),
        "SELECT COUNT(*) FROM rides WHERE note = 'it''s'"
    );
    let sent = warehouse.statements();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("('It''s a test')"));
    assert!(!sent[0].contains("It's"));
}

#[tokio::test]
async fn test_generate_without_connection_makes_no_call() {
    let warehouse = ScriptedWarehouse::new();
    let connection = ConnectionManager::new(warehouse.driver());

    let err = NaturalLanguageQueryGenerator::default()
        .generate("how many rides today", &connection)
        .await
        .unwrap_err();

    assert_eq!(err, LinkError::NotConnected);
    assert!(warehouse.statements().is_empty());
}

#[tokio::test]
async fn test_generate_failures_are_generation_errors() {
    let warehouse = ScriptedWarehouse::new();
    let connection = connected(&warehouse).await;
    let generator = NaturalLanguageQueryGenerator::default();

    warehouse.push_rows(&["generated_query"], vec![]);
    let err = generator.generate("q", &connection).await.unwrap_err();
    assert!(matches!(err, LinkError::GenerationError(_)));

    warehouse.push_error(TransportError::Statement {
        error_code: None,
        message: "[UNRESOLVED_ROUTINE] agent.ai.shuttlers_insight".into(),
    });
    let err = generator.generate("q", &connection).await.unwrap_err();
    assert_eq!(
        err,
        LinkError::GenerationError("[UNRESOLVED_ROUTINE] agent.ai.shuttlers_insight".into())
    );

    warehouse.push_rows(&["generated_query"], vec![vec![serde_json::Value::Null]]);
    let err = generator.generate("q", &connection).await.unwrap_err();
    assert!(matches!(err, LinkError::GenerationError(_)));

    warehouse.push_rows(&["generated_query"], vec![vec![json!("```sql\n```")]]);
    let err = generator.generate("q", &connection).await.unwrap_err();
    assert!(matches!(err, LinkError::GenerationError(_)));
}

#[tokio::test]
async fn test_persist_writes_one_statement() {
    let warehouse = ScriptedWarehouse::new();
    let connection = connected(&warehouse).await;
    let result = ResultSet::new(
        vec!["total_rides".into()],
        vec![vec![json!(42)]],
    );

    let outcome = ResultMaterializer::default()
        .persist(&result, "rides_today", &connection)
        .await
        .unwrap();

    assert_eq!(outcome.target, "agent.shuttler_exports.rides_today");
    assert_eq!(outcome.rows_written, 1);
    assert_eq!(
        warehouse.statements(),
        vec![
            "CREATE OR REPLACE TABLE agent.shuttler_exports.rides_today AS SELECT * FROM VALUES (42) AS t(`total_rides`)"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_persist_failures_are_persist_errors() {
    let warehouse = ScriptedWarehouse::new();
    let result = ResultSet::new(vec!["a".into()], vec![vec![json!(1)]]);
    let materializer = ResultMaterializer::default();

    let disconnected = ConnectionManager::new(warehouse.driver());
    let err = materializer
        .persist(&result, "t", &disconnected)
        .await
        .unwrap_err();
    assert!(matches!(err, LinkError::PersistError(_)));

    let connection = connected(&warehouse).await;
    warehouse.push_error(TransportError::Statement {
        error_code: Some("PERMISSION_DENIED".into()),
        message: "User does not have CREATE on schema".into(),
    });
    let err = materializer
        .persist(&result, "t", &connection)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LinkError::PersistError("User does not have CREATE on schema".into())
    );
}
