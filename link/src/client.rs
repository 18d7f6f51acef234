//! HTTP driver for the SQL Statement Execution API.
//!
//! Statements are submitted with `POST /api/2.0/sql/statements`, polled with
//! `GET /api/2.0/sql/statements/{id}` while pending, and their inline result
//! chunks are followed until exhausted.

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::{
    credentials::WarehouseCredentials,
    error::TransportError,
    models::statement::{
        decode_row, ApiErrorBody, ResultChunk, StatementRequest, StatementResponse, StatementState,
    },
    models::ConnectionOptions,
    transport::{StatementOutput, WarehouseDriver, WarehouseSession},
};

const STATEMENTS_PATH: &str = "/api/2.0/sql/statements";

/// Opens [`StatementApiSession`]s over HTTPS.
#[derive(Debug, Clone, Default)]
pub struct StatementApiDriver;

impl StatementApiDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WarehouseDriver for StatementApiDriver {
    async fn open(
        &self,
        credentials: &WarehouseCredentials,
        options: &ConnectionOptions,
    ) -> Result<Box<dyn WarehouseSession>, TransportError> {
        let base_url = normalize_base_url(&credentials.server_hostname)?;
        let warehouse_id = parse_warehouse_id(&credentials.http_path)?;

        let http_client = reqwest::Client::builder()
            .timeout(options.request_timeout())
            .connect_timeout(options.connect_timeout())
            // Keep idle connections so consecutive statements skip the TLS handshake
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .map_err(|e| TransportError::Protocol(e.to_string()))?;

        debug!(
            "[CONNECT] Opening session base_url={} warehouse_id={}",
            base_url, warehouse_id
        );

        let session = StatementApiSession {
            base_url,
            warehouse_id,
            access_token: credentials.access_token.clone(),
            http_client,
            options: options.clone(),
            closed: AtomicBool::new(false),
        };

        if options.probe_on_connect {
            let start = Instant::now();
            session.execute("SELECT 1").await?;
            debug!("[CONNECT] Probe succeeded in {:?}", start.elapsed());
        }

        Ok(Box::new(session))
    }
}

/// A session bound to one warehouse
pub struct StatementApiSession {
    base_url: String,
    warehouse_id: String,
    access_token: String,
    http_client: reqwest::Client,
    options: ConnectionOptions,
    closed: AtomicBool,
}

impl StatementApiSession {
    async fn submit(&self, statement: &str) -> Result<StatementResponse, TransportError> {
        let url = format!("{}{}", self.base_url, STATEMENTS_PATH);
        let request = StatementRequest::new(
            &self.warehouse_id,
            statement,
            self.options.wait_timeout_param(),
        );
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn fetch_status(&self, statement_id: &str) -> Result<StatementResponse, TransportError> {
        let url = format!("{}{}/{}", self.base_url, STATEMENTS_PATH, statement_id);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn fetch_chunk(&self, link: &str) -> Result<ResultChunk, TransportError> {
        let url = format!("{}{}", self.base_url, link);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| TransportError::Protocol(e.to_string()));
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        // Try to parse as an API error body to extract the message
        let (error_code, message) = match serde_json::from_str::<ApiErrorBody>(&error_text) {
            Ok(body) => (body.error_code, body.message.unwrap_or(error_text)),
            Err(_) => (None, error_text),
        };

        warn!(
            "[HTTP] Server error: status={} code={:?} message=\"{}\"",
            status, error_code, message
        );

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(TransportError::Unauthorized(format!(
                "{} ({})",
                message, status
            )));
        }

        Err(TransportError::Statement {
            error_code,
            message: format!("{} ({})", message, status),
        })
    }

    /// Poll until the statement leaves PENDING/RUNNING
    async fn wait_for_terminal(
        &self,
        mut response: StatementResponse,
    ) -> Result<StatementResponse, TransportError> {
        while !response.status.state.is_terminal() {
            debug!(
                "[QUERY] Statement {} is {:?}; polling",
                response.statement_id, response.status.state
            );
            tokio::time::sleep(self.options.poll_interval()).await;
            response = self.fetch_status(&response.statement_id).await?;
        }
        Ok(response)
    }

    async fn collect_rows(
        &self,
        first: Option<ResultChunk>,
        types: &[Option<String>],
    ) -> Result<Vec<Vec<JsonValue>>, TransportError> {
        let mut rows = Vec::new();
        let mut chunk = first;
        while let Some(current) = chunk.take() {
            if let Some(data) = current.data_array {
                rows.extend(data.into_iter().map(|row| decode_row(types, row)));
            }
            if let Some(link) = current.next_chunk_internal_link {
                chunk = Some(self.fetch_chunk(&link).await?);
            }
        }
        Ok(rows)
    }
}

#[async_trait]
impl WarehouseSession for StatementApiSession {
    async fn execute(&self, statement: &str) -> Result<StatementOutput, TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Network("session is closed".to_string()));
        }

        let start = Instant::now();
        let submitted = self.submit(statement).await?;
        let response = self.wait_for_terminal(submitted).await?;

        let state = response.status.state;
        match state {
            StatementState::Succeeded => {
                let columns = response.column_names();
                let types = response.column_types();
                let rows = self.collect_rows(response.result, &types).await?;
                debug!(
                    "[QUERY] Statement succeeded: columns={} rows={} total_ms={}",
                    columns.len(),
                    rows.len(),
                    start.elapsed().as_millis()
                );
                Ok(StatementOutput { columns, rows })
            }
            StatementState::Failed => {
                let (error_code, message) = match response.status.error {
                    Some(err) => (
                        err.error_code,
                        err.message
                            .unwrap_or_else(|| "Statement failed without a message".to_string()),
                    ),
                    None => (None, "Statement failed without a message".to_string()),
                };
                Err(TransportError::Statement {
                    error_code,
                    message,
                })
            }
            StatementState::Canceled | StatementState::Closed => Err(TransportError::Statement {
                error_code: None,
                message: format!(
                    "Statement {} was {:?} by the warehouse",
                    response.statement_id, state
                ),
            }),
            other => Err(TransportError::Protocol(format!(
                "Unexpected statement state {:?}",
                other
            ))),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("[CONNECT] Session closed for warehouse {}", self.warehouse_id);
        }
        Ok(())
    }
}

/// Turn a configured hostname into a base URL (`https://` unless a scheme is given)
pub fn normalize_base_url(hostname: &str) -> Result<String, TransportError> {
    let trimmed = hostname.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(TransportError::Protocol(
            "Server hostname is empty".to_string(),
        ));
    }
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{}", trimmed))
    }
}

/// Extract the warehouse id from `/sql/1.0/warehouses/<id>` (or `/endpoints/<id>`)
pub fn parse_warehouse_id(http_path: &str) -> Result<String, TransportError> {
    let segments: Vec<&str> = http_path
        .trim()
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match segments.as_slice() {
        ["sql", _version, "warehouses" | "endpoints", id]
            if id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
        {
            Ok((*id).to_string())
        }
        _ => Err(TransportError::Protocol(format!(
            "Malformed warehouse endpoint path '{}': expected /sql/1.0/warehouses/<id>",
            http_path
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("adb-1.azuredatabricks.net").unwrap(),
            "https://adb-1.azuredatabricks.net"
        );
        assert_eq!(
            normalize_base_url("https://adb-1.azuredatabricks.net/").unwrap(),
            "https://adb-1.azuredatabricks.net"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8080").unwrap(),
            "http://localhost:8080"
        );
        assert!(normalize_base_url("  ").is_err());
    }

    #[test]
    fn test_parse_warehouse_id() {
        assert_eq!(
            parse_warehouse_id("/sql/1.0/warehouses/abc123def").unwrap(),
            "abc123def"
        );
        assert_eq!(
            parse_warehouse_id("sql/1.0/endpoints/abc-123/").unwrap(),
            "abc-123"
        );
        assert!(parse_warehouse_id("/sql/protocolv1/o/123/0123-abc").is_err());
        assert!(parse_warehouse_id("/sql/1.0/warehouses/").is_err());
        assert!(parse_warehouse_id("/sql/1.0/warehouses/a b").is_err());
        assert!(parse_warehouse_id("").is_err());
    }

    #[tokio::test]
    async fn test_open_rejects_malformed_endpoint_without_network() {
        let driver = StatementApiDriver::new();
        let creds = WarehouseCredentials::new("adb-1.azuredatabricks.net", "/not/a/warehouse", "t");
        let result = driver.open(&creds, &ConnectionOptions::default()).await;
        assert!(matches!(result, Err(TransportError::Protocol(_))));
    }
}
