#![allow(dead_code)]
//! Scripted in-memory warehouse used by the integration tests.

use async_trait::async_trait;
use querypilot_link::{
    ConnectionOptions, StatementOutput, TransportError, WarehouseCredentials, WarehouseDriver,
    WarehouseSession,
};
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct WarehouseState {
    responses: VecDeque<Result<StatementOutput, TransportError>>,
    statements: Vec<String>,
    open_calls: usize,
    close_calls: usize,
    open_failure: Option<TransportError>,
    last_credentials: Option<WarehouseCredentials>,
}

/// Handle shared between a test and the driver it hands to the manager
#[derive(Clone, Default)]
pub struct ScriptedWarehouse {
    state: Arc<Mutex<WarehouseState>>,
}

impl ScriptedWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn driver(&self) -> ScriptedDriver {
        ScriptedDriver {
            warehouse: self.clone(),
        }
    }

    /// Queue a successful result
    pub fn push_rows(&self, columns: &[&str], rows: Vec<Vec<JsonValue>>) {
        self.state.lock().unwrap().responses.push_back(Ok(StatementOutput {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }));
    }

    /// Queue a failure
    pub fn push_error(&self, error: TransportError) {
        self.state.lock().unwrap().responses.push_back(Err(error));
    }

    /// Make the next `open` fail
    pub fn fail_next_open(&self, error: TransportError) {
        self.state.lock().unwrap().open_failure = Some(error);
    }

    pub fn statements(&self) -> Vec<String> {
        self.state.lock().unwrap().statements.clone()
    }

    pub fn open_calls(&self) -> usize {
        self.state.lock().unwrap().open_calls
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }

    pub fn last_credentials(&self) -> Option<WarehouseCredentials> {
        self.state.lock().unwrap().last_credentials.clone()
    }
}

pub struct ScriptedDriver {
    warehouse: ScriptedWarehouse,
}

#[async_trait]
impl WarehouseDriver for ScriptedDriver {
    async fn open(
        &self,
        credentials: &WarehouseCredentials,
        _options: &ConnectionOptions,
    ) -> Result<Box<dyn WarehouseSession>, TransportError> {
        let mut state = self.warehouse.state.lock().unwrap();
        state.open_calls += 1;
        state.last_credentials = Some(credentials.clone());
        if let Some(err) = state.open_failure.take() {
            return Err(err);
        }
        Ok(Box::new(ScriptedSession {
            warehouse: self.warehouse.clone(),
        }))
    }
}

struct ScriptedSession {
    warehouse: ScriptedWarehouse,
}

#[async_trait]
impl WarehouseSession for ScriptedSession {
    async fn execute(&self, statement: &str) -> Result<StatementOutput, TransportError> {
        let mut state = self.warehouse.state.lock().unwrap();
        state.statements.push(statement.to_string());
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(StatementOutput::default()))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.warehouse.state.lock().unwrap().close_calls += 1;
        Ok(())
    }
}

pub fn env_lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |name| {
        pairs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string())
    }
}

pub const VALID_ENV: &[(&str, &str)] = &[
    ("DATABRICKS_SERVER_HOSTNAME", "adb-1.azuredatabricks.net"),
    ("DATABRICKS_HTTP_PATH", "/sql/1.0/warehouses/abc123"),
    ("DATABRICKS_TOKEN", "dapi-test"),
];
