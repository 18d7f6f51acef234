#![allow(dead_code)]
//! Shared helpers for the CLI integration tests: an in-memory warehouse
//! that replays queued responses and records what it was sent.

use async_trait::async_trait;
use querypilot_link::{
    ConnectionManager, ConnectionOptions, StatementOutput, TransportError, WarehouseCredentials,
    WarehouseDriver, WarehouseSession,
};
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<StatementOutput, TransportError>>,
    statements: Vec<String>,
    closed: usize,
}

#[derive(Clone, Default)]
pub struct FakeWarehouse {
    script: Arc<Mutex<Script>>,
}

impl FakeWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, columns: &[&str], rows: Vec<Vec<JsonValue>>) {
        self.script.lock().unwrap().responses.push_back(Ok(StatementOutput {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }));
    }

    pub fn fail(&self, error: TransportError) {
        self.script.lock().unwrap().responses.push_back(Err(error));
    }

    pub fn statements(&self) -> Vec<String> {
        self.script.lock().unwrap().statements.clone()
    }

    pub fn closed(&self) -> usize {
        self.script.lock().unwrap().closed
    }

    /// A manager already connected to this warehouse
    pub async fn connected(&self) -> ConnectionManager {
        let mut connection = ConnectionManager::new(FakeDriver {
            warehouse: self.clone(),
        });
        connection
            .connect("adb-1.azuredatabricks.net", "/sql/1.0/warehouses/abc123", "dapi-test")
            .await
            .expect("fake connect");
        connection
    }

    /// A manager that has never connected
    pub fn disconnected(&self) -> ConnectionManager {
        ConnectionManager::new(FakeDriver {
            warehouse: self.clone(),
        })
    }
}

struct FakeDriver {
    warehouse: FakeWarehouse,
}

#[async_trait]
impl WarehouseDriver for FakeDriver {
    async fn open(
        &self,
        _credentials: &WarehouseCredentials,
        _options: &ConnectionOptions,
    ) -> Result<Box<dyn WarehouseSession>, TransportError> {
        Ok(Box::new(FakeSession {
            warehouse: self.warehouse.clone(),
        }))
    }
}

struct FakeSession {
    warehouse: FakeWarehouse,
}

#[async_trait]
impl WarehouseSession for FakeSession {
    async fn execute(&self, statement: &str) -> Result<StatementOutput, TransportError> {
        let mut script = self.warehouse.script.lock().unwrap();
        script.statements.push(statement.to_string());
        script
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(StatementOutput::default()))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.warehouse.script.lock().unwrap().closed += 1;
        Ok(())
    }
}
