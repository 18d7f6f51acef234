//! Warehouse connection lifecycle.
//!
//! [`ConnectionManager`] owns the credentials and the single live session of
//! one user session:
//!
//! - `Disconnected → Connecting → Connected` on a successful [`connect`]
//! - back to `Disconnected` on [`close`] or a failed connect
//! - exactly one attempt per call; retrying is the caller's decision
//!
//! [`connect`]: ConnectionManager::connect
//! [`close`]: ConnectionManager::close

use log::{debug, warn};
use std::fmt;
use std::time::Instant;

use crate::{
    client::StatementApiDriver,
    credentials::WarehouseCredentials,
    error::{LinkError, Result},
    models::ConnectionOptions,
    transport::{WarehouseDriver, WarehouseSession},
};

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        f.write_str(label)
    }
}

/// Owns the credentials and the live warehouse session
pub struct ConnectionManager {
    driver: Box<dyn WarehouseDriver>,
    options: ConnectionOptions,
    credentials: Option<WarehouseCredentials>,
    session: Option<Box<dyn WarehouseSession>>,
    state: ConnectionState,
}

impl ConnectionManager {
    /// Manager using the given driver and default options
    pub fn new(driver: impl WarehouseDriver + 'static) -> Self {
        Self {
            driver: Box::new(driver),
            options: ConnectionOptions::default(),
            credentials: None,
            session: None,
            state: ConnectionState::Disconnected,
        }
    }

    /// Manager speaking the HTTP statement API
    pub fn http(options: ConnectionOptions) -> Self {
        Self::new(StatementApiDriver::new()).with_options(options)
    }

    pub fn with_options(mut self, options: ConnectionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected && self.session.is_some()
    }

    /// Credentials of the current (or last attempted) connection
    pub fn credentials(&self) -> Option<&WarehouseCredentials> {
        self.credentials.as_ref()
    }

    /// Read the three credential values from the environment and connect.
    ///
    /// Missing values fail with [`LinkError::ConfigurationError`] before any
    /// connection attempt.
    pub async fn connect_from_environment(&mut self) -> Result<()> {
        let credentials = WarehouseCredentials::from_env()?;
        self.connect_with(credentials).await
    }

    /// Like [`connect_from_environment`](Self::connect_from_environment) with a
    /// caller-supplied variable lookup
    pub async fn connect_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = WarehouseCredentials::from_lookup(lookup)?;
        self.connect_with(credentials).await
    }

    /// Establish a session. Any existing session is closed first.
    pub async fn connect(
        &mut self,
        server_hostname: &str,
        http_path: &str,
        access_token: &str,
    ) -> Result<()> {
        self.connect_with(WarehouseCredentials::new(
            server_hostname,
            http_path,
            access_token,
        ))
        .await
    }

    async fn connect_with(&mut self, credentials: WarehouseCredentials) -> Result<()> {
        self.close().await;

        debug!(
            "[CONNECT] Connecting to host={} path={}",
            credentials.server_hostname, credentials.http_path
        );
        self.state = ConnectionState::Connecting;
        let start = Instant::now();

        let opened = self.driver.open(&credentials, &self.options).await;
        self.credentials = Some(credentials);

        match opened {
            Ok(session) => {
                self.session = Some(session);
                self.state = ConnectionState::Connected;
                debug!("[CONNECT] Connected in {:?}", start.elapsed());
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                warn!("[CONNECT] Connection failed after {:?}: {}", start.elapsed(), e);
                Err(LinkError::ConnectionError(e.remote_message()))
            }
        }
    }

    /// Release the session. Safe to call when already disconnected; never fails.
    pub async fn close(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.close().await {
                warn!("[CONNECT] Error while closing session: {}", e);
            }
            debug!("[CONNECT] Disconnected");
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Live session, or [`LinkError::NotConnected`]
    pub(crate) fn session(&self) -> Result<&dyn WarehouseSession> {
        match (&self.session, self.state) {
            (Some(session), ConnectionState::Connected) => Ok(session.as_ref()),
            _ => Err(LinkError::NotConnected),
        }
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state)
            .field("credentials", &self.credentials)
            .field("options", &self.options)
            .finish()
    }
}
