use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection-level options for the warehouse client.
///
/// These options control:
/// - How long the TCP/TLS handshake and each HTTP request may take
/// - How long the warehouse holds a statement before answering `PENDING`
/// - How often a pending statement is polled afterwards
///
/// # Example
///
/// ```rust
/// use querypilot_link::ConnectionOptions;
///
/// let options = ConnectionOptions::default()
///     .with_wait_timeout_secs(30)
///     .with_poll_interval_ms(250);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Timeout for a single HTTP request.
    /// Default: 120 seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Seconds the warehouse waits for a statement before replying with a
    /// pending status. The statement API accepts 0 or 5..=50.
    /// Default: 30 seconds
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Delay between polls of a pending statement.
    /// Default: 500ms
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Run `SELECT 1` while connecting so bad credentials fail at connect time.
    /// Default: true
    #[serde(default = "default_probe_on_connect")]
    pub probe_on_connect: bool,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_wait_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_probe_on_connect() -> bool {
    true
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            wait_timeout_secs: default_wait_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            probe_on_connect: default_probe_on_connect(),
        }
    }
}

impl ConnectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Values outside the accepted window are clamped when sent (1..=4 becomes 5, >50 becomes 50)
    pub fn with_wait_timeout_secs(mut self, secs: u64) -> Self {
        self.wait_timeout_secs = secs;
        self
    }

    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn with_probe_on_connect(mut self, probe: bool) -> Self {
        self.probe_on_connect = probe;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Wait timeout as the statement API expects it (`"30s"`)
    pub fn wait_timeout_param(&self) -> String {
        let secs = match self.wait_timeout_secs {
            0 => 0,
            1..=4 => 5,
            s => s.min(50),
        };
        format!("{}s", secs)
    }
}
