//! Warehouse credentials.
//!
//! The three values needed to reach a SQL warehouse: server hostname, HTTP
//! endpoint path, and a personal access token. They are read from the
//! environment once per connection attempt.

use crate::error::{LinkError, Result};
use std::fmt;

/// Environment variable holding the workspace hostname
pub const ENV_SERVER_HOSTNAME: &str = "DATABRICKS_SERVER_HOSTNAME";

/// Environment variable holding the warehouse HTTP path
pub const ENV_HTTP_PATH: &str = "DATABRICKS_HTTP_PATH";

/// Environment variable holding the access token
pub const ENV_ACCESS_TOKEN: &str = "DATABRICKS_TOKEN";

/// Connection credentials for one warehouse.
///
/// `Debug` output redacts the access token.
#[derive(Clone, PartialEq, Eq)]
pub struct WarehouseCredentials {
    /// Workspace hostname (e.g., "adb-123.4.azuredatabricks.net")
    pub server_hostname: String,

    /// Warehouse endpoint path (e.g., "/sql/1.0/warehouses/abc123")
    pub http_path: String,

    /// Personal access token
    /// Note: never logged
    pub access_token: String,
}

impl WarehouseCredentials {
    pub fn new(
        server_hostname: impl Into<String>,
        http_path: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            server_hostname: server_hostname.into(),
            http_path: http_path.into(),
            access_token: access_token.into(),
        }
    }

    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary lookup function.
    ///
    /// Unset, empty, and whitespace-only values all count as missing. The
    /// error names every missing variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let hostname = read(ENV_SERVER_HOSTNAME);
        let http_path = read(ENV_HTTP_PATH);
        let token = read(ENV_ACCESS_TOKEN);

        match (hostname, http_path, token) {
            (Some(hostname), Some(http_path), Some(token)) => {
                Ok(Self::new(hostname, http_path, token))
            }
            (hostname, http_path, token) => {
                let mut missing = Vec::new();
                if hostname.is_none() {
                    missing.push(ENV_SERVER_HOSTNAME);
                }
                if http_path.is_none() {
                    missing.push(ENV_HTTP_PATH);
                }
                if token.is_none() {
                    missing.push(ENV_ACCESS_TOKEN);
                }
                Err(LinkError::ConfigurationError(format!(
                    "Missing warehouse credentials in environment: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl fmt::Debug for WarehouseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseCredentials")
            .field("server_hostname", &self.server_hostname)
            .field("http_path", &self.http_path)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_all_values_present() {
        let creds = WarehouseCredentials::from_lookup(lookup(&[
            (ENV_SERVER_HOSTNAME, "adb-1.azuredatabricks.net"),
            (ENV_HTTP_PATH, "/sql/1.0/warehouses/abc"),
            (ENV_ACCESS_TOKEN, " dapi123 "),
        ]))
        .unwrap();
        assert_eq!(creds.server_hostname, "adb-1.azuredatabricks.net");
        assert_eq!(creds.access_token, "dapi123");
    }

    #[test]
    fn test_missing_values_are_named() {
        let err = WarehouseCredentials::from_lookup(lookup(&[
            (ENV_SERVER_HOSTNAME, "adb-1.azuredatabricks.net"),
            (ENV_ACCESS_TOKEN, "   "),
        ]))
        .unwrap_err();
        match err {
            LinkError::ConfigurationError(msg) => {
                assert!(msg.contains(ENV_HTTP_PATH));
                assert!(msg.contains(ENV_ACCESS_TOKEN));
                assert!(!msg.contains(ENV_SERVER_HOSTNAME));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let creds = WarehouseCredentials::new("host", "/sql/1.0/warehouses/x", "dapi-secret");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("dapi-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
