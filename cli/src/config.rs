//! Configuration file management
//!
//! CLIConfiguration with TOML parsing for ~/.querypilot/config.toml
//!
//! # Configuration Format
//!
//! ```toml
//! [warehouse]
//! ai_function = "agent.ai.shuttlers_insight"  # SQL function that writes SQL
//! persist_namespace = "agent.shuttler_exports" # where \persist writes tables
//! wait_timeout_secs = 30                       # server-side wait per statement
//! poll_interval_ms = 500                       # status polling interval
//! connect_timeout_secs = 10
//! request_timeout_secs = 120
//!
//! [export]
//! file_name = "results.csv"
//!
//! [dictionary]
//! path = "data_dictionary.csv"
//!
//! [ui]
//! format = "table"           # table, json, csv
//! color = true
//! history_size = 1000
//! ```

use querypilot_link::{
    ConnectionOptions, DEFAULT_AI_FUNCTION, DEFAULT_EXPORT_FILE_NAME, DEFAULT_PERSIST_NAMESPACE,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CLIError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "~/.querypilot/config.toml";
pub const DEFAULT_DICTIONARY_PATH: &str = "data_dictionary.csv";

/// CLI configuration loaded from TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CLIConfiguration {
    /// Warehouse and statement settings
    pub warehouse: Option<WarehouseConfig>,

    /// CSV export settings
    pub export: Option<ExportConfig>,

    /// Data dictionary location
    pub dictionary: Option<DictionaryConfig>,

    /// UI preferences
    pub ui: Option<UIConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Fully qualified AI function used to turn questions into SQL
    #[serde(default = "default_ai_function")]
    pub ai_function: String,

    /// Catalog.schema that receives persisted result tables
    #[serde(default = "default_persist_namespace")]
    pub persist_namespace: String,

    /// Seconds the warehouse may hold a statement before answering
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Interval between status polls for long-running statements
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Default file name for \export
    #[serde(default = "default_export_file_name")]
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Path to the data dictionary CSV
    #[serde(default = "default_dictionary_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UIConfig {
    /// Output format: table, json, csv
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable colored output
    #[serde(default = "default_color")]
    pub color: bool,

    /// Maximum history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_ai_function() -> String {
    DEFAULT_AI_FUNCTION.to_string()
}

fn default_persist_namespace() -> String {
    DEFAULT_PERSIST_NAMESPACE.to_string()
}

fn default_wait_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_export_file_name() -> String {
    DEFAULT_EXPORT_FILE_NAME.to_string()
}

fn default_dictionary_path() -> PathBuf {
    PathBuf::from(DEFAULT_DICTIONARY_PATH)
}

fn default_format() -> String {
    "table".to_string()
}

fn default_color() -> bool {
    true
}

fn default_history_size() -> usize {
    1000
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            ai_function: default_ai_function(),
            persist_namespace: default_persist_namespace(),
            wait_timeout_secs: default_wait_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_export_file_name(),
        }
    }
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: default_dictionary_path(),
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            color: default_color(),
            history_size: default_history_size(),
        }
    }
}

impl Default for CLIConfiguration {
    fn default() -> Self {
        Self {
            warehouse: Some(WarehouseConfig::default()),
            export: Some(ExportConfig::default()),
            dictionary: Some(DictionaryConfig::default()),
            ui: Some(UIConfig::default()),
        }
    }
}

pub fn expand_config_path(path: &Path) -> PathBuf {
    let path_str = path.to_str().unwrap_or(DEFAULT_CONFIG_PATH);
    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(rest);
        }
    }
    path.to_path_buf()
}

pub fn default_config_path() -> PathBuf {
    expand_config_path(Path::new(DEFAULT_CONFIG_PATH))
}

impl CLIConfiguration {
    /// Load configuration from file
    ///
    /// Returns default configuration if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_config_path(path);
        let path = &expanded_path;

        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            CLIError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        let config: CLIConfiguration = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let expanded_path = expand_config_path(path);
        let path = &expanded_path;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CLIError::ConfigurationError(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Build ConnectionOptions from the `[warehouse]` section
    pub fn to_connection_options(&self) -> ConnectionOptions {
        let warehouse = self.resolved_warehouse();
        ConnectionOptions::default()
            .with_connect_timeout_secs(warehouse.connect_timeout_secs)
            .with_request_timeout_secs(warehouse.request_timeout_secs)
            .with_wait_timeout_secs(warehouse.wait_timeout_secs)
            .with_poll_interval_ms(warehouse.poll_interval_ms)
    }

    pub fn resolved_warehouse(&self) -> WarehouseConfig {
        self.warehouse.clone().unwrap_or_default()
    }

    pub fn resolved_export(&self) -> ExportConfig {
        self.export.clone().unwrap_or_default()
    }

    pub fn resolved_dictionary(&self) -> DictionaryConfig {
        self.dictionary.clone().unwrap_or_default()
    }

    pub fn resolved_ui(&self) -> UIConfig {
        self.ui.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = CLIConfiguration::default();
        let warehouse = config.resolved_warehouse();
        assert_eq!(warehouse.ai_function, "agent.ai.shuttlers_insight");
        assert_eq!(warehouse.persist_namespace, "agent.shuttler_exports");
        assert_eq!(config.resolved_export().file_name, "results.csv");
        assert_eq!(
            config.resolved_dictionary().path,
            PathBuf::from("data_dictionary.csv")
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = CLIConfiguration::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("[warehouse]"));
        assert!(toml.contains("ai_function"));
        assert!(toml.contains("[export]"));
        assert!(toml.contains("[ui]"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: CLIConfiguration = toml::from_str(
            r#"
            [warehouse]
            ai_function = "main.ai.ask"

            [ui]
            color = false
            "#,
        )
        .unwrap();

        let warehouse = config.resolved_warehouse();
        assert_eq!(warehouse.ai_function, "main.ai.ask");
        assert_eq!(warehouse.poll_interval_ms, 500);
        assert!(!config.resolved_ui().color);
        assert_eq!(config.resolved_ui().history_size, 1000);
        assert!(config.export.is_none());
        assert_eq!(config.resolved_export().file_name, "results.csv");
    }

    #[test]
    fn test_to_connection_options() {
        let mut config = CLIConfiguration::default();
        config.warehouse.as_mut().unwrap().wait_timeout_secs = 45;
        config.warehouse.as_mut().unwrap().poll_interval_ms = 250;

        let options = config.to_connection_options();
        assert_eq!(options.wait_timeout_secs, 45);
        assert_eq!(options.poll_interval_ms, 250);
        assert_eq!(options.connect_timeout_secs, 10);
        assert_eq!(options.request_timeout_secs, 120);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = CLIConfiguration::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.resolved_ui().format, "table");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CLIConfiguration::default();
        config.export.as_mut().unwrap().file_name = "rides.csv".into();
        config.save(&path).unwrap();

        let loaded = CLIConfiguration::load(&path).unwrap();
        assert_eq!(loaded.resolved_export().file_name, "rides.csv");
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[warehouse\nai_function = 1").unwrap();

        let err = CLIConfiguration::load(&path).unwrap_err();
        assert!(matches!(err, CLIError::ConfigurationError(_)));
    }
}
