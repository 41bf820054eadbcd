//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]       # listener and API authentication
//! [storage]      # report snapshot and backups
//! [collector]    # inventory source
//! [progress]     # refresh progress streaming
//! ```

use std::path::PathBuf;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address.
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default backup retention in days.
pub const DEFAULT_BACKUP_RETENTION_DAYS: u64 = 7;

/// Default per-session progress buffer.
pub const DEFAULT_OUTLET_CAPACITY: usize = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. project-local
/// overrides) can be loaded and merged. Use the accessor methods to read a
/// section with defaults filled in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OsReportConfig {
    pub server: Option<ServerConfig>,
    pub storage: Option<StorageConfig>,
    pub collector: Option<CollectorConfig>,
    pub progress: Option<ProgressConfig>,
}

impl OsReportConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        let config: OsReportConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced wholesale.
    pub fn merge(&mut self, other: OsReportConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }
        if other.storage.is_some() {
            self.storage = other.storage;
        }
        if other.collector.is_some() {
            self.collector = other.collector;
        }
        if other.progress.is_some() {
            self.progress = other.progress;
        }
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(progress) = &self.progress
            && progress.outlet_capacity == 0
        {
            return Err(ConfigError::Invalid {
                field: "progress.outlet_capacity".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(server) = &self.server
            && server.api_token.as_deref().is_some_and(|t| t.trim().is_empty())
        {
            return Err(ConfigError::Invalid {
                field: "server.api_token".to_string(),
                message: "must not be blank; omit it to disable authentication".to_string(),
            });
        }
        Ok(())
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }

    pub fn collector(&self) -> CollectorConfig {
        self.collector.clone().unwrap_or_default()
    }

    pub fn progress(&self) -> ProgressConfig {
        self.progress.clone().unwrap_or_default()
    }

    pub(crate) fn server_mut(&mut self) -> &mut ServerConfig {
        self.server.get_or_insert_with(ServerConfig::default)
    }

    pub(crate) fn storage_mut(&mut self) -> &mut StorageConfig {
        self.storage.get_or_insert_with(StorageConfig::default)
    }

    pub(crate) fn collector_mut(&mut self) -> &mut CollectorConfig {
        self.collector.get_or_insert_with(CollectorConfig::default)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Token required on protected routes. Unset disables authentication.
    pub api_token: Option<String>,
    /// Enable request logging.
    pub request_logging: bool,
    /// Networks whose requests skip token authentication.
    pub trusted_networks: Vec<IpNet>,
    /// Origins allowed to call the API from a browser; `*` allows any.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            api_token: None,
            request_logging: true,
            trusted_networks: default_trusted_networks(),
            cors_origins: Vec::new(),
        }
    }
}

/// Loopback plus the RFC 1918 private ranges.
pub fn default_trusted_networks() -> Vec<IpNet> {
    ["127.0.0.0/8", "::1/128", "10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"]
        .iter()
        .filter_map(|n| n.parse().ok())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Storage Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Report storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `report.json` and `backups/`.
    pub data_dir: PathBuf,
    /// Backups older than this many days are deleted after each refresh.
    pub backup_retention_days: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            backup_retention_days: DEFAULT_BACKUP_RETENTION_DAYS,
        }
    }
}

impl StorageConfig {
    pub fn backup_retention(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.backup_retention_days * 24 * 60 * 60)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Collector Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Inventory collector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// JSON inventory file read on every refresh.
    pub inventory_path: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            inventory_path: PathBuf::from("inventory.json"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Progress Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Refresh progress configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Events buffered per session before new ones are dropped.
    pub outlet_capacity: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            outlet_capacity: DEFAULT_OUTLET_CAPACITY,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
