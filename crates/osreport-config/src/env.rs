//! Environment variable overrides.
//!
//! | Variable | Setting |
//! |---|---|
//! | `API_TOKEN` | `server.api_token` |
//! | `PORT` | `server.port` |
//! | `OSREPORT_DATA_DIR` | `storage.data_dir` |
//! | `OSREPORT_INVENTORY` | `collector.inventory_path` |
//!
//! Empty values are ignored.

use std::path::PathBuf;

use crate::OsReportConfig;

pub const API_TOKEN_ENV: &str = "API_TOKEN";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "OSREPORT_DATA_DIR";
pub const INVENTORY_ENV: &str = "OSREPORT_INVENTORY";

/// Apply overrides from the process environment.
///
/// Returns warnings for values that could not be used.
pub fn apply_env_overrides(config: &mut OsReportConfig) -> Vec<String> {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply overrides using `lookup` to read variables.
pub fn apply_overrides_from<F>(config: &mut OsReportConfig, lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut warnings = Vec::new();

    if let Some(token) = get(API_TOKEN_ENV) {
        config.server_mut().api_token = Some(token);
    }

    if let Some(port) = get(PORT_ENV) {
        match port.parse::<u16>() {
            Ok(port) => config.server_mut().port = port,
            Err(e) => warnings.push(format!("Ignoring {}={:?}: {}", PORT_ENV, port, e)),
        }
    }

    if let Some(dir) = get(DATA_DIR_ENV) {
        config.storage_mut().data_dir = PathBuf::from(dir);
    }

    if let Some(path) = get(INVENTORY_ENV) {
        config.collector_mut().inventory_path = PathBuf::from(path);
    }

    warnings
}
