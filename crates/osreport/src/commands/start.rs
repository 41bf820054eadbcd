//! Start command - launches the osreport server.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::{info, warn};

use osreport_collector::InventoryFileCollector;
use osreport_config::{ConfigSource, LoadedConfig, OsReportConfig};
use osreport_domain::DomainServices;
use osreport_server::{Server, ServerConfig};
use osreport_session::{RegistryConfig, SessionRegistry};
use osreport_store::{FileReportStore, ReportStore};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override environment variables, which override config files.
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// API token required on protected routes (overrides config)
    #[arg(long)]
    pub api_token: Option<String>,

    /// Directory holding report.json and its backups (overrides config)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Inventory JSON file the collector reads (overrides config)
    #[arg(long)]
    pub inventory: Option<PathBuf>,

    /// Path to config file (overrides default discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    // ── Load configuration ──────────────────────────────────────────────

    let loaded = if let Some(ref config_path) = args.config {
        let config = osreport_config::load_config_file(config_path)?;
        LoadedConfig {
            config,
            sources: vec![ConfigSource {
                path: config_path.clone(),
                loaded: true,
            }],
            warnings: Vec::new(),
        }
    } else {
        osreport_config::load_config(None)?
    };

    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    if ctx.verbose {
        let sources = loaded.loaded_from();
        if sources.is_empty() {
            println!("No config files found, using defaults + env + CLI args");
        } else {
            for source in sources {
                println!("Loaded config: {}", source.display());
            }
        }
    }

    let mut config = loaded.config;
    for warning in osreport_config::apply_env_overrides(&mut config) {
        eprintln!("warning: {}", warning);
    }

    let settings = resolve_settings(&config, &args)?;

    // ── Wire services ───────────────────────────────────────────────────

    if !settings.inventory.exists() {
        warn!(
            path = %settings.inventory.display(),
            "Inventory file does not exist yet; refreshes will fail until it does"
        );
    }

    let store = FileReportStore::new(&settings.data_dir);
    if store.exists() {
        info!(path = %store.report_path().display(), "Serving stored report");
    }

    let registry = SessionRegistry::new(
        RegistryConfig::default().with_outlet_capacity(settings.outlet_capacity),
    );

    let services = DomainServices::new(
        Arc::new(InventoryFileCollector::new(&settings.inventory)),
        Arc::new(store),
        registry,
        settings.retention,
    );

    if ctx.verbose {
        println!("Data directory: {}", settings.data_dir.display());
        println!("Inventory: {}", settings.inventory.display());
        println!("Listening on: {}", settings.server.bind_address);
    }

    Server::new(services, settings.server).run().await?;
    Ok(())
}

/// Everything `start` needs after merging config, env and CLI args.
#[derive(Debug)]
struct StartSettings {
    server: ServerConfig,
    data_dir: PathBuf,
    inventory: PathBuf,
    retention: std::time::Duration,
    outlet_capacity: usize,
}

fn resolve_settings(config: &OsReportConfig, args: &StartArgs) -> Result<StartSettings> {
    let server = config.server();
    let storage = config.storage();
    let collector = config.collector();

    let bind = args.bind.as_deref().unwrap_or(&server.bind);
    let ip: IpAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", bind))?;
    let port = args.port.unwrap_or(server.port);

    let api_token = args
        .api_token
        .clone()
        .or(server.api_token)
        .filter(|t| !t.is_empty());

    let server_config = ServerConfig::new(api_token)
        .with_bind_address(SocketAddr::new(ip, port))
        .with_trusted_networks(server.trusted_networks)
        .with_request_logging(server.request_logging)
        .with_cors_origins(server.cors_origins);

    Ok(StartSettings {
        server: server_config,
        data_dir: args.data_dir.clone().unwrap_or(storage.data_dir.clone()),
        inventory: args
            .inventory
            .clone()
            .unwrap_or(collector.inventory_path),
        retention: storage.backup_retention(),
        outlet_capacity: config.progress().outlet_capacity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_config() {
        let settings = resolve_settings(&OsReportConfig::new(), &StartArgs::default()).unwrap();

        assert_eq!(settings.server.bind_address.port(), 8080);
        assert_eq!(settings.server.bind_address.ip().to_string(), "0.0.0.0");
        assert!(settings.server.auth_token.is_none());
        assert!(!settings.server.trusted_networks.is_empty());
        assert_eq!(settings.data_dir, PathBuf::from("data"));
        assert_eq!(settings.inventory, PathBuf::from("inventory.json"));
        assert_eq!(settings.retention.as_secs(), 7 * 24 * 3600);
        assert_eq!(settings.outlet_capacity, 100);
    }

    #[test]
    fn test_cli_args_override_config() {
        let config = OsReportConfig::from_toml(
            r#"
            [server]
            port = 9000
            api_token = "from-file"

            [storage]
            data_dir = "/var/lib/osreport"
            "#,
        )
        .unwrap();

        let args = StartArgs {
            port: Some(9100),
            bind: Some("127.0.0.1".to_string()),
            api_token: Some("from-cli".to_string()),
            data_dir: Some(PathBuf::from("/tmp/reports")),
            ..Default::default()
        };

        let settings = resolve_settings(&config, &args).unwrap();
        assert_eq!(settings.server.bind_address.to_string(), "127.0.0.1:9100");
        assert_eq!(settings.server.auth_token.as_deref(), Some("from-cli"));
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn test_config_used_when_no_args() {
        let config = OsReportConfig::from_toml(
            r#"
            [server]
            port = 9000
            api_token = "from-file"
            "#,
        )
        .unwrap();

        let settings = resolve_settings(&config, &StartArgs::default()).unwrap();
        assert_eq!(settings.server.bind_address.port(), 9000);
        assert_eq!(settings.server.auth_token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_invalid_bind_rejected() {
        let args = StartArgs {
            bind: Some("not-an-ip".to_string()),
            ..Default::default()
        };
        assert!(resolve_settings(&OsReportConfig::new(), &args).is_err());
    }
}
