//! osreport - cached OpenStack inventory reports
//!
//! Main entry point for the osreport CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod client;
mod commands;

use commands::{projects, refresh, report, start, status};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// osreport - cached OpenStack inventory reports with on-demand refresh
#[derive(Parser)]
#[command(name = "osreport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Server URL (default: http://localhost:8080)
    #[arg(long, global = true, env = "OSREPORT_SERVER_URL")]
    pub server: Option<String>,

    /// API token sent to the server
    #[arg(long, global = true, env = "OSREPORT_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the osreport server
    Start(start::StartArgs),

    /// Show server and stored report status
    Status(status::StatusArgs),

    /// Refresh the inventory
    Refresh(refresh::RefreshArgs),

    /// Show the current report
    Report(report::ReportArgs),

    /// List projects in the current report
    Projects(projects::ProjectsArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + daily rotating JSON file
    let filter = if cli.verbose {
        "osreport=debug,osreport_server=debug,osreport_domain=debug,osreport_store=debug,osreport_collector=debug,osreport_session=debug,osreport_config=debug,info"
    } else {
        "osreport=info,osreport_server=info,osreport_domain=info,osreport_store=info,osreport_collector=info,warn"
    };

    let log_dir = osreport_config::user_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "osreport.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "osreport=trace,osreport_server=trace,osreport_domain=trace,osreport_store=trace,osreport_collector=trace,osreport_session=trace,osreport_config=trace,info",
                )),
        )
        .init();

    let server_url = cli
        .server
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    let ctx = commands::Context {
        server_url,
        token: cli.token,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Start(args) => start::run(args, &ctx).await,
        Commands::Status(args) => status::run(args, &ctx).await,
        Commands::Refresh(args) => refresh::run(args, &ctx).await,
        Commands::Report(args) => report::run(args, &ctx).await,
        Commands::Projects(args) => projects::run(args, &ctx).await,
    }
}
