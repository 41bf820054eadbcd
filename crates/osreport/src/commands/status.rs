//! Status command - shows server liveness and stored report status.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde::Serialize;

use osreport_server::routes::StatusResponse;

use super::Context;

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {}

/// Status for JSON output.
#[derive(Debug, Serialize)]
struct StatusOutput {
    running: bool,
    version: Option<String>,
    server_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<StatusResponse>,
}

/// Run the status command.
pub async fn run(_args: StatusArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    let health = client.health().await;
    let report = match &health {
        Ok(_) => Some(client.status().await?),
        Err(_) => None,
    };

    if ctx.json_output {
        let output = StatusOutput {
            running: health.is_ok(),
            version: health.as_ref().ok().map(|h| h.version.clone()),
            server_url: ctx.server_url.clone(),
            report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!();
    println!("{}", style("osreport Server Status").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!();

    match health {
        Ok(health) => {
            println!(
                "  {} {}",
                dim.apply_to("Status:"),
                Style::new().green().apply_to("● running")
            );
            println!("  {} {}", dim.apply_to("Version:"), health.version);
            println!("  {} {}", dim.apply_to("Server:"), ctx.server_url);
            if let Some(report) = &report {
                println!();
                print_report_status(report);
            }
        }
        Err(e) => {
            println!(
                "  {} {}",
                dim.apply_to("Status:"),
                Style::new().red().apply_to("● not running")
            );
            println!("  {} {}", dim.apply_to("Server:"), ctx.server_url);
            if ctx.verbose {
                println!();
                println!("  {} {}", dim.apply_to("Error:"), e);
            }
            println!();
            println!("  {}", dim.apply_to("Start the server with: osreport start"));
        }
    }

    println!();
    Ok(())
}

fn print_report_status(report: &StatusResponse) {
    let dim = Style::new().dim();

    if !report.report_exists {
        println!(
            "  {} {}",
            dim.apply_to("Report:"),
            Style::new().yellow().apply_to("none stored yet")
        );
    } else {
        let age = report.report_age_human.as_deref().unwrap_or("unknown");
        println!("  {} {} old", dim.apply_to("Report:"), age);
        if let Some(updated) = report.last_update {
            println!("  {} {}", dim.apply_to("Updated:"), updated.to_rfc3339());
        }
        if let Some(size) = report.file_size_bytes {
            println!("  {} {} bytes", dim.apply_to("Size:"), size);
        }
    }
    println!(
        "  {} {}",
        dim.apply_to("Refreshes in flight:"),
        report.active_sessions
    );
}
