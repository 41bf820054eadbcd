//! Report command - prints the current inventory report.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use osreport_types::{Report, ResourceType};

use super::Context;
use crate::client::ReportQuery;

/// Arguments for the report command.
///
/// Each filter takes a comma-separated list; a resource must match every
/// filter given.
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Project names to include
    #[arg(long = "project", value_delimiter = ',')]
    pub projects: Vec<String>,

    /// Project IDs to include
    #[arg(long = "project-id", value_delimiter = ',')]
    pub project_ids: Vec<String>,

    /// Resource types to include (server, volume, network, ...)
    #[arg(long = "type", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Resource statuses to include
    #[arg(long = "status", value_delimiter = ',')]
    pub statuses: Vec<String>,

    /// Collect a fresh report before printing
    #[arg(short, long)]
    pub force: bool,

    /// Print only the summary
    #[arg(long)]
    pub summary_only: bool,
}

impl ReportArgs {
    fn query(&self) -> ReportQuery {
        ReportQuery {
            projects: self.projects.clone(),
            project_ids: self.project_ids.clone(),
            types: self.types.clone(),
            statuses: self.statuses.clone(),
            force: self.force,
        }
    }
}

/// Run the report command.
pub async fn run(args: ReportArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let report = client.report(&args.query()).await?;

    if ctx.json_output {
        if args.summary_only {
            println!("{}", serde_json::to_string_pretty(&report.summary)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        return Ok(());
    }

    print_summary(&report);
    if !args.summary_only {
        print_resources(&report);
    }
    Ok(())
}

fn print_summary(report: &Report) {
    let dim = Style::new().dim();

    println!();
    println!("{}", style("Inventory Report").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!(
        "  {} {}",
        dim.apply_to("Generated:"),
        report.generated_at.to_rfc3339()
    );
    println!(
        "  {} {}",
        dim.apply_to("Projects:"),
        report.summary.total_projects
    );
    println!();

    for resource_type in ResourceType::ALL {
        let count = report.summary.count(resource_type);
        let line = format!("  {:<16} {:>6}", resource_type, count);
        if count == 0 {
            println!("{}", dim.apply_to(line));
        } else {
            println!("{}", line);
        }
    }
    println!("{}", dim.apply_to("  ".to_string() + &"─".repeat(23)));
    println!(
        "  {:<16} {:>6}",
        "total",
        style(report.summary.total_resources()).bold()
    );
}

fn print_resources(report: &Report) {
    println!();
    if report.resources.is_empty() {
        println!("  {}", Style::new().yellow().apply_to("No matching resources"));
        println!();
        return;
    }

    let dim = Style::new().dim();
    println!(
        "  {}",
        dim.apply_to(format!(
            "{:<14} {:<28} {:<20} {}",
            "TYPE", "NAME", "PROJECT", "STATUS"
        ))
    );
    for resource in &report.resources {
        let name = if resource.name.is_empty() {
            &resource.id
        } else {
            &resource.name
        };
        println!(
            "  {:<14} {:<28} {:<20} {}",
            resource.resource_type.as_str(),
            truncate(name, 28),
            truncate(&resource.project_name, 20),
            status_style(&resource.status).apply_to(&resource.status)
        );
    }
    println!();
}

/// Colour for a resource status.
fn status_style(status: &str) -> Style {
    match status.to_ascii_uppercase().as_str() {
        "ACTIVE" | "AVAILABLE" | "IN-USE" | "UP" => Style::new().green(),
        "ERROR" | "DOWN" | "FAILED" => Style::new().red(),
        "SHUTOFF" | "PAUSED" | "SUSPENDED" => Style::new().yellow(),
        _ => Style::new(),
    }
}

/// Shorten `s` to at most `width` characters, marking the cut with `…`.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let kept: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
