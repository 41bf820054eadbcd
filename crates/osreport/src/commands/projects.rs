//! Projects command - lists the projects of the current report.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use super::Context;

/// Arguments for the projects command.
#[derive(Args, Debug)]
pub struct ProjectsArgs {
    /// Include disabled projects
    #[arg(short, long)]
    pub all: bool,
}

/// Run the projects command.
pub async fn run(args: ProjectsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let mut response = client.projects().await?;

    if !args.all {
        response.projects.retain(|p| p.enabled);
        response.total = response.projects.len();
    }

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!();
    println!(
        "{} {}",
        style("Projects").bold(),
        dim.apply_to(format!("({})", response.total))
    );
    println!("{}", dim.apply_to("─".repeat(40)));

    if response.projects.is_empty() {
        println!("  {}", Style::new().yellow().apply_to("No projects"));
    }

    for project in &response.projects {
        let name = if project.enabled {
            style(project.name.as_str()).bold()
        } else {
            style(project.name.as_str()).dim()
        };
        println!("  {} {}", name, dim.apply_to(&project.id));
        if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
            println!("    {}", dim.apply_to(description));
        }
    }

    println!();
    println!(
        "  {} {}",
        dim.apply_to("Report generated:"),
        response.generated_at.to_rfc3339()
    );
    println!();
    Ok(())
}
