//! Refresh command - collects the inventory on the server.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};

use osreport_types::{ProgressKind, ProgressMessage};

use super::Context;

/// Arguments for the refresh command.
#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Block on the refresh instead of following its progress stream
    #[arg(short, long)]
    pub wait: bool,
}

/// Run the refresh command.
pub async fn run(args: RefreshArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    if args.wait {
        let result = client.refresh().await?;
        if ctx.json_output {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!(
                "{} {} ({} resources)",
                Style::new().green().apply_to("✓"),
                result.message,
                result.total_resources
            );
        }
        return Ok(());
    }

    let started = client.start_refresh().await?;
    let mut events = Box::pin(client.progress(&started.session_id)?);

    if ctx.json_output {
        while let Some(message) = events.next().await {
            let message = message?;
            println!("{}", serde_json::to_string(&message)?);
            if message.kind == ProgressKind::Error {
                anyhow::bail!("{}", message.message);
            }
        }
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Waiting for the server...");

    let mut finished = false;
    while let Some(message) = events.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e);
            }
        };

        match message.kind {
            ProgressKind::Start | ProgressKind::Progress => {
                spinner.set_message(describe(&message));
            }
            ProgressKind::Complete => {
                spinner.finish_and_clear();
                println!(
                    "{} {}",
                    Style::new().green().apply_to("✓"),
                    message.message
                );
                if let Some(summary) = &message.summary {
                    for (resource_type, count) in summary {
                        let label = format!("{:<16}", resource_type);
                        println!("    {} {}", style(label).dim(), count);
                    }
                }
                finished = true;
            }
            ProgressKind::Error => {
                spinner.finish_and_clear();
                anyhow::bail!("{}", message.message);
            }
        }
    }

    if !finished {
        spinner.finish_and_clear();
        // The refresh outlives the stream; its result lands in the store.
        println!(
            "{}",
            Style::new()
                .yellow()
                .apply_to("Progress stream ended early; check `osreport status` for the result")
        );
    }

    Ok(())
}

/// One-line spinner text for a progress message.
fn describe(message: &ProgressMessage) -> String {
    let mut text = match (message.current_step, message.total_steps) {
        (Some(current), Some(total)) => format!("[{}/{}] {}", current, total, message.message),
        _ => message.message.clone(),
    };
    if let Some(count) = message.count {
        text.push_str(&format!(" ({} found)", count));
    }
    text
}
