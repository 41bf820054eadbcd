//! File-backed inventory collector.
//!
//! Reads a JSON document of the form
//!
//! ```json
//! {
//!   "projects": [{"id": "p1", "name": "infra"}],
//!   "resources": [{"id": "vm-1", "type": "server", "project_id": "p1", "status": "ACTIVE"}]
//! }
//! ```
//!
//! on every fetch, so edits to the file show up on the next refresh.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use osreport_session::ProgressOutlet;
use osreport_types::{Project, ProgressMessage, Report, Resource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collector::Collector;
use crate::error::{CollectionError, Result};

/// On-disk inventory document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Inventory {
    /// Fill in `project_name` on resources that only carry a `project_id`.
    fn resolve_project_names(&mut self) {
        let names: HashMap<&str, &str> = self
            .projects
            .iter()
            .map(|p| (p.id.as_str(), p.name.as_str()))
            .collect();

        for resource in &mut self.resources {
            if resource.project_name.is_empty()
                && let Some(name) = names.get(resource.project_id.as_str())
            {
                resource.project_name = (*name).to_string();
            }
        }
    }
}

/// Collector backed by a JSON inventory file.
#[derive(Debug, Clone)]
pub struct InventoryFileCollector {
    path: PathBuf,
}

impl InventoryFileCollector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the inventory file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_inventory(&self) -> Result<Inventory> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| CollectionError::Io {
                path: self.path.clone(),
                source,
            })?;

        let mut inventory: Inventory =
            serde_json::from_slice(&bytes).map_err(|source| CollectionError::Parse {
                path: self.path.clone(),
                source,
            })?;
        inventory.resolve_project_names();

        debug!(
            path = %self.path.display(),
            projects = inventory.projects.len(),
            resources = inventory.resources.len(),
            "Read inventory"
        );
        Ok(inventory)
    }
}

#[async_trait]
impl Collector for InventoryFileCollector {
    fn name(&self) -> &str {
        "inventory-file"
    }

    async fn fetch_all(&self) -> Result<Report> {
        let inventory = self.read_inventory().await?;
        let report = Report::new(inventory.projects, inventory.resources);
        info!(resources = report.len(), "Inventory collected");
        Ok(report)
    }

    async fn fetch_all_with_progress(&self, outlet: &ProgressOutlet) -> Result<Report> {
        outlet.try_push(ProgressMessage::progress(format!(
            "Reading inventory from {}",
            self.path.display()
        )));

        let inventory = self.read_inventory().await?;

        let mut per_project: HashMap<&str, usize> = HashMap::new();
        for resource in &inventory.resources {
            *per_project.entry(resource.project_id.as_str()).or_default() += 1;
        }
        let unassigned = per_project.get("").copied().unwrap_or(0);
        let total_steps = (inventory.projects.len() + usize::from(unassigned > 0)) as u32;

        for (index, project) in inventory.projects.iter().enumerate() {
            let count = per_project.get(project.id.as_str()).copied().unwrap_or(0);
            outlet.try_push(
                ProgressMessage::progress(format!(
                    "Collected {} resources from project {}",
                    count, project.name
                ))
                .with_project(project.name.clone())
                .with_step(index as u32 + 1, total_steps)
                .with_count(count),
            );
        }

        if unassigned > 0 {
            outlet.try_push(
                ProgressMessage::progress(format!(
                    "Collected {} resources without a project",
                    unassigned
                ))
                .with_step(total_steps, total_steps)
                .with_count(unassigned),
            );
        }

        let report = Report::new(inventory.projects, inventory.resources);
        info!(
            session_id = %outlet.session_id(),
            resources = report.len(),
            "Inventory collected"
        );
        Ok(report)
    }
}
