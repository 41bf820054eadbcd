//! Report read endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use osreport_domain::{FilterCriteria, FilterQuery};
use osreport_types::{Project, Report};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, Result};
use crate::state::AppState;

/// `force=true` refreshes before serving.
#[derive(Debug, Default, Deserialize)]
pub struct ForceParam {
    pub force: Option<String>,
}

impl ForceParam {
    pub fn is_forced(&self) -> bool {
        self.force.as_deref() == Some("true")
    }
}

/// Projects in the current report.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectsResponse {
    pub projects: Vec<Project>,
    pub total: usize,
    pub generated_at: DateTime<Utc>,
}

/// Get the current report, optionally filtered.
///
/// Filters are comma-separated lists; a resource must match every filter
/// given. When nothing is stored yet the inventory is collected first.
#[utoipa::path(
    get,
    path = "/api/v1/resources",
    params(
        ("project" = Option<String>, Query, description = "Project names"),
        ("project_id" = Option<String>, Query, description = "Project IDs"),
        ("type" = Option<String>, Query, description = "Resource types, e.g. server,volume"),
        ("status" = Option<String>, Query, description = "Resource statuses"),
        ("force" = Option<bool>, Query, description = "Refresh before serving"),
    ),
    responses(
        (status = 200, description = "Filtered report", body = Report),
        (status = 401, description = "Missing or invalid API token"),
        (status = 500, description = "Collection or storage failed", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "resources"
)]
pub async fn get_resources_handler(
    State(state): State<AppState>,
    Query(filter): Query<FilterQuery>,
    Query(force): Query<ForceParam>,
) -> Result<Json<Report>> {
    if force.is_forced() {
        info!("Forced refresh requested");
        state.services().refresh_now().await?;
    }

    let criteria = FilterCriteria::from_query(&filter);
    let report = state.services().get_report(&criteria).await?;
    Ok(Json(report))
}

/// List the projects of the current report.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "Projects", body = ProjectsResponse),
        (status = 401, description = "Missing or invalid API token"),
        (status = 500, description = "Collection or storage failed", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "resources"
)]
pub async fn get_projects_handler(State(state): State<AppState>) -> Result<Json<ProjectsResponse>> {
    let list = state.services().reports().get_projects().await?;
    Ok(Json(ProjectsResponse {
        projects: list.projects,
        total: list.total,
        generated_at: list.generated_at,
    }))
}
