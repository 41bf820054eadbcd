//! Refresh endpoints.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, Result};
use crate::state::AppState;

/// Result of a blocking refresh.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub message: String,
    pub generated_at: DateTime<Utc>,
    pub total_resources: usize,
}

/// A background refresh was started.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshStartedResponse {
    pub message: String,
    /// Pass to `GET /api/v1/progress` to follow the refresh.
    pub session_id: String,
}

/// Collect the inventory now and wait for it.
#[utoipa::path(
    post,
    path = "/api/v1/refresh",
    responses(
        (status = 200, description = "Inventory refreshed", body = RefreshResponse),
        (status = 401, description = "Missing or invalid API token"),
        (status = 500, description = "Collection failed", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "refresh"
)]
pub async fn refresh_handler(State(state): State<AppState>) -> Result<Json<RefreshResponse>> {
    let report = state.services().refresh_now().await?;

    Ok(Json(RefreshResponse {
        message: "Resources refreshed successfully".to_string(),
        generated_at: report.generated_at,
        total_resources: report.len(),
    }))
}

/// Start a background refresh and return its session id immediately.
#[utoipa::path(
    post,
    path = "/api/v1/refresh/progress",
    responses(
        (status = 200, description = "Refresh started", body = RefreshStartedResponse),
        (status = 401, description = "Missing or invalid API token"),
    ),
    security(("bearer_auth" = [])),
    tag = "refresh"
)]
pub async fn refresh_progress_handler(State(state): State<AppState>) -> Json<RefreshStartedResponse> {
    let session_id = state.services().start_refresh();
    info!(session_id = %session_id, "Background refresh started");

    Json(RefreshStartedResponse {
        message: "Refresh started".to_string(),
        session_id: session_id.to_string(),
    })
}
