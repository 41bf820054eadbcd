//! Store status and version endpoints.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Metadata about the stored report.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// Whether a report snapshot is stored.
    pub report_exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_age_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_age_hours: Option<f64>,
    /// Age rendered for people, e.g. "3 hours".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_age_human: Option<String>,
    /// When the snapshot was last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
    /// Refreshes currently in flight.
    pub active_sessions: usize,
    /// Server time of this check.
    pub last_check: DateTime<Utc>,
}

/// Build information.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VersionResponse {
    pub name: String,
    pub version: String,
    /// Commit the binary was built from, when known.
    pub git_commit: String,
    /// Minimum supported Rust version.
    pub rust_version: String,
}

/// Report the store status (no auth required). Never triggers a fetch.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses(
        (status = 200, description = "Stored report metadata", body = StatusResponse),
    ),
    tag = "status"
)]
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.services().reports().store_status();

    Json(StatusResponse {
        report_exists: status.exists,
        report_age_seconds: status.age_seconds(),
        report_age_hours: status.age_hours(),
        report_age_human: status.age_human(),
        last_update: status.last_update,
        file_size_bytes: status.size_bytes,
        active_sessions: state.active_sessions(),
        last_check: Utc::now(),
    })
}

/// Report build information (no auth required).
#[utoipa::path(
    get,
    path = "/api/v1/version",
    responses(
        (status = 200, description = "Build information", body = VersionResponse),
    ),
    tag = "status"
)]
pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_commit: option_env!("OSREPORT_GIT_COMMIT")
            .unwrap_or("unknown")
            .to_string(),
        rust_version: env!("CARGO_PKG_RUST_VERSION").to_string(),
    })
}
