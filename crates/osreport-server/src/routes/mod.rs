//! API route handlers.

pub mod health;
pub mod openapi;
pub mod progress;
pub mod refresh;
pub mod resources;
pub mod status;

pub use health::{HealthResponse, health_routes};
pub use openapi::{ApiDoc, openapi_handler};
pub use progress::{ProgressQuery, progress_handler};
pub use refresh::{
    RefreshResponse, RefreshStartedResponse, refresh_handler, refresh_progress_handler,
};
pub use resources::{ForceParam, ProjectsResponse, get_projects_handler, get_resources_handler};
pub use status::{StatusResponse, VersionResponse, status_handler, version_handler};
