//! OpenAPI document.

use axum::Json;
use utoipa::OpenApi;

use osreport_types::{ProgressKind, ProgressMessage, Project, Report, Resource, ResourceType, Summary};

use super::{health, progress, refresh, resources, status};
use crate::error::ErrorResponse;

/// OpenAPI documentation for the osreport API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "osreport API",
        description = "Cached OpenStack inventory reports with on-demand refresh",
        license(name = "MIT"),
    ),
    paths(
        health::health,
        status::status_handler,
        status::version_handler,
        resources::get_resources_handler,
        resources::get_projects_handler,
        refresh::refresh_handler,
        refresh::refresh_progress_handler,
        progress::progress_handler,
    ),
    components(
        schemas(
            health::HealthResponse,
            status::StatusResponse,
            status::VersionResponse,
            resources::ProjectsResponse,
            refresh::RefreshResponse,
            refresh::RefreshStartedResponse,
            ErrorResponse,
            Report,
            Project,
            Resource,
            ResourceType,
            Summary,
            ProgressKind,
            ProgressMessage,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness"),
        (name = "status", description = "Store status and build information"),
        (name = "resources", description = "Inventory reports"),
        (name = "refresh", description = "Refreshing the inventory and following progress"),
    )
)]
pub struct ApiDoc;

/// Register the accepted token locations as security schemes.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
            components.add_security_scheme(
                "api_token_header",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    crate::auth::API_TOKEN_HEADER,
                ))),
            );
            components.add_security_scheme(
                "api_token_query",
                SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("token"))),
            );
        }
    }
}

/// Serve the OpenAPI document (no auth required).
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
