//! HTTP API and progress stream server for osreport.
//!
//! This crate exposes the domain services over HTTP:
//!
//! - Report reads with query-string filters, collected on first use
//! - Blocking and background refreshes
//! - Server-sent events for following a background refresh
//! - Token authentication with a trusted-network bypass
//! - Request logging and an OpenAPI document
//!
//! # Example
//!
//! ```ignore
//! use osreport_server::{Server, ServerConfig};
//!
//! let config = ServerConfig::new(Some("secret-token".to_string()))
//!     .with_bind_address("127.0.0.1:8080".parse()?);
//!
//! let server = Server::new(services, config);
//! server.run().await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

pub use auth::{AuthError, Identity, auth_middleware};
pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use logging::request_logging_middleware;
pub use routes::ApiDoc;
pub use state::AppState;

use std::net::SocketAddr;

use axum::{Router, http::HeaderValue, middleware};
use osreport_domain::DomainServices;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The osreport HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server around the domain services.
    pub fn new(services: DomainServices, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(services, config),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let router = Router::new()
            .merge(routes::health_routes())
            .nest("/api/v1", self.api_routes())
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                logging::request_logging_middleware,
            ))
            .layer(TraceLayer::new_for_http());

        let router = match cors_layer(&self.state.config().cors_origins) {
            Some(cors) => router.layer(cors),
            None => router,
        };

        router.with_state(self.state.clone())
    }

    /// API routes (v1).
    ///
    /// Status, version and the OpenAPI document are public; everything
    /// else goes through the auth middleware.
    fn api_routes(&self) -> Router<AppState> {
        use axum::routing::{get, post};

        let protected = Router::new()
            .route("/resources", get(routes::get_resources_handler))
            .route("/projects", get(routes::get_projects_handler))
            .route("/refresh", post(routes::refresh_handler))
            .route("/refresh/progress", post(routes::refresh_progress_handler))
            .route("/progress", get(routes::progress_handler))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth::auth_middleware,
            ));

        Router::new()
            .route("/status", get(routes::status_handler))
            .route("/version", get(routes::version_handler))
            .route("/openapi.json", get(routes::openapi_handler))
            .merge(protected)
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config().bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        if !self.state.config().auth_enabled() {
            warn!("No API token configured, protected routes are open to everyone");
        }

        let router = self.router();

        info!(%addr, "Starting server");

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config().bind_address
    }
}

/// CORS for the configured origins; `*` allows any origin.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return Some(layer.allow_origin(Any));
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    Some(layer.allow_origin(AllowOrigin::list(allowed)))
}
