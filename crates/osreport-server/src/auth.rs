//! Authentication middleware.
//!
//! Protected routes accept the API token in any of these places, checked in
//! order:
//!
//! - `Authorization: Bearer <token>` or a bare `Authorization: <token>`
//! - `X-API-Token: <token>`
//! - the `token` query parameter (browsers' `EventSource` cannot set headers)
//!
//! Clients on loopback or inside a trusted network skip the token check. The
//! client address is the first `X-Forwarded-For` hop when present, otherwise
//! the TCP peer.
//!
//! # Security
//!
//! Token comparison uses constant-time comparison to prevent timing attacks.

use std::net::{IpAddr, SocketAddr};

use axum::{
    body::Body,
    extract::{ConnectInfo, Query, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Header carrying the API token as an alternative to `Authorization`.
pub const API_TOKEN_HEADER: &str = "X-API-Token";

/// Header set by reverse proxies with the originating client address.
pub const FORWARDED_FOR_HEADER: &str = "X-Forwarded-For";

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// How a request was let through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Identity {
    /// Presented the configured API token.
    Token,
    /// Came from loopback or a trusted network.
    TrustedNetwork { addr: IpAddr },
    /// No API token is configured.
    Anonymous,
}

impl Identity {
    pub fn is_token(&self) -> bool {
        matches!(self, Identity::Token)
    }

    pub fn is_trusted_network(&self) -> bool {
        matches!(self, Identity::TrustedNetwork { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Error
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No token in any accepted location.
    MissingToken,
    /// A token was presented but did not match.
    InvalidToken,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "API token required"),
            AuthError::InvalidToken => write!(f, "Invalid API token"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = StatusCode::UNAUTHORIZED;
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Security Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Compare two strings in constant time.
///
/// On a length mismatch a dummy comparison still runs so the time taken
/// does not depend on where the inputs differ.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    if a_bytes.len() == b_bytes.len() {
        a_bytes.ct_eq(b_bytes).into()
    } else {
        let _ = a_bytes.ct_eq(a_bytes);
        false
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Find the presented token, if any.
fn extract_token(request: &Request<Body>) -> Option<String> {
    let headers = request.headers();

    let from_authorization = header_str(headers, AUTHORIZATION.as_str()).map(|value| {
        value
            .strip_prefix("Bearer ")
            .unwrap_or(value)
            .trim()
            .to_string()
    });

    from_authorization
        .or_else(|| header_str(headers, API_TOKEN_HEADER).map(|v| v.trim().to_string()))
        .or_else(|| {
            Query::<TokenQuery>::try_from_uri(request.uri())
                .ok()
                .and_then(|Query(q)| q.token)
        })
        .filter(|token| !token.is_empty())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// The client address.
///
/// `X-Forwarded-For` is honored only when the TCP peer is itself trusted (a
/// local reverse proxy); otherwise the peer address is used as is. Without
/// connection info there is no address to trust.
fn client_ip(request: &Request<Body>, config: &ServerConfig) -> Option<IpAddr> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())?;

    if !config.is_trusted(peer) {
        return Some(peer);
    }

    let forwarded = header_str(request.headers(), FORWARDED_FOR_HEADER)
        .and_then(|value| value.split(',').next())
        .and_then(|hop| hop.trim().parse::<IpAddr>().ok());

    Some(forwarded.unwrap_or(peer))
}

// ─────────────────────────────────────────────────────────────────────────────
// Middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication middleware function.
///
/// Validates the request and injects the `Identity` into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = validate_request(&request, &state)?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn validate_request(request: &Request<Body>, state: &AppState) -> Result<Identity, AuthError> {
    let Some(ref expected_token) = state.config().auth_token else {
        return Ok(Identity::Anonymous);
    };

    if let Some(addr) = client_ip(request, state.config())
        && state.config().is_trusted(addr)
    {
        debug!(client = %addr, "Trusted network, skipping token check");
        return Ok(Identity::TrustedNetwork { addr });
    }

    let token = extract_token(request).ok_or(AuthError::MissingToken)?;
    if constant_time_eq(&token, expected_token) {
        Ok(Identity::Token)
    } else {
        Err(AuthError::InvalidToken)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
