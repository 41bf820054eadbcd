//! Server-sent progress stream.

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use osreport_types::SessionId;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ErrorResponse, Result, ServerError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub session_id: Option<String>,
}

/// Follow a background refresh.
///
/// Each progress message is sent as one unnamed SSE event with a JSON body.
/// The stream ends after the `complete` or `error` event. Disconnecting
/// only stops this stream; the refresh keeps running.
#[utoipa::path(
    get,
    path = "/api/v1/progress",
    params(
        ("session_id" = String, Query, description = "Id returned by POST /api/v1/refresh/progress"),
    ),
    responses(
        (status = 200, description = "Event stream of progress messages", body = String, content_type = "text/event-stream"),
        (status = 400, description = "session_id missing", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API token"),
        (status = 404, description = "Unknown or finished session", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "refresh"
)]
pub async fn progress_handler(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let session_id = query
        .session_id
        .filter(|id| !id.is_empty())
        .map(SessionId::from_string)
        .ok_or_else(|| ServerError::BadRequest("session_id is required".to_string()))?;

    let events = state.services().stream_progress(&session_id)?;
    info!(session_id = %session_id, "Progress stream attached");

    let stream = async_stream::stream! {
        let mut events = std::pin::pin!(events);
        while let Some(message) = events.next().await {
            match Event::default().json_data(&message) {
                Ok(event) => {
                    yield Ok(event);
                }
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "Dropping unserializable progress event");
                }
            }
        }
        debug!(session_id = %session_id, "Progress stream finished");
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
