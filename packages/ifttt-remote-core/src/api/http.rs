//! HTTP request handling for remote commands.
//!
//! Every request path is handled by one fallback handler so that malformed
//! paths are reported the same way as any other failure: HTTP 500 with a
//! diagnostic body.

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::api::AppState;
use crate::commands::CommandOutcome;
use crate::error::{ErrorCode, RemoteError, RemoteResult};
use crate::params::ParamMap;
use crate::protocol_constants::{AUTH_PARAM, REMOTE_PATH_PREFIX};

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Creates the Axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(handle_remote)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Handles `GET /ifttt/remote/<command>?__authorization=<token>&...`.
async fn handle_remote(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = uri.path();
    match dispatch_request(&state, path, uri.query().unwrap_or("")).await {
        Ok(outcome) => {
            log::info!("[Router] {} -> {}", path, outcome);
            (StatusCode::OK, "").into_response()
        }
        Err(e) => {
            log::error!("[Router] {} failed ({}): {:?}", path, e.code(), e);
            e.into_response()
        }
    }
}

/// Runs the request pipeline: prefix check, authorization, dispatch.
async fn dispatch_request(
    state: &AppState,
    path: &str,
    query: &str,
) -> RemoteResult<CommandOutcome> {
    let params = ParamMap::from_query(query);

    let command = path
        .strip_prefix(REMOTE_PATH_PREFIX)
        .ok_or_else(|| RemoteError::InvalidRequest(format!("unexpected path {}", path)))?;

    authorize(state, &params)?;

    state.registry.dispatch(command, &params).await
}

/// Requires exactly one `__authorization` value equal to the configured token.
fn authorize(state: &AppState, params: &ParamMap) -> RemoteResult<()> {
    match params.lookup(AUTH_PARAM) {
        Ok(token) if state.is_authorized(token) => Ok(()),
        _ => Err(RemoteError::Unauthorized),
    }
}
