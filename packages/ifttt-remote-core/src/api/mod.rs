//! HTTP API layer.
//!
//! This module contains the request router and server startup. Handlers are
//! thin - command logic lives in [`CommandRegistry`].

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::commands::CommandRegistry;

pub mod http;

/// Errors that can occur when starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the TCP port or to serve on it.
    #[error("Failed to bind to port: {0}")]
    Bind(#[from] std::io::Error),
}

/// Shared application state for the API layer.
#[derive(Clone)]
pub struct AppState {
    /// Executes remote commands.
    pub registry: CommandRegistry,
    /// Token every request must present.
    auth_token: Arc<str>,
}

impl AppState {
    /// Creates the API state.
    pub fn new(registry: CommandRegistry, auth_token: impl Into<Arc<str>>) -> Self {
        Self {
            registry,
            auth_token: auth_token.into(),
        }
    }

    /// Returns `true` if `supplied` equals the configured token byte for byte.
    pub fn is_authorized(&self, supplied: &str) -> bool {
        supplied.as_bytes() == self.auth_token.as_bytes()
    }
}

/// Binds `0.0.0.0:<port>` and serves until `shutdown` is cancelled.
pub async fn start_server(
    state: AppState,
    port: u16,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, shutdown).await
}

/// Serves the router on an already bound listener until `shutdown` is cancelled.
///
/// In-flight requests complete before this returns; the port is released
/// when the listener is dropped.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    log::info!("[Server] Listening on http://{}", listener.local_addr()?);
    let app = http::create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    log::info!("[Server] Stopped");
    Ok(())
}
