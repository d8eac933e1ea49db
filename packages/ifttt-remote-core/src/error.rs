//! Centralized error types for the IFTTT Remote core library.
//!
//! This module provides a unified error handling system that:
//! - Defines the closed set of failure kinds using `thiserror`
//! - Provides machine-readable error codes for diagnostics
//! - Implements `IntoResponse` so every failure surfaces as HTTP 500

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Trait for error types that provide machine-readable error codes.
pub trait ErrorCode {
    /// Returns a machine-readable error code for API responses.
    fn code(&self) -> &'static str;
}

/// Application-wide error type for the remote service.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum RemoteError {
    /// A required setting is absent or unusable. The service does not start.
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// Request path does not match the remote command grammar.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authorization token missing, ambiguous or mismatched.
    #[error("Unauthorized")]
    Unauthorized,

    /// Command name is not in the registry.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Player state does not allow the command.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Query parameter missing, ambiguous or malformed.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dynamic-DNS provider rejected the update. Carries the literal response.
    #[error("Invalid update IP response: {0}")]
    DnsUpdateFailed(String),

    /// Outbound HTTP call failed.
    #[error("Network error: {0}")]
    Network(String),

    /// Media host rejected or failed a player call.
    #[error("Player error: {0}")]
    Player(String),

    /// Settings store could not be read or written.
    #[error("Settings error: {0}")]
    Settings(String),
}

impl ErrorCode for RemoteError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingConfiguration(_) => "missing_configuration",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::UnknownCommand(_) => "unknown_command",
            Self::PreconditionFailed(_) => "precondition_failed",
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::DnsUpdateFailed(_) => "dns_update_failed",
            Self::Network(_) => "network_error",
            Self::Player(_) => "player_error",
            Self::Settings(_) => "settings_error",
        }
    }
}

impl RemoteError {
    /// Maps the error to an HTTP status code.
    ///
    /// IFTTT webhooks only distinguish success from failure, so every error
    /// kind is reported as 500 and the body carries the detail.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Convenient Result alias for application-wide operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// JSON response body for error responses.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for RemoteError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
