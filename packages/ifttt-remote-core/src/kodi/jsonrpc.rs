//! Low-level JSON-RPC transport for the Kodi web server.
//!
//! This module handles envelope building, HTTP transport and error
//! extraction. For typed player operations, see `client.rs`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::RemoteError;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during a JSON-RPC call to Kodi.
#[derive(Debug, Error)]
pub enum JsonRpcError {
    /// HTTP request to Kodi failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Kodi returned a non-success HTTP status (usually 401 for bad credentials).
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    /// Kodi returned a JSON-RPC error object.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Response was neither a result nor an error.
    #[error("Malformed JSON-RPC response: {0}")]
    Parse(String),
}

/// Convenient Result alias for JSON-RPC operations.
pub type JsonRpcResult<T> = Result<T, JsonRpcError>;

impl From<JsonRpcError> for RemoteError {
    fn from(err: JsonRpcError) -> Self {
        match err {
            JsonRpcError::Http(e) => Self::Network(e.to_string()),
            other => Self::Player(other.to_string()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelope
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: &'a Value,
    id: u32,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Optional HTTP Basic credentials for the Kodi web server.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

/// Sends one JSON-RPC call and returns its `result` member.
///
/// # Arguments
/// * `client` - The HTTP client to use for the request
/// * `url` - Full JSON-RPC endpoint (e.g., "http://127.0.0.1:8080/jsonrpc")
/// * `credentials` - Basic auth for the Kodi web server, if enabled
/// * `method` - JSON-RPC method name (e.g., "Player.PlayPause")
/// * `params` - Method parameters
pub async fn call(
    client: &Client,
    url: &str,
    credentials: Option<&Credentials>,
    method: &str,
    params: &Value,
) -> JsonRpcResult<Value> {
    let body = Request {
        jsonrpc: "2.0",
        method,
        params,
        id: 1,
    };

    log::debug!("[Kodi] {} -> {} params={}", method, url, params);

    let mut request = client.post(url).json(&body);
    if let Some(creds) = credentials {
        request = request.basic_auth(&creds.username, creds.password.as_deref());
    }

    let res = request.send().await?;
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        return Err(JsonRpcError::HttpStatus(status.as_u16(), text));
    }

    parse_response(&text)
}

/// Extracts the `result` member of a JSON-RPC response body.
fn parse_response(text: &str) -> JsonRpcResult<Value> {
    let response: Response =
        serde_json::from_str(text).map_err(|e| JsonRpcError::Parse(e.to_string()))?;

    if let Some(err) = response.error {
        return Err(JsonRpcError::Rpc {
            code: err.code,
            message: err.message,
        });
    }

    response
        .result
        .ok_or_else(|| JsonRpcError::Parse(format!("no result in {}", text)))
}
