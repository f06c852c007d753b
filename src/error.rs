//! Proxy-originated errors and their JSON envelope.
//!
//! Upstream failures that carry an HTTP status are not errors here; they are
//! relayed verbatim. Only failures of the proxy itself end up in this type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors the forwarding pipeline can surface to the caller.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The outbound request could not be built (bad URL, bad method, unreadable inbound body).
    #[error("failed to build upstream request: {0}")]
    RequestBuild(String),

    /// Connection, DNS, TLS or timeout failure talking to the upstream.
    #[error("failed to reach upstream: {0}")]
    Upstream(String),

    /// Headers arrived but the body could not be read.
    #[error("failed to read upstream response: {0}")]
    BodyRead(String),
}

impl ProxyError {
    /// HTTP status returned to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::RequestBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::BodyRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Numeric code in the error envelope.
    pub fn code(&self) -> i32 {
        match self {
            ProxyError::RequestBuild(_) | ProxyError::Upstream(_) => -1000,
            ProxyError::BodyRead(_) => -1001,
        }
    }
}

/// Result type for the forwarding pipeline.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// JSON body for proxy-originated errors.
///
/// `msg` mirrors the upstream's own field name so existing clients can read
/// it; `message` is the descriptive form.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: i32,
    pub msg: String,
    pub message: String,
}

impl From<&ProxyError> for ErrorEnvelope {
    fn from(err: &ProxyError) -> Self {
        let message = err.to_string();
        Self {
            code: err.code(),
            msg: message.clone(),
            message,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorEnvelope::from(&self))).into_response()
    }
}
