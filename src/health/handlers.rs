//! Diagnostic endpoints.

use axum::{
    extract::State,
    http::{header::USER_AGENT, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::http::server::AppState;
use crate::routing::join_url;
use crate::upstream::OutboundRequest;

pub const SERVICE_NAME: &str = "market-proxy";

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub time: String,
    pub upstream_url: String,
    /// Same value as `upstream_url`, under the key older clients read.
    pub binance_url: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectionReport {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub message: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let upstream_url = state.config.upstream.base_url.clone();
    Json(HealthStatus {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        time: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        binance_url: upstream_url.clone(),
        upstream_url,
    })
}

/// Ping the upstream through the shared transport.
///
/// Any HTTP answer counts as reachable; only transport failures report 503.
pub async fn test_connection(State(state): State<AppState>) -> Response {
    let base_url = state.config.upstream.base_url.clone();

    let mut headers = HeaderMap::new();
    if let Ok(ua) = HeaderValue::from_str(&state.config.upstream.user_agent) {
        headers.insert(USER_AGENT, ua);
    }

    let probe = OutboundRequest {
        method: Method::GET,
        url: join_url(&base_url, "/ping"),
        headers,
        body: Bytes::new(),
    };

    match state.transport.send(probe).await {
        Ok(response) => {
            tracing::debug!(status = %response.status, "Upstream connectivity check succeeded");
            Json(ConnectionReport {
                status: "ok",
                upstream_url: Some(base_url),
                http_status: Some(response.status.as_u16()),
                message: "Connection to upstream established".to_string(),
            })
            .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Upstream connectivity check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ConnectionReport {
                    status: "error",
                    upstream_url: None,
                    http_status: None,
                    message: format!("Failed to connect to upstream: {}", e),
                }),
            )
                .into_response()
        }
    }
}
