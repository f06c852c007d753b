//! Upstream transport.
//!
//! # Data Flow
//! ```text
//! OutboundRequest (target URL, method, filtered headers, buffered body)
//!     → UpstreamTransport::send
//!     → UpstreamResponse (status, headers, fully buffered body)
//! ```
//!
//! # Design Decisions
//! - The transport is a trait object so tests can swap in a stub
//! - One client for the whole process, shared across requests
//! - No retries: one attempt per request, bounded by a fixed timeout

pub mod client;

use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;

pub use client::{HttpTransport, UpstreamTransport};

/// Request about to be sent upstream.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}
