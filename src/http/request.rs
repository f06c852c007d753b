//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID for tracing
//! - Map the inbound request onto the upstream target URL
//! - Filter headers and pass the body through unchanged
//!
//! # Design Decisions
//! - Request ID added as early as possible, client-supplied IDs are kept
//! - Translation is pure: no I/O, one OutboundRequest per inbound request

use axum::http::{HeaderMap, HeaderValue, Method, Request, Uri};
use bytes::Bytes;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::config::UpstreamConfig;
use crate::routing::{join_url, PathRewriter, QueryParams};
use crate::security::filter_request_headers;
use crate::upstream::OutboundRequest;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read the request ID assigned by the request-ID layer.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Turns inbound requests into upstream requests.
#[derive(Debug, Clone)]
pub struct RequestTranslator {
    base_url: String,
    rewriter: PathRewriter,
    symbols_param: String,
    user_agent: HeaderValue,
}

impl RequestTranslator {
    pub fn new(config: &UpstreamConfig) -> Self {
        let user_agent = HeaderValue::from_str(&config.user_agent).unwrap_or_else(|_| {
            tracing::warn!(user_agent = %config.user_agent, "Invalid user agent, using default");
            HeaderValue::from_static("Binance-Proxy/1.0")
        });

        Self {
            base_url: config.base_url.clone(),
            rewriter: PathRewriter::new(config.strip_prefix.clone()),
            symbols_param: config.symbols_param.clone(),
            user_agent,
        }
    }

    /// Upstream URL for `uri`: base + normalized path + normalized query.
    pub fn target_url(&self, uri: &Uri) -> String {
        let path = self.rewriter.normalize(uri.path());
        let mut target = join_url(&self.base_url, &path);

        let mut params = QueryParams::parse(uri.query());
        params.normalize_symbols(&self.symbols_param);

        if !params.is_empty() {
            target.push('?');
            target.push_str(&params.encode());
        }

        target
    }

    pub fn translate(
        &self,
        method: Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: Bytes,
    ) -> OutboundRequest {
        OutboundRequest {
            method,
            url: self.target_url(uri),
            headers: filter_request_headers(headers, &self.user_agent),
            body,
        }
    }
}
