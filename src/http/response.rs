//! Response handling and transformation.
//!
//! # Responsibilities
//! - Decompress gzip bodies from the upstream
//! - Filter upstream headers and assert the CORS policy
//! - Fill in Content-Type and Content-Length when the upstream left them out
//!
//! # Design Decisions
//! - Bodies are fully buffered, never streamed
//! - A corrupt gzip body is relayed as-is; the request never fails because of it
//! - Upstream status codes are relayed verbatim

use std::io::Read;

use axum::{
    body::Body,
    http::{
        header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use flate2::read::MultiGzDecoder;

use crate::security::{apply_cors, filter_response_headers};
use crate::upstream::UpstreamResponse;

/// Response as it will be sent back to the client.
#[derive(Debug, Clone)]
pub struct ProxiedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Whether the body was gzip-decoded on the way through.
    pub decompressed: bool,
}

impl ProxiedResponse {
    /// Build the client response from an upstream response.
    pub fn from_upstream(upstream: UpstreamResponse, decompress_gzip: bool) -> Self {
        let UpstreamResponse {
            status,
            headers: upstream_headers,
            body: raw_body,
        } = upstream;

        let (body, decompressed) = if decompress_gzip && is_gzip(&upstream_headers) {
            match gunzip(&raw_body) {
                Ok(decoded) => {
                    tracing::debug!(
                        compressed = raw_body.len(),
                        decompressed = decoded.len(),
                        "Decompressed gzip body"
                    );
                    (Bytes::from(decoded), true)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Gzip decompression failed, relaying original body");
                    (raw_body, false)
                }
            }
        } else {
            (raw_body, false)
        };

        let mut headers = filter_response_headers(&upstream_headers, decompressed);

        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, infer_content_type(&body));
        }

        apply_cors(&mut headers);

        if decompressed || !headers.contains_key(CONTENT_LENGTH) {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }

        Self {
            status,
            headers,
            body,
            decompressed,
        }
    }
}

impl IntoResponse for ProxiedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// True when the upstream declared `Content-Encoding: gzip`.
pub fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().eq_ignore_ascii_case("gzip"))
        .unwrap_or(false)
}

/// Decode a (possibly multi-member) gzip body.
pub fn gunzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoded = Vec::with_capacity(data.len() * 4);
    MultiGzDecoder::new(data).read_to_end(&mut decoded)?;
    Ok(decoded)
}

/// Content-Type for a body the upstream didn't label.
pub fn infer_content_type(body: &[u8]) -> HeaderValue {
    if body.is_empty() || serde_json::from_slice::<serde::de::IgnoredAny>(body).is_ok() {
        HeaderValue::from_static("application/json")
    } else {
        HeaderValue::from_static("text/plain; charset=utf-8")
    }
}
