//! Header hygiene and CORS policy.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Bound the compression the upstream may apply
//! - Assert the proxy's CORS policy on every response
//!
//! # Design Decisions
//! - CORS is proxy policy; upstream CORS headers are overwritten, never trusted
//! - Repeated headers are preserved in order (`HeaderMap::append`)

use axum::{
    body::Body,
    http::{
        header::{
            ACCEPT_ENCODING, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CONNECTION, CONTENT_ENCODING,
            CONTENT_LENGTH, HOST, TRANSFER_ENCODING, USER_AGENT,
        },
        HeaderMap, HeaderName, HeaderValue, StatusCode,
    },
    response::Response,
};

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// The only encodings the upstream is allowed to apply.
pub const UPSTREAM_ACCEPT_ENCODING: &str = "gzip, deflate";

fn is_hop_by_hop(name: &HeaderName) -> bool {
    name == CONNECTION || name == TRANSFER_ENCODING || name.as_str() == "keep-alive"
}

/// Build the outbound header set from the client's headers.
pub fn filter_request_headers(inbound: &HeaderMap, user_agent: &HeaderValue) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len() + 1);

    for (name, value) in inbound.iter() {
        if name == HOST || is_hop_by_hop(name) {
            continue;
        }
        if name == ACCEPT_ENCODING {
            outbound.insert(
                ACCEPT_ENCODING,
                HeaderValue::from_static(UPSTREAM_ACCEPT_ENCODING),
            );
            continue;
        }
        outbound.append(name.clone(), value.clone());
    }

    if !outbound.contains_key(USER_AGENT) {
        outbound.insert(USER_AGENT, user_agent.clone());
    }

    outbound
}

/// Copy upstream headers for the client.
///
/// `Content-Encoding` and `Content-Length` only go when the body was decompressed.
pub fn filter_response_headers(upstream: &HeaderMap, decompressed: bool) -> HeaderMap {
    let mut relayed = HeaderMap::with_capacity(upstream.len() + 3);

    for (name, value) in upstream.iter() {
        if name == TRANSFER_ENCODING {
            continue;
        }
        if decompressed && (name == CONTENT_ENCODING || name == CONTENT_LENGTH) {
            continue;
        }
        relayed.append(name.clone(), value.clone());
    }

    relayed
}

/// Assert the CORS policy, replacing anything already present.
pub fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(CORS_ALLOW_ORIGIN),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
}

/// Immediate answer to a CORS preflight. No upstream call is made.
pub fn preflight_response(max_age_secs: u64) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    apply_cors(headers);
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age_secs));

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ua() -> HeaderValue {
        HeaderValue::from_static("Binance-Proxy/1.0")
    }

    #[test]
    fn test_request_strips_hop_by_hop_and_host() {
        let mut inbound = HeaderMap::new();
        inbound.insert(HOST, HeaderValue::from_static("localhost:8080"));
        inbound.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        inbound.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        inbound.insert("x-mbx-apikey", HeaderValue::from_static("key"));

        let outbound = filter_request_headers(&inbound, &ua());

        assert!(!outbound.contains_key(HOST));
        assert!(!outbound.contains_key(CONNECTION));
        assert!(!outbound.contains_key("keep-alive"));
        assert_eq!(outbound["x-mbx-apikey"], "key");
    }

    #[test]
    fn test_request_accept_encoding_bounded() {
        let mut inbound = HeaderMap::new();
        inbound.append(ACCEPT_ENCODING, HeaderValue::from_static("br"));
        inbound.append(ACCEPT_ENCODING, HeaderValue::from_static("zstd"));

        let outbound = filter_request_headers(&inbound, &ua());
        let values: Vec<_> = outbound.get_all(ACCEPT_ENCODING).iter().collect();
        assert_eq!(values, vec!["gzip, deflate"]);
    }

    #[test]
    fn test_request_accept_encoding_not_added() {
        let outbound = filter_request_headers(&HeaderMap::new(), &ua());
        assert!(!outbound.contains_key(ACCEPT_ENCODING));
    }

    #[test]
    fn test_request_user_agent() {
        let outbound = filter_request_headers(&HeaderMap::new(), &ua());
        assert_eq!(outbound[USER_AGENT], "Binance-Proxy/1.0");

        let mut inbound = HeaderMap::new();
        inbound.insert(USER_AGENT, HeaderValue::from_static("curl/8.0"));
        let outbound = filter_request_headers(&inbound, &ua());
        assert_eq!(outbound[USER_AGENT], "curl/8.0");
    }

    #[test]
    fn test_request_repeated_headers_preserved() {
        let mut inbound = HeaderMap::new();
        inbound.append("x-trace", HeaderValue::from_static("a"));
        inbound.append("x-trace", HeaderValue::from_static("b"));

        let outbound = filter_request_headers(&inbound, &ua());
        let values: Vec<_> = outbound.get_all("x-trace").iter().collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_response_keeps_encoding_unless_decompressed() {
        let mut upstream = HeaderMap::new();
        upstream.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        upstream.insert(CONTENT_LENGTH, HeaderValue::from_static("42"));
        upstream.insert("x-mbx-used-weight", HeaderValue::from_static("1"));

        let kept = filter_response_headers(&upstream, false);
        assert_eq!(kept[CONTENT_ENCODING], "gzip");
        assert_eq!(kept[CONTENT_LENGTH], "42");

        let dropped = filter_response_headers(&upstream, true);
        assert!(!dropped.contains_key(CONTENT_ENCODING));
        assert!(!dropped.contains_key(CONTENT_LENGTH));
        assert_eq!(dropped["x-mbx-used-weight"], "1");
    }

    #[test]
    fn test_cors_overrides_upstream() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("https://binance.com"));
        apply_cors(&mut headers);

        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, PUT, DELETE, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, Authorization");
    }

    #[test]
    fn test_preflight() {
        let response = preflight_response(3600);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_MAX_AGE], "3600");
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
