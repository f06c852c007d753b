//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::RawQuery,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::Response,
    routing::get,
    Json, Router,
};
use flate2::{write::GzEncoder, Compression};
use market_proxy::{HttpServer, ProxyConfig, Shutdown};
use serde_json::{json, Value};
use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use url::form_urlencoded;

pub const TICKER_JSON: &str = r#"{"symbol":"BTCUSDT","lastPrice":"65000.00"}"#;

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Describes exactly what the stub upstream received.
async fn echo(method: Method, uri: Uri, RawQuery(query): RawQuery, headers: HeaderMap, body: String) -> Json<Value> {
    let params: Vec<(String, String)> = query
        .as_deref()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let headers: serde_json::Map<String, Value> = headers
        .keys()
        .map(|name| {
            let values: Vec<Value> = headers
                .get_all(name)
                .iter()
                .map(|v| Value::from(v.to_str().unwrap_or_default()))
                .collect();
            (name.to_string(), Value::from(values))
        })
        .collect();

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": query,
        "params": params,
        "headers": headers,
        "body": body,
    }))
}

fn raw_response(status: StatusCode, headers: &[(&'static str, &'static str)], body: Vec<u8>) -> Response {
    let mut builder = Response::builder().status(status);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body)).unwrap()
}

/// Start a stub upstream on an ephemeral port.
///
/// - `/ping` → `{}`
/// - `/gzip` → gzip-encoded ticker JSON
/// - `/corrupt-gzip` → bytes that claim to be gzip but aren't
/// - `/plain` → unlabeled text body
/// - `/teapot` → 418 with an upstream-style error envelope
/// - anything else → echo of the received request
pub async fn start_stub_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/ping", get(|| async { Json(json!({})) }))
        .route(
            "/gzip",
            get(|| async {
                raw_response(
                    StatusCode::OK,
                    &[("content-encoding", "gzip"), ("content-type", "application/json")],
                    gzip(TICKER_JSON.as_bytes()),
                )
            }),
        )
        .route(
            "/corrupt-gzip",
            get(|| async {
                raw_response(
                    StatusCode::OK,
                    &[("content-encoding", "gzip")],
                    b"\x1f\x8b\x08definitely not deflate".to_vec(),
                )
            }),
        )
        .route(
            "/plain",
            get(|| async { raw_response(StatusCode::OK, &[], b"pong".to_vec()) }),
        )
        .route(
            "/teapot",
            get(|| async {
                raw_response(
                    StatusCode::IM_A_TEAPOT,
                    &[("content-type", "application/json")],
                    br#"{"code":-1121,"msg":"Invalid symbol."}"#.to_vec(),
                )
            }),
        )
        .fallback(echo);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A port with nothing listening on it.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Running proxy under test.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the real proxy, pointed at `upstream_base`, on an ephemeral port.
pub async fn start_proxy(upstream_base: String) -> TestProxy {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = upstream_base;
    config.upstream.timeout_secs = 5;

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestProxy { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
