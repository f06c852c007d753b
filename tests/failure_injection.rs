//! Failure injection tests: the proxy's own error envelopes.

use std::time::Duration;

use axum::Router;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

mod common;

#[tokio::test]
async fn test_connection_refused_is_bad_gateway() {
    let upstream = common::unused_addr().await;
    let proxy = common::start_proxy(format!("http://{}", upstream)).await;

    let res = common::client()
        .get(proxy.url("/ticker/24hr?symbol=BTCUSDT"))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");

    let json: Value = res.json().await.unwrap();
    assert_eq!(json["code"], -1000);
    assert!(json["msg"].as_str().unwrap().contains("failed to reach upstream"));
    assert_eq!(json["msg"], json["message"]);
}

#[tokio::test]
async fn test_connectivity_check_reports_unavailable() {
    let upstream = common::unused_addr().await;
    let proxy = common::start_proxy(format!("http://{}", upstream)).await;

    let res = common::client().get(proxy.url("/test")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["status"], "error");
}

#[tokio::test]
async fn test_truncated_body_is_read_error() {
    // Promise 100 bytes, send 10, hang up.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n0123456789")
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    let proxy = common::start_proxy(format!("http://{}", upstream)).await;
    let res = common::client().get(proxy.url("/klines")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["code"], -1001);
}

#[tokio::test]
async fn test_upstream_timeout_is_bad_gateway() {
    let app = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        "too late"
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    // The test proxy's upstream timeout is 5 seconds.
    let proxy = common::start_proxy(format!("http://{}", upstream)).await;
    let res = common::client().get(proxy.url("/slow")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["code"], -1000);
}
