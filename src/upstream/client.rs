//! reqwest-backed upstream client.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{ProxyError, ProxyResult};
use crate::upstream::{OutboundRequest, UpstreamResponse};

/// Sends one request upstream and buffers the whole response.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> ProxyResult<UpstreamResponse>;
}

/// Production transport over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client whose full round trip is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        // reqwest is built without its decompression features, so gzip
        // bodies come back untouched for the relay stage to handle.
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamTransport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> ProxyResult<UpstreamResponse> {
        let outbound = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .body(request.body)
            .build()
            .map_err(|e| ProxyError::RequestBuild(e.to_string()))?;

        let response = self
            .client
            .execute(outbound)
            .await
            .map_err(|e| ProxyError::Upstream(error_chain(&e)))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::BodyRead(error_chain(&e)))?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// reqwest's top-level message hides the cause ("error sending request").
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
