//! HTTP server setup and the forwarding translator.
//!
//! # Responsibilities
//! - Create the Axum router: diagnostic routes, everything else to the translator
//! - Wire up middleware (CORS, request ID, tracing, timeout)
//! - Forward requests to the upstream and relay the response
//! - Serve until the shutdown signal fires, then drain

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::health;
use crate::http::request::{request_id, RequestTranslator, UuidRequestId};
use crate::http::response::ProxiedResponse;
use crate::observability::metrics;
use crate::security::{apply_cors, preflight_response};
use crate::upstream::{HttpTransport, UpstreamTransport};

/// Extra time the inbound deadline allows beyond the upstream timeout, so an
/// upstream timeout still surfaces as a 502 envelope.
const INBOUND_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub transport: Arc<dyn UpstreamTransport>,
    pub translator: Arc<Translator>,
}

impl AppState {
    pub fn new(config: ProxyConfig, transport: Arc<dyn UpstreamTransport>) -> Self {
        let translator = Arc::new(Translator::new(&config, transport.clone()));
        Self {
            config: Arc::new(config),
            transport,
            translator,
        }
    }
}

/// Forwards one inbound request upstream and converts the answer back.
///
/// Stateless apart from the shared transport; safe to call concurrently.
pub struct Translator {
    requests: RequestTranslator,
    transport: Arc<dyn UpstreamTransport>,
    max_body_size: usize,
    preflight_max_age: u64,
    decompress_gzip: bool,
}

impl Translator {
    pub fn new(config: &ProxyConfig, transport: Arc<dyn UpstreamTransport>) -> Self {
        Self {
            requests: RequestTranslator::new(&config.upstream),
            transport,
            max_body_size: config.security.max_body_size,
            preflight_max_age: config.cors.max_age_secs,
            decompress_gzip: config.upstream.decompress_gzip,
        }
    }

    /// Run the full pipeline for one request.
    pub async fn forward(&self, request: Request) -> Response {
        if request.method() == Method::OPTIONS {
            return preflight_response(self.preflight_max_age);
        }

        let start_time = Instant::now();
        let (parts, body) = request.into_parts();
        let request_id = request_id(&parts.headers).to_string();
        let method_str = parts.method.to_string();

        let body = match axum::body::to_bytes(body, self.max_body_size).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
                let response = error_response(ProxyError::RequestBuild(format!(
                    "failed to read request body: {}",
                    e
                )));
                metrics::record_request(&method_str, response.status().as_u16(), start_time);
                return response;
            }
        };

        let outbound = self
            .requests
            .translate(parts.method, &parts.uri, &parts.headers, body);

        tracing::debug!(
            request_id = %request_id,
            method = %outbound.method,
            path = %parts.uri.path(),
            target = %outbound.url,
            "Proxying request"
        );

        let response = match self.transport.send(outbound).await {
            Ok(upstream) => {
                if !upstream.status.is_success() {
                    tracing::warn!(
                        request_id = %request_id,
                        status = %upstream.status,
                        "Upstream returned non-success status"
                    );
                }
                ProxiedResponse::from_upstream(upstream, self.decompress_gzip).into_response()
            }
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Upstream error");
                error_response(e)
            }
        };

        metrics::record_request(&method_str, response.status().as_u16(), start_time);
        response
    }
}

fn error_response(err: ProxyError) -> Response {
    let mut response = err.into_response();
    apply_cors(response.headers_mut());
    response
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a server that talks to the upstream over HTTP(S).
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let transport = HttpTransport::new(Duration::from_secs(config.upstream.timeout_secs))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a server over any transport.
    pub fn with_transport(config: ProxyConfig, transport: Arc<dyn UpstreamTransport>) -> Self {
        let state = AppState::new(config, transport);
        let config = state.config.clone();
        let router = build_router(state);
        Self { router, config }
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let inbound_timeout =
        Duration::from_secs(state.config.upstream.timeout_secs) + INBOUND_TIMEOUT_GRACE;

    // Non-GET calls to the diagnostic paths fall through to the upstream.
    Router::new()
        .route(
            "/health",
            get(health::handlers::health_check).fallback(proxy_handler),
        )
        .route(
            "/test",
            get(health::handlers::test_connection).fallback(proxy_handler),
        )
        .fallback(proxy_handler)
        .layer(middleware::from_fn_with_state(state.clone(), cors_middleware))
        .with_state(state)
        .layer(TimeoutLayer::new(inbound_timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
}

async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    state.translator.forward(request).await
}

/// Answers preflights for every route and asserts CORS on every response.
async fn cors_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return preflight_response(state.config.cors.max_age_secs);
    }

    let mut response = next.run(request).await;
    apply_cors(response.headers_mut());
    response
}
