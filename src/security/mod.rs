//! Header hygiene and cross-origin policy.
//!
//! # Data Flow
//! ```text
//! Inbound request headers
//!     → headers.rs (drop host/hop-by-hop, bound accept-encoding, default user-agent)
//!     → upstream
//! Upstream response headers
//!     → headers.rs (drop framing headers, assert CORS)
//!     → client
//! ```

pub mod headers;

pub use headers::{apply_cors, filter_request_headers, filter_response_headers, preflight_response};
