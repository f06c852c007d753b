//! Diagnostic routes owned by the proxy itself.
//!
//! # Endpoints
//! - `GET /health`: liveness, current time and the configured upstream
//! - `GET /test`: one `GET <upstream>/ping` through the shared transport
//!
//! # Design Decisions
//! - Only GET is reserved; other methods on these paths are proxied
//! - The connectivity probe uses the same client as real traffic

pub mod handlers;

pub use handlers::{health_check, test_connection};
