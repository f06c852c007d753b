//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, CORS middleware, diagnostic routes)
//!     → request.rs (request ID, target URL, header filtering)
//!     → upstream transport
//!     → response.rs (decompress, filter headers, infer content type)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestTranslator, UuidRequestId, X_REQUEST_ID};
pub use response::ProxiedResponse;
pub use server::{build_router, AppState, HttpServer, Translator};
