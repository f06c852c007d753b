//! Request target rewriting.
//!
//! # Data Flow
//! ```text
//! Inbound URI
//!     → path.rs (strip API prefix, ensure leading '/')
//!     → query.rs (parse multimap, normalize symbols, re-encode)
//!     → upstream base + path + '?' + query
//! ```

pub mod path;
pub mod query;

pub use path::{join_url, PathRewriter};
pub use query::{normalize_symbols, QueryParams};
