//! Path rewriting.
//!
//! # Responsibilities
//! - Strip the API-version prefix clients use in front of upstream paths
//! - Guarantee a leading separator
//! - Join the result onto the upstream base URL
//!
//! # Design Decisions
//! - Prefix stripping is segment-aware: `/api` and `/api/...` match, `/apiary` doesn't
//! - Path matching is case-sensitive

/// Strips a fixed prefix segment from inbound paths.
#[derive(Debug, Clone)]
pub struct PathRewriter {
    prefix: String,
}

impl PathRewriter {
    /// Create a rewriter for `prefix` (e.g. "/api"). An empty prefix disables stripping.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Normalize an inbound path into the path appended to the upstream base.
    pub fn normalize(&self, path: &str) -> String {
        let stripped = self.strip(path);

        if stripped.starts_with('/') {
            stripped.to_string()
        } else {
            format!("/{}", stripped)
        }
    }

    fn strip<'a>(&self, path: &'a str) -> &'a str {
        if self.prefix.is_empty() {
            return path;
        }

        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        }
    }
}

/// Join a base URL and a normalized path without doubling the separator.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
