//! Query parameter normalization.
//!
//! # Responsibilities
//! - Parse the inbound query into an ordered multimap
//! - Convert comma-separated symbol lists into the JSON array form the upstream expects
//! - Re-encode the multimap for the outbound URL
//!
//! # Design Decisions
//! - Keys are kept sorted; values keep their arrival order per key
//! - Symbol conversion is best-effort and never fails the request

use std::collections::BTreeMap;
use url::form_urlencoded;

/// Ordered multimap of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// Parse a raw (still percent-encoded) query string.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        if let Some(raw) = raw {
            for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
                params
                    .entry(key.into_owned())
                    .or_default()
                    .push(value.into_owned());
            }
        }
        Self { params }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for `key`, in arrival order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.params.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace every value of `key` with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), vec![value.into()]);
    }

    /// Rewrite the symbols parameter `key` into a JSON array if it is comma-separated.
    pub fn normalize_symbols(&mut self, key: &str) {
        let Some(current) = self.get(key) else {
            return;
        };

        if let Some(normalized) = normalize_symbols(current) {
            tracing::debug!(param = key, from = current, to = %normalized, "Normalized symbols");
            self.set(key, normalized);
        }
    }

    /// URL-encode the multimap (`a=1&a=2&b=3`).
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.params {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

/// Convert `"BTCUSDT, ETHUSDT"` into `["BTCUSDT","ETHUSDT"]`.
///
/// Returns `None` when the value is already a JSON array or cannot be encoded,
/// in which case the caller keeps the original.
pub fn normalize_symbols(value: &str) -> Option<String> {
    if value.starts_with('[') {
        return None;
    }

    let symbols: Vec<&str> = value.split(',').map(str::trim).collect();

    match serde_json::to_string(&symbols) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!(value, error = %e, "Failed to encode symbols as JSON, keeping original");
            None
        }
    }
}
