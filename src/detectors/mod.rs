//! Signal extractors.
//!
//! Each detector inspects one aspect of the request and emits zero or more
//! signals. Detectors are independent of each other and all run on every request.

pub mod ai_headers;
pub mod headers;
pub mod user_agent;

pub use ai_headers::AiHeaderScanner;
pub use headers::{
    AcceptAnalyzer, BrowserHeaderCensus, CookieDetector, DntDetector, RefererDetector,
    UpgradeDetector,
};
pub use user_agent::UserAgentAnalyzer;

use crate::signal::Signal;
use std::collections::BTreeMap;

/// Header metadata of a single inbound request.
///
/// Names keep the casing the caller supplied; every lookup is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionContext {
    headers: Vec<(String, String)>,
}

impl DetectionContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from `(name, value)` pairs in received order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            headers: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Get a single header value (first if multiple).
    ///
    /// Empty and whitespace-only values count as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, v)| k.eq_ignore_ascii_case(name) && !v.trim().is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// Whether a non-empty header with this name is present.
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Get the User-Agent header.
    pub fn user_agent(&self) -> Option<&str> {
        self.header("user-agent")
    }

    /// Iterate all headers in received order.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Headers as a name to value map, case preserved. Repeated names are joined with `", "`.
    pub fn raw_headers(&self) -> BTreeMap<String, String> {
        let mut raw: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in &self.headers {
            raw.entry(name.clone())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.clone());
        }
        raw
    }
}

/// Trait for signal extractors.
pub trait Detector: Send + Sync {
    /// Inspect the request and return the signals it triggers.
    fn analyze(&self, ctx: &DetectionContext) -> Vec<Signal>;

    /// Get the detector name.
    fn name(&self) -> &'static str;
}
