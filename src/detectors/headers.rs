//! Header analysis detectors.
//!
//! Presence and content checks on individual headers:
//! - Browser header census
//! - Referer, Cookie, Upgrade and DNT presence
//! - Accept header semantics

use super::{DetectionContext, Detector};
use crate::catalog::BROWSER_HEADERS;
use crate::signal::{Signal, SignalCategory, SignalName};

/// At or above this many browser headers the request looks like a browser.
const BROWSER_HEADERS_MIN: u32 = 5;

/// At or below this many browser headers the request looks scripted.
/// Counts between the two bounds emit nothing.
const MINIMAL_HEADERS_MAX: u32 = 2;

/// Counts the canonical browser headers present on the request.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserHeaderCensus;

impl BrowserHeaderCensus {
    pub fn new() -> Self {
        Self
    }

    /// Number of browser headers present with a non-empty value.
    pub fn count(ctx: &DetectionContext) -> u32 {
        BROWSER_HEADERS
            .iter()
            .filter(|name| ctx.has_header(name))
            .count() as u32
    }
}

impl Detector for BrowserHeaderCensus {
    fn analyze(&self, ctx: &DetectionContext) -> Vec<Signal> {
        let count = Self::count(ctx);

        if count >= BROWSER_HEADERS_MIN {
            vec![Signal::new(
                SignalName::BrowserHeadersPresent,
                count,
                25,
                SignalCategory::Headers,
            )]
        } else if count <= MINIMAL_HEADERS_MAX {
            vec![Signal::new(
                SignalName::MinimalHeaders,
                count,
                -20,
                SignalCategory::Headers,
            )]
        } else {
            vec![]
        }
    }

    fn name(&self) -> &'static str {
        "browser_header_census"
    }
}

/// Emits `has_referer` when a Referer header is present.
#[derive(Debug, Default, Clone, Copy)]
pub struct RefererDetector;

impl Detector for RefererDetector {
    fn analyze(&self, ctx: &DetectionContext) -> Vec<Signal> {
        ctx.header("referer")
            .map(|referer| Signal::new(SignalName::HasReferer, referer, 15, SignalCategory::Headers))
            .into_iter()
            .collect()
    }

    fn name(&self) -> &'static str {
        "referer_detector"
    }
}

/// Emits `has_cookies` when a Cookie header is present.
#[derive(Debug, Default, Clone, Copy)]
pub struct CookieDetector;

impl Detector for CookieDetector {
    fn analyze(&self, ctx: &DetectionContext) -> Vec<Signal> {
        if ctx.has_header("cookie") {
            vec![Signal::new(SignalName::HasCookies, true, 10, SignalCategory::Headers)]
        } else {
            vec![]
        }
    }

    fn name(&self) -> &'static str {
        "cookie_detector"
    }
}

/// Inspects the Accept header for page-navigation versus API-style content negotiation.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAnalyzer;

impl AcceptAnalyzer {
    /// Accept values sent verbatim by API clients.
    const API_ACCEPT_VALUES: &'static [&'static str] = &["application/json", "*/*"];
}

impl Detector for AcceptAnalyzer {
    fn analyze(&self, ctx: &DetectionContext) -> Vec<Signal> {
        let Some(accept) = ctx.header("accept") else {
            return vec![];
        };

        let mut signals = Vec::new();

        if accept.to_ascii_lowercase().contains("text/html") {
            signals.push(Signal::new(SignalName::AcceptsHtml, true, 10, SignalCategory::Headers));
        }

        let trimmed = accept.trim();
        if Self::API_ACCEPT_VALUES
            .iter()
            .any(|v| trimmed.eq_ignore_ascii_case(v))
        {
            signals.push(Signal::new(
                SignalName::ApiAcceptHeader,
                accept,
                -10,
                SignalCategory::Headers,
            ));
        }

        signals
    }

    fn name(&self) -> &'static str {
        "accept_analyzer"
    }
}

/// Emits `connection_upgrade` when an Upgrade header is present.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpgradeDetector;

impl Detector for UpgradeDetector {
    fn analyze(&self, ctx: &DetectionContext) -> Vec<Signal> {
        ctx.header("upgrade")
            .map(|upgrade| {
                Signal::new(SignalName::ConnectionUpgrade, upgrade, 15, SignalCategory::Headers)
            })
            .into_iter()
            .collect()
    }

    fn name(&self) -> &'static str {
        "upgrade_detector"
    }
}

/// Emits `dnt_header` when a DNT header is present.
#[derive(Debug, Default, Clone, Copy)]
pub struct DntDetector;

impl Detector for DntDetector {
    fn analyze(&self, ctx: &DetectionContext) -> Vec<Signal> {
        ctx.header("dnt")
            .map(|dnt| Signal::new(SignalName::DntHeader, dnt, 10, SignalCategory::Headers))
            .into_iter()
            .collect()
    }

    fn name(&self) -> &'static str {
        "dnt_detector"
    }
}
