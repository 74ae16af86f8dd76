//! User-Agent analysis detector.
//!
//! Checks the User-Agent string against three independent tests:
//! - AI-agent catalog
//! - Automation catalog
//! - Browser engine tokens
//!
//! A single string may trigger more than one of them.

use super::{DetectionContext, Detector};
use crate::catalog::{first_match, AI_AGENT_PATTERNS, AUTOMATION_PATTERNS};
use crate::signal::{Signal, SignalCategory, SignalName};
use tracing::trace;

/// Engine tokens that, together with "mozilla", mark a browser User-Agent.
const BROWSER_TOKENS: &[&str] = &["chrome", "firefox", "safari", "edge"];

/// User-Agent analyzer detector.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserAgentAnalyzer;

impl UserAgentAnalyzer {
    /// Create a new User-Agent analyzer.
    pub fn new() -> Self {
        Self
    }

    fn looks_like_browser(ua: &str) -> bool {
        let ua_lower = ua.to_lowercase();
        ua_lower.contains("mozilla") && BROWSER_TOKENS.iter().any(|t| ua_lower.contains(t))
    }
}

impl Detector for UserAgentAnalyzer {
    fn analyze(&self, ctx: &DetectionContext) -> Vec<Signal> {
        let Some(ua) = ctx.user_agent() else {
            return vec![Signal::new(
                SignalName::MissingUserAgent,
                true,
                -25,
                SignalCategory::UserAgent,
            )];
        };

        let mut signals = Vec::new();

        if let Some(pattern) = first_match(&AI_AGENT_PATTERNS, ua) {
            trace!(pattern = pattern.as_str(), "AI-agent catalog hit");
            signals.push(Signal::new(
                SignalName::AiAgentUserAgent,
                ua,
                -50,
                SignalCategory::AiSignature,
            ));
        }

        if let Some(pattern) = first_match(&AUTOMATION_PATTERNS, ua) {
            trace!(pattern = pattern.as_str(), "Automation catalog hit");
            signals.push(Signal::new(
                SignalName::AutomationUserAgent,
                ua,
                -30,
                SignalCategory::UserAgent,
            ));
        }

        if Self::looks_like_browser(ua) {
            signals.push(Signal::new(
                SignalName::BrowserUserAgent,
                true,
                20,
                SignalCategory::UserAgent,
            ));
        }

        signals
    }

    fn name(&self) -> &'static str {
        "user_agent_analyzer"
    }
}
