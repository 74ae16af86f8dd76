//! AI-signature header scan.
//!
//! Looks for header names used by AI-agent tooling. Emits at most one signal
//! per request, for the first matching header in received order.

use super::{DetectionContext, Detector};
use crate::catalog::ai_header_prefix;
use crate::signal::{Signal, SignalCategory, SignalName};
use tracing::trace;

/// AI-specific header scanner.
#[derive(Debug, Default, Clone, Copy)]
pub struct AiHeaderScanner;

impl AiHeaderScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for AiHeaderScanner {
    fn analyze(&self, ctx: &DetectionContext) -> Vec<Signal> {
        for (name, _) in ctx.headers() {
            if let Some(prefix) = ai_header_prefix(name) {
                trace!(header = name, prefix, "AI header prefix hit");
                return vec![Signal::new(
                    SignalName::AiSpecificHeader,
                    name,
                    -40,
                    SignalCategory::AiSignature,
                )];
            }
        }
        vec![]
    }

    fn name(&self) -> &'static str {
        "ai_header_scanner"
    }
}
