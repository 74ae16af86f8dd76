//! Traffic classifier: runs every extractor, tallies the signals and walks the
//! decision ladder.

use crate::detectors::{
    AcceptAnalyzer, AiHeaderScanner, BrowserHeaderCensus, CookieDetector, DetectionContext,
    Detector, DntDetector, RefererDetector, UpgradeDetector, UserAgentAnalyzer,
};
use crate::score::{decide, SignalTally};
use crate::signal::{FingerprintResult, Signal};
use std::sync::LazyLock;
use tracing::debug;

static SHARED: LazyLock<TrafficClassifier> = LazyLock::new(TrafficClassifier::new);

/// Classify a request with the process-wide classifier.
pub fn fingerprint(ctx: &DetectionContext) -> FingerprintResult {
    SHARED.classify(ctx)
}

/// Stateless request classifier.
///
/// Holds only the extractor list; safe to share across threads without locking.
pub struct TrafficClassifier {
    detectors: Vec<Box<dyn Detector>>,
}

impl TrafficClassifier {
    /// Create a classifier with the extractors in their fixed order.
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(UserAgentAnalyzer::new()),
                Box::new(BrowserHeaderCensus::new()),
                Box::new(AiHeaderScanner::new()),
                Box::new(RefererDetector),
                Box::new(CookieDetector),
                Box::new(AcceptAnalyzer),
                Box::new(UpgradeDetector),
                Box::new(DntDetector),
            ],
        }
    }

    /// Names of the extractors in run order.
    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    /// Run every extractor and concatenate their signals in extractor order.
    pub fn signals(&self, ctx: &DetectionContext) -> Vec<Signal> {
        let mut signals = Vec::new();
        for detector in &self.detectors {
            let emitted = detector.analyze(ctx);
            debug!(
                detector = detector.name(),
                emitted = emitted.len(),
                "Extractor complete"
            );
            signals.extend(emitted);
        }
        signals
    }

    /// Classify a single request.
    pub fn classify(&self, ctx: &DetectionContext) -> FingerprintResult {
        let signals = self.signals(ctx);
        let tally = SignalTally::from_signals(&signals);
        let (entity_type, confidence) = decide(&tally);

        debug!(
            entity_type = entity_type.as_str(),
            confidence,
            total_weight = tally.total_weight,
            has_ai_signal = tally.has_ai_signal,
            has_automation_signal = tally.has_automation_signal,
            "Classification complete"
        );

        FingerprintResult {
            entity_type,
            confidence,
            signals,
            user_agent: ctx.user_agent().map(str::to_string),
            raw_headers: ctx.raw_headers(),
        }
    }
}

impl Default for TrafficClassifier {
    fn default() -> Self {
        Self::new()
    }
}
