//! Human-readable one-line explanation of a verdict.

use crate::signal::{FingerprintResult, Signal};
use std::cmp::Reverse;

/// How many signals the summary names.
const KEY_SIGNAL_COUNT: usize = 3;

/// Stand-in when no signal fired.
const NO_SIGNALS: &str = "none";

/// The strongest signals by absolute weight. Ties keep extraction order.
pub fn key_signals(signals: &[Signal]) -> Vec<&Signal> {
    let mut ranked: Vec<&Signal> = signals.iter().collect();
    ranked.sort_by_key(|s| Reverse(s.weight().unsigned_abs()));
    ranked.truncate(KEY_SIGNAL_COUNT);
    ranked
}

/// Render `"<entity> (<confidence>% confidence) - Key signals: <names>"`.
pub fn summarize(result: &FingerprintResult) -> String {
    let key = key_signals(&result.signals);
    let names = if key.is_empty() {
        NO_SIGNALS.to_string()
    } else {
        key.iter()
            .map(|s| s.name().as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "{} ({}% confidence) - Key signals: {}",
        result.entity_type, result.confidence, names
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{EntityType, SignalCategory, SignalName};
    use std::collections::BTreeMap;

    fn result_with(signals: Vec<Signal>) -> FingerprintResult {
        FingerprintResult {
            entity_type: EntityType::Human,
            confidence: 85,
            signals,
            user_agent: None,
            raw_headers: BTreeMap::new(),
        }
    }

    #[test]
    fn test_summary_ranks_by_absolute_weight() {
        let result = result_with(vec![
            Signal::new(SignalName::BrowserUserAgent, true, 20, SignalCategory::UserAgent),
            Signal::new(SignalName::BrowserHeadersPresent, 6u32, 25, SignalCategory::Headers),
            Signal::new(SignalName::HasReferer, "https://a.example/", 15, SignalCategory::Headers),
            Signal::new(SignalName::HasCookies, true, 10, SignalCategory::Headers),
        ]);
        assert_eq!(
            summarize(&result),
            "human (85% confidence) - Key signals: browser_headers_present, browser_user_agent, has_referer"
        );
    }

    #[test]
    fn test_ties_keep_extraction_order() {
        let result = result_with(vec![
            Signal::new(SignalName::HasCookies, true, 10, SignalCategory::Headers),
            Signal::new(SignalName::AcceptsHtml, true, 10, SignalCategory::Headers),
            Signal::new(SignalName::ApiAcceptHeader, "*/*", -10, SignalCategory::Headers),
            Signal::new(SignalName::DntHeader, "1", 10, SignalCategory::Headers),
        ]);
        let names: Vec<SignalName> = key_signals(&result.signals).iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![SignalName::HasCookies, SignalName::AcceptsHtml, SignalName::ApiAcceptHeader]
        );
    }

    #[test]
    fn test_summary_without_signals() {
        let mut result = result_with(vec![]);
        result.entity_type = EntityType::Unknown;
        result.confidence = 30;
        assert_eq!(summarize(&result), "unknown (30% confidence) - Key signals: none");
    }
}
