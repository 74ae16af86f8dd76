//! Integration tests for traffic fingerprinting.
//!
//! These tests verify the complete pipeline: extraction, tallying, the
//! decision ladder, summaries and the service's sink handling.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use traffic_fingerprint::config::FingerprintConfig;
use traffic_fingerprint::score::SignalTally;
use traffic_fingerprint::service::{FingerprintService, RequestEnvelope};
use traffic_fingerprint::sink::{FingerprintRecord, FingerprintSink, JsonLinesSink};
use traffic_fingerprint::summary::key_signals;
use traffic_fingerprint::{
    fingerprint, summarize, DetectionContext, EntityType, FingerprintResult, SignalCategory,
    SignalName, SignalValue, TrafficClassifier,
};

fn names(result: &FingerprintResult) -> Vec<SignalName> {
    result.signals.iter().map(|s| s.name()).collect()
}

fn browser_request() -> DetectionContext {
    DetectionContext::from_pairs([
        ("User-Agent", "Mozilla/5.0 (Windows NT 10.0) Chrome/120"),
        ("Accept", "text/html,application/xhtml+xml"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Accept-Encoding", "gzip, deflate, br"),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-CH-UA", "\"Chromium\";v=\"120\""),
        ("Referer", "https://example.com/"),
        ("Cookie", "session=abc123"),
    ])
}

fn sample_requests() -> Vec<DetectionContext> {
    vec![
        DetectionContext::new(),
        browser_request(),
        browser_request().with_header("X-Anthropic-Client", "sdk"),
        DetectionContext::new().with_header("user-agent", "curl/7.68.0"),
        DetectionContext::new().with_header("user-agent", "GPTBot/1.1"),
        DetectionContext::from_pairs([("accept", "application/json"), ("Authorization", "Bearer x")]),
        DetectionContext::from_pairs([("Upgrade", "websocket"), ("DNT", "1"), ("Cookie", "a=b")]),
        DetectionContext::from_pairs([("user-agent", "MyLib/1.0"), ("accept", "*/*")]),
    ]
}

// =============================================================================
// Concrete Scenarios
// =============================================================================

#[test]
fn test_browser_request_is_human() {
    let result = fingerprint(&browser_request());

    // Accept contains text/html, so accepts_html fires too.
    assert_eq!(
        names(&result),
        vec![
            SignalName::BrowserUserAgent,
            SignalName::BrowserHeadersPresent,
            SignalName::HasReferer,
            SignalName::HasCookies,
            SignalName::AcceptsHtml,
        ]
    );
    assert_eq!(result.total_weight(), 80);
    assert_eq!(result.entity_type, EntityType::Human);
    assert_eq!(result.confidence, 85);
}

#[test]
fn test_browser_request_without_html_accept() {
    let ctx = DetectionContext::from_pairs([
        ("User-Agent", "Mozilla/5.0 (Windows NT 10.0) Chrome/120"),
        ("accept", "image/avif,image/webp"),
        ("accept-language", "en-US"),
        ("accept-encoding", "gzip"),
        ("sec-fetch-dest", "image"),
        ("sec-fetch-mode", "no-cors"),
        ("sec-ch-ua", "\"Chromium\";v=\"120\""),
        ("referer", "https://example.com/"),
        ("cookie", "session=abc123"),
    ]);
    let result = fingerprint(&ctx);

    assert_eq!(
        names(&result),
        vec![
            SignalName::BrowserUserAgent,
            SignalName::BrowserHeadersPresent,
            SignalName::HasReferer,
            SignalName::HasCookies,
        ]
    );
    assert_eq!(result.total_weight(), 70);
    assert_eq!(result.entity_type, EntityType::Human);
    assert_eq!(result.confidence, 85);
}

#[test]
fn test_curl_is_automation() {
    let result = fingerprint(&DetectionContext::new().with_header("User-Agent", "curl/7.68.0"));

    assert_eq!(
        names(&result),
        vec![SignalName::AutomationUserAgent, SignalName::MinimalHeaders]
    );
    assert_eq!(result.total_weight(), -50);
    assert_eq!(result.entity_type, EntityType::Automation);
    assert_eq!(result.confidence, 90);
}

#[test]
fn test_claude_header_is_ai_agent() {
    let result = fingerprint(&DetectionContext::new().with_header("x-claude-version", "1.0"));

    let found: HashSet<SignalName> = names(&result).into_iter().collect();
    assert_eq!(
        found,
        HashSet::from([
            SignalName::MissingUserAgent,
            SignalName::AiSpecificHeader,
            SignalName::MinimalHeaders,
        ])
    );
    assert_eq!(result.total_weight(), -85);
    assert_eq!(result.entity_type, EntityType::AiAgent);
    assert_eq!(result.confidence, 95);
}

#[test]
fn test_json_accept_without_user_agent() {
    let result = fingerprint(&DetectionContext::new().with_header("accept", "application/json"));

    assert_eq!(
        names(&result),
        vec![
            SignalName::MissingUserAgent,
            SignalName::MinimalHeaders,
            SignalName::ApiAcceptHeader,
        ]
    );
    assert_eq!(result.total_weight(), -55);
    assert_eq!(result.entity_type, EntityType::Automation);
    assert_eq!(result.confidence, 90);
}

#[test]
fn test_unknown_library_with_wildcard_accept() {
    let ctx = DetectionContext::from_pairs([("user-agent", "MyLib/1.0"), ("accept", "*/*")]);
    let result = fingerprint(&ctx);

    assert_eq!(
        names(&result),
        vec![SignalName::MinimalHeaders, SignalName::ApiAcceptHeader]
    );
    assert_eq!(result.signals[0].value(), &SignalValue::Count(1));
    let tally = SignalTally::from_signals(&result.signals);
    assert_eq!(tally.total_weight, -30);
    assert!(!tally.has_automation_signal);
    assert_eq!(result.entity_type, EntityType::Automation);
    assert_eq!(result.confidence, 80);
}

#[test]
fn test_weak_positive_request_is_unknown() {
    let ctx = DetectionContext::from_pairs([
        ("user-agent", "MyLib/1.0"),
        ("accept", "text/html"),
        ("accept-language", "en"),
        ("accept-encoding", "gzip"),
        ("cookie", "a=b"),
    ]);
    let result = fingerprint(&ctx);

    // Three browser headers sit in the neutral band.
    assert_eq!(names(&result), vec![SignalName::HasCookies, SignalName::AcceptsHtml]);
    assert_eq!(result.entity_type, EntityType::Unknown);
    assert_eq!(result.confidence, 30);
}

#[test]
fn test_header_names_are_case_insensitive() {
    let lower = fingerprint(&DetectionContext::from_pairs([
        ("user-agent", "curl/7.68.0"),
        ("referer", "https://a.example/"),
    ]));
    let upper = fingerprint(&DetectionContext::from_pairs([
        ("USER-AGENT", "curl/7.68.0"),
        ("REFERER", "https://a.example/"),
    ]));

    assert_eq!(lower.signals, upper.signals);
    assert_eq!(lower.entity_type, upper.entity_type);
    assert!(upper.raw_headers.contains_key("USER-AGENT"));
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_confidence_bounded_and_names_unique() {
    for ctx in sample_requests() {
        let result = fingerprint(&ctx);
        assert!(result.confidence <= 100);

        let mut seen = HashSet::new();
        for signal in &result.signals {
            assert!(seen.insert(signal.name()), "duplicate {}", signal.name());
        }
    }
}

#[test]
fn test_classification_is_deterministic() {
    let classifier = TrafficClassifier::new();
    for ctx in sample_requests() {
        assert_eq!(classifier.classify(&ctx), classifier.classify(&ctx));
        assert_eq!(classifier.classify(&ctx), fingerprint(&ctx));
    }
}

#[test]
fn test_ai_signal_overrides_total_weight() {
    let result = fingerprint(&browser_request().with_header("X-Anthropic-Client", "sdk"));

    assert!(result.total_weight() > 30);
    assert!(result.signals.iter().any(|s| {
        s.category() == SignalCategory::AiSignature && s.weight() < -30
    }));
    assert_eq!(result.entity_type, EntityType::AiAgent);
}

#[test]
fn test_ai_user_agent_spoofing_browser() {
    let spoofed = DetectionContext::from_pairs([
        ("User-Agent", "Mozilla/5.0 Chrome/120 Safari/537.36 (compatible; ChatGPT-User/1.0)"),
        ("Accept", "text/html"),
        ("Accept-Language", "en-US"),
        ("Accept-Encoding", "gzip"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Dest", "document"),
    ]);
    let result = fingerprint(&spoofed);
    assert!(result.has_signal(SignalName::AiAgentUserAgent));
    assert!(result.has_signal(SignalName::BrowserUserAgent));
    assert_eq!(result.entity_type, EntityType::AiAgent);
}

#[test]
fn test_summary_references_strongest_signals() {
    for ctx in sample_requests() {
        let result = fingerprint(&ctx);
        let key = key_signals(&result.signals);
        assert!(key.len() <= 3);

        let weakest_key = key.iter().map(|s| s.weight().abs()).min().unwrap_or(0);
        let stronger_excluded = result
            .signals
            .iter()
            .filter(|s| !key.iter().any(|k| k.name() == s.name()))
            .filter(|s| s.weight().abs() > weakest_key)
            .count();
        assert_eq!(stronger_excluded, 0);
        assert_eq!(key.len(), result.signals.len().min(3));

        let summary = summarize(&result);
        for signal in key {
            assert!(summary.contains(signal.name().as_str()));
        }
    }
}

#[test]
fn test_summary_format() {
    let result = fingerprint(&DetectionContext::new().with_header("x-claude-version", "1.0"));
    assert_eq!(
        summarize(&result),
        "ai_agent (95% confidence) - Key signals: ai_specific_header, missing_user_agent, minimal_headers"
    );
}

#[test]
fn test_result_serialization() {
    let result = fingerprint(&DetectionContext::new().with_header("User-Agent", "curl/7.68.0"));
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["entity_type"], "automation");
    assert_eq!(json["confidence"], 90);
    assert_eq!(json["user_agent"], "curl/7.68.0");
    assert_eq!(json["signals"][0]["name"], "automation_user_agent");
    assert_eq!(json["signals"][0]["category"], "user_agent");
    assert_eq!(json["raw_headers"]["User-Agent"], "curl/7.68.0");

    let parsed: FingerprintResult = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, result);
}

// =============================================================================
// Service And Sink Tests
// =============================================================================

#[derive(Default)]
struct MemorySink {
    records: Mutex<Vec<FingerprintRecord>>,
}

#[async_trait]
impl FingerprintSink for MemorySink {
    async fn append(&self, record: &FingerprintRecord) -> anyhow::Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

struct UnavailableSink;

#[async_trait]
impl FingerprintSink for UnavailableSink {
    async fn append(&self, _record: &FingerprintRecord) -> anyhow::Result<()> {
        anyhow::bail!("log store unreachable")
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

fn curl_envelope() -> RequestEnvelope {
    RequestEnvelope {
        headers: vec![("User-Agent".to_string(), "curl/7.68.0".to_string())],
        source_addr: Some("198.51.100.7".to_string()),
        outcome: Some("blocked".to_string()),
    }
}

#[tokio::test]
async fn test_service_forwards_record_to_sink() {
    let sink = Arc::new(MemorySink::default());
    let service = FingerprintService::new(FingerprintConfig::default()).with_sink(sink.clone());

    let response = service.on_request(&curl_envelope()).await;
    assert_eq!(response.result.entity_type, EntityType::Automation);

    let records = sink.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].entity_type, EntityType::Automation);
    assert_eq!(records[0].confidence, 90);
    assert_eq!(records[0].source_addr.as_deref(), Some("198.51.100.7"));
    assert_eq!(records[0].outcome.as_deref(), Some("blocked"));
    assert_eq!(records[0].user_agent.as_deref(), Some("curl/7.68.0"));
    assert!(records[0].raw_headers.is_some());
}

#[tokio::test]
async fn test_service_omits_raw_headers_when_configured() {
    let mut config = FingerprintConfig::default();
    config.sink.include_raw_headers = false;
    let sink = Arc::new(MemorySink::default());
    let service = FingerprintService::new(config).with_sink(sink.clone());

    service.on_request(&curl_envelope()).await;
    assert!(sink.records.lock().unwrap()[0].raw_headers.is_none());
}

#[tokio::test]
async fn test_unavailable_sink_does_not_change_result() {
    let plain = FingerprintService::new(FingerprintConfig::default());
    let failing = FingerprintService::new(FingerprintConfig::default())
        .with_sink(Arc::new(UnavailableSink));

    let expected = plain.on_request(&curl_envelope()).await;
    let actual = failing.on_request(&curl_envelope()).await;
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_service_with_json_lines_sink() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let sink = Arc::new(JsonLinesSink::open(&path).await.unwrap());
    let service = FingerprintService::new(FingerprintConfig::default()).with_sink(sink);

    service.on_request(&curl_envelope()).await;
    service.on_request(&RequestEnvelope::default()).await;

    let content = std::fs::read_to_string(&path).unwrap();
    let records: Vec<FingerprintRecord> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].outcome.as_deref(), Some("blocked"));
    assert!(records[1].user_agent.is_none());
}
