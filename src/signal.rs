//! Signal and verdict types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Four-way classification of a request's likely origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A person driving a browser
    Human,
    /// Scripts, CLI clients, crawlers, headless browsers
    Automation,
    /// LLM-based agents and coding assistants
    AiAgent,
    /// No decisive evidence either way
    #[default]
    Unknown,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Human => "human",
            EntityType::Automation => "automation",
            EntityType::AiAgent => "ai_agent",
            EntityType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a piece of evidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    UserAgent,
    Headers,
    Behavior,
    AiSignature,
}

impl SignalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalCategory::UserAgent => "user_agent",
            SignalCategory::Headers => "headers",
            SignalCategory::Behavior => "behavior",
            SignalCategory::AiSignature => "ai_signature",
        }
    }
}

/// Stable identifiers for every signal an extractor can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalName {
    AiAgentUserAgent,
    AutomationUserAgent,
    BrowserUserAgent,
    MissingUserAgent,
    BrowserHeadersPresent,
    MinimalHeaders,
    AiSpecificHeader,
    HasReferer,
    HasCookies,
    AcceptsHtml,
    ApiAcceptHeader,
    ConnectionUpgrade,
    DntHeader,
}

impl SignalName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalName::AiAgentUserAgent => "ai_agent_user_agent",
            SignalName::AutomationUserAgent => "automation_user_agent",
            SignalName::BrowserUserAgent => "browser_user_agent",
            SignalName::MissingUserAgent => "missing_user_agent",
            SignalName::BrowserHeadersPresent => "browser_headers_present",
            SignalName::MinimalHeaders => "minimal_headers",
            SignalName::AiSpecificHeader => "ai_specific_header",
            SignalName::HasReferer => "has_referer",
            SignalName::HasCookies => "has_cookies",
            SignalName::AcceptsHtml => "accepts_html",
            SignalName::ApiAcceptHeader => "api_accept_header",
            SignalName::ConnectionUpgrade => "connection_upgrade",
            SignalName::DntHeader => "dnt_header",
        }
    }
}

impl fmt::Display for SignalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The observed datum that triggered a signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Flag(bool),
    Count(u32),
    Text(String),
}

impl From<bool> for SignalValue {
    fn from(v: bool) -> Self {
        SignalValue::Flag(v)
    }
}

impl From<u32> for SignalValue {
    fn from(v: u32) -> Self {
        SignalValue::Count(v)
    }
}

impl From<&str> for SignalValue {
    fn from(v: &str) -> Self {
        SignalValue::Text(v.to_string())
    }
}

impl From<String> for SignalValue {
    fn from(v: String) -> Self {
        SignalValue::Text(v)
    }
}

/// One weighted piece of evidence.
///
/// Positive weights push toward [`EntityType::Human`], negative weights toward
/// automation or an AI agent. Fields are private so a signal cannot be altered
/// after an extractor has produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    name: SignalName,
    value: SignalValue,
    weight: i32,
    category: SignalCategory,
}

impl Signal {
    pub fn new(
        name: SignalName,
        value: impl Into<SignalValue>,
        weight: i32,
        category: SignalCategory,
    ) -> Self {
        Self {
            name,
            value: value.into(),
            weight,
            category,
        }
    }

    pub fn name(&self) -> SignalName {
        self.name
    }

    pub fn value(&self) -> &SignalValue {
        &self.value
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }

    pub fn category(&self) -> SignalCategory {
        self.category
    }
}

/// Verdict for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintResult {
    pub entity_type: EntityType,
    /// Certainty in `entity_type`, 0-100
    pub confidence: u8,
    /// Evidence in extraction order
    pub signals: Vec<Signal>,
    pub user_agent: Option<String>,
    /// Headers as received, for audit logging
    pub raw_headers: BTreeMap<String, String>,
}

impl FingerprintResult {
    /// Sum of all signal weights.
    pub fn total_weight(&self) -> i32 {
        self.signals.iter().map(Signal::weight).sum()
    }

    /// Whether a signal with the given name was emitted.
    pub fn has_signal(&self, name: SignalName) -> bool {
        self.signals.iter().any(|s| s.name == name)
    }
}
