//! Fingerprint service: classifies requests on behalf of a handler and
//! forwards the verdict to the log sink.

use crate::classifier::TrafficClassifier;
use crate::config::FingerprintConfig;
use crate::detectors::DetectionContext;
use crate::signal::FingerprintResult;
use crate::sink::{FingerprintRecord, FingerprintSink};
use crate::summary::summarize;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Wire form of a request to classify.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Headers as `[name, value]` pairs in received order
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Client address, recorded in the log sink
    #[serde(default)]
    pub source_addr: Option<String>,
    /// Caller-defined outcome, recorded in the log sink
    #[serde(default)]
    pub outcome: Option<String>,
}

impl RequestEnvelope {
    pub fn context(&self) -> DetectionContext {
        DetectionContext::from_pairs(self.headers.iter().cloned())
    }
}

/// Reply to a classified request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub result: FingerprintResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Classifier plus optional downstream sink.
pub struct FingerprintService {
    config: FingerprintConfig,
    classifier: TrafficClassifier,
    sink: Option<Arc<dyn FingerprintSink>>,
}

impl FingerprintService {
    /// Create a service without a sink.
    pub fn new(config: FingerprintConfig) -> Self {
        Self {
            config,
            classifier: TrafficClassifier::new(),
            sink: None,
        }
    }

    /// Forward every verdict to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn FingerprintSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Classify one request, log it and forward it to the sink.
    ///
    /// Sink failures are logged and never affect the response.
    pub async fn on_request(&self, request: &RequestEnvelope) -> ClassifyResponse {
        let ctx = request.context();
        let result = self.classifier.classify(&ctx);

        info!(
            source_addr = request.source_addr.as_deref().unwrap_or("-"),
            entity_type = result.entity_type.as_str(),
            confidence = result.confidence,
            signals = result.signals.len(),
            "Request fingerprinted"
        );

        if let Some(sink) = &self.sink {
            self.forward(sink.as_ref(), request, &result).await;
        }

        let summary = self.config.include_summary.then(|| summarize(&result));
        ClassifyResponse { result, summary }
    }

    async fn forward(
        &self,
        sink: &dyn FingerprintSink,
        request: &RequestEnvelope,
        result: &FingerprintResult,
    ) {
        let mut record =
            FingerprintRecord::from_result(result, self.config.sink.include_raw_headers);
        if let Some(addr) = &request.source_addr {
            record = record.with_source_addr(addr.clone());
        }
        if let Some(outcome) = &request.outcome {
            record = record.with_outcome(outcome.clone());
        }

        match sink.append(&record).await {
            Ok(()) => debug!(sink = sink.name(), "Fingerprint record stored"),
            Err(e) => warn!(
                sink = sink.name(),
                error = %e,
                "Failed to store fingerprint record, continuing"
            ),
        }
    }
}
