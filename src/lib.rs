//! Traffic fingerprinting for inbound HTTP requests.
//!
//! Decides from header metadata alone whether a request most likely came from
//! a human with a browser, an automated script, an AI agent, or an
//! indeterminate source, and reports a confidence plus the evidence used.
//!
//! # Features
//!
//! - User-Agent catalogs for AI agents and automation tooling
//! - Browser header census and AI-specific header scan
//! - Weighted signal tally with an ordered decision ladder
//! - One-line summaries for logs and dashboards
//! - Append-only JSON-lines sink and a Unix socket service
//!
//! # Example
//!
//! ```
//! use traffic_fingerprint::{fingerprint, summarize, DetectionContext, EntityType};
//!
//! let ctx = DetectionContext::new().with_header("User-Agent", "curl/7.68.0");
//! let result = fingerprint(&ctx);
//!
//! assert_eq!(result.entity_type, EntityType::Automation);
//! assert_eq!(result.confidence, 90);
//! println!("{}", summarize(&result));
//! ```

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod detectors;
pub mod score;
pub mod server;
pub mod service;
pub mod signal;
pub mod sink;
pub mod summary;

pub use classifier::{fingerprint, TrafficClassifier};
pub use config::FingerprintConfig;
pub use detectors::DetectionContext;
pub use score::SignalTally;
pub use service::{ClassifyResponse, FingerprintService, RequestEnvelope};
pub use signal::{EntityType, FingerprintResult, Signal, SignalCategory, SignalName, SignalValue};
pub use summary::summarize;
