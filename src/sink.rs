//! Downstream log sink for fingerprint records.
//!
//! The classifier never touches a sink. Callers forward records after
//! classifying and must tolerate the sink being unavailable.

use crate::signal::{EntityType, FingerprintResult, Signal};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// One append-only log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    /// Unix timestamp in seconds
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_addr: Option<String>,
    /// Caller-defined outcome (e.g. "blocked", "allowed")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    pub entity_type: EntityType,
    pub confidence: u8,
    pub signals: Vec<Signal>,
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_headers: Option<BTreeMap<String, String>>,
}

impl FingerprintRecord {
    /// Build a record from a verdict, stamped with the current time.
    pub fn from_result(result: &FingerprintResult, include_raw_headers: bool) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Self {
            timestamp,
            source_addr: None,
            outcome: None,
            entity_type: result.entity_type,
            confidence: result.confidence,
            signals: result.signals.clone(),
            user_agent: result.user_agent.clone(),
            raw_headers: include_raw_headers.then(|| result.raw_headers.clone()),
        }
    }

    pub fn with_source_addr(mut self, addr: impl Into<String>) -> Self {
        self.source_addr = Some(addr.into());
        self
    }

    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = Some(outcome.into());
        self
    }
}

/// Append-only store for fingerprint records.
#[async_trait]
pub trait FingerprintSink: Send + Sync {
    /// Append one record.
    async fn append(&self, record: &FingerprintRecord) -> anyhow::Result<()>;

    /// Get the sink name.
    fn name(&self) -> &'static str;
}

/// Discards every record.
#[derive(Debug, Default)]
pub struct NullSink;

#[async_trait]
impl FingerprintSink for NullSink {
    async fn append(&self, _record: &FingerprintRecord) -> anyhow::Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

/// Appends records as JSON lines to a file. Writes are serialized.
pub struct JsonLinesSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesSink {
    /// Open (or create) the file for appending.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to open sink file {}", path.display()))?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FingerprintSink for JsonLinesSink {
    async fn append(&self, record: &FingerprintRecord) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(record).context("failed to serialize record")?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line)
            .await
            .with_context(|| format!("failed to append to {}", self.path.display()))?;
        file.flush().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json_lines"
    }
}
