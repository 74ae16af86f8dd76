//! Configuration types for the fingerprint service.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for the fingerprint service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Socket server settings
    pub server: ServerConfig,

    /// Downstream log sink settings
    pub sink: SinkConfig,

    /// Include the one-line summary in responses
    pub include_summary: bool,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            sink: SinkConfig::default(),
            include_summary: true,
        }
    }
}

impl FingerprintConfig {
    /// Load configuration from a JSON or YAML file, chosen by extension.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let config: Self = if path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
            serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML in {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON in {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.max_line_bytes == 0 {
            bail!("server.max_line_bytes must be greater than zero");
        }
        if self.sink.enabled && self.sink.path.as_os_str().is_empty() {
            bail!("sink.path must be set when the sink is enabled");
        }
        Ok(())
    }
}

/// Unix socket server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket path to listen on
    pub socket_path: PathBuf,

    /// Longest accepted request line in bytes
    pub max_line_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from("/tmp/traffic-fingerprint.sock"),
            max_line_bytes: 64 * 1024,
        }
    }
}

/// Append-only log sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Forward fingerprint records to the sink
    pub enabled: bool,

    /// JSON-lines file to append to
    pub path: PathBuf,

    /// Include the received headers in each record
    pub include_raw_headers: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("fingerprints.jsonl"),
            include_raw_headers: true,
        }
    }
}
