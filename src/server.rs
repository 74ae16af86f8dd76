//! Unix socket server speaking newline-delimited JSON.
//!
//! Each request line is a [`RequestEnvelope`]; each reply line is a
//! [`ClassifyResponse`] or an `{"error": ...}` object.

use crate::service::{FingerprintService, RequestEnvelope};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::UnixListener;
use tracing::{debug, error, info, warn};

#[derive(Debug, Serialize)]
struct ErrorReply {
    error: String,
}

/// Accept connections forever, one task per connection.
pub async fn run_uds_server(socket_path: &Path, service: Arc<FingerprintService>) -> anyhow::Result<()> {
    // Remove existing socket file if it exists
    if socket_path.exists() {
        std::fs::remove_file(socket_path)
            .with_context(|| format!("failed to remove stale socket {}", socket_path.display()))?;
    }

    let listener = UnixListener::bind(socket_path)
        .with_context(|| format!("failed to bind {}", socket_path.display()))?;
    info!(socket = %socket_path.display(), "Fingerprint server listening");

    loop {
        let (stream, _) = listener.accept().await?;
        let service = Arc::clone(&service);

        tokio::spawn(async move {
            let (read_half, write_half) = stream.into_split();
            let reader = BufReader::new(read_half);
            let writer = BufWriter::new(write_half);

            if let Err(e) = handle_connection(reader, writer, &service).await {
                error!(error = %e, "Connection failed");
            }
        });
    }
}

/// Outcome of reading one request line.
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    /// Peer closed the connection
    Eof,
    /// A line fits the limit and is in the buffer
    Complete,
    /// The line exceeded the limit; holds the bytes discarded
    TooLong(usize),
}

/// Read one `\n`-terminated line into `buf`, holding at most `max_bytes + 1` bytes.
///
/// An oversized line is drained from the reader without being buffered.
async fn read_bounded_line<R>(reader: &mut R, buf: &mut Vec<u8>, max_bytes: usize) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut total = 0usize;
    let mut overflow = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(match (total, overflow) {
                (0, _) => LineRead::Eof,
                (_, true) => LineRead::TooLong(total),
                (_, false) => LineRead::Complete,
            });
        }

        let (len, done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };
        total += len;
        if !overflow {
            if total > max_bytes {
                overflow = true;
                buf.clear();
            } else {
                buf.extend_from_slice(&available[..len]);
            }
        }
        reader.consume(len);

        if done {
            return Ok(if overflow {
                LineRead::TooLong(total)
            } else {
                LineRead::Complete
            });
        }
    }
}

/// Serve one connection until the peer closes it.
pub async fn handle_connection<R, W>(
    mut reader: R,
    mut writer: W,
    service: &FingerprintService,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let max_line_bytes = service.config().server.max_line_bytes;
    let mut buf = Vec::with_capacity(1024);

    loop {
        let reply = match read_bounded_line(&mut reader, &mut buf, max_line_bytes).await? {
            LineRead::Eof => {
                debug!("Client disconnected");
                return Ok(());
            }
            LineRead::TooLong(bytes) => {
                warn!(bytes, limit = max_line_bytes, "Request line too long");
                error_reply(format!("request exceeds {max_line_bytes} bytes"))?
            }
            LineRead::Complete => match std::str::from_utf8(&buf) {
                Err(e) => {
                    warn!(error = %e, "Request is not valid UTF-8");
                    error_reply(format!("invalid request: {e}"))?
                }
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => match serde_json::from_str::<RequestEnvelope>(line.trim()) {
                    Ok(request) => serde_json::to_vec(&service.on_request(&request).await)?,
                    Err(e) => {
                        warn!(error = %e, "Failed to parse request");
                        error_reply(format!("invalid request: {e}"))?
                    }
                },
            },
        };

        writer.write_all(&reply).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
}

fn error_reply(error: String) -> anyhow::Result<Vec<u8>> {
    Ok(serde_json::to_vec(&ErrorReply { error })?)
}
