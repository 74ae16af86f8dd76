//! Traffic fingerprint service and command-line classifier.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use traffic_fingerprint::server::run_uds_server;
use traffic_fingerprint::sink::JsonLinesSink;
use traffic_fingerprint::{
    fingerprint, summarize, DetectionContext, FingerprintConfig, FingerprintService,
};

#[derive(Parser, Debug)]
#[command(name = "traffic-fingerprint")]
#[command(author, version, about = "Classifies HTTP requests as human, automation or AI agent")]
struct Args {
    /// Enable JSON logging format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Log level or filter directives (e.g. `debug`, `traffic_fingerprint=trace,info`)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve classification requests over a Unix socket
    Serve {
        /// Path to configuration file (JSON or YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Unix socket path, overrides the configuration
        #[arg(short, long)]
        socket: Option<PathBuf>,

        /// JSON-lines log file, enables the sink
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Classify a single request given on the command line
    Classify {
        /// User-Agent header value
        #[arg(short, long)]
        user_agent: Option<String>,

        /// Additional header as `name:value` (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Print the full result as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected name:value, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in `{raw}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Filter from `RUST_LOG` when set, else from the `--log-level` directives.
/// Unparseable directives fall back to `info`.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| directive_filter(directives))
}

fn directive_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_logging(json: bool, directives: &str) {
    let registry = tracing_subscriber::registry().with(log_filter(directives));

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

/// Build the request for `classify`. The `--user-agent` value goes first so it
/// takes precedence over a User-Agent given with `-H`.
fn classify_context(user_agent: Option<String>, headers: Vec<(String, String)>) -> DetectionContext {
    let ua = user_agent.map(|ua| ("User-Agent".to_string(), ua));
    DetectionContext::from_pairs(ua.into_iter().chain(headers))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, &args.log_level);

    match args.command {
        Command::Serve {
            config,
            socket,
            log_file,
        } => serve(config, socket, log_file).await,
        Command::Classify {
            user_agent,
            headers,
            json,
        } => {
            let ctx = classify_context(user_agent, headers);
            let result = fingerprint(&ctx);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", summarize(&result));
            }
            Ok(())
        }
    }
}

async fn serve(
    config_path: Option<PathBuf>,
    socket: Option<PathBuf>,
    log_file: Option<PathBuf>,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => FingerprintConfig::from_file(path)?,
        None => FingerprintConfig::default(),
    };
    if let Some(socket) = socket {
        config.server.socket_path = socket;
    }
    if let Some(log_file) = log_file {
        config.sink.enabled = true;
        config.sink.path = log_file;
    }
    config.validate()?;

    let socket_path = config.server.socket_path.clone();
    let mut service = FingerprintService::new(config.clone());

    if config.sink.enabled {
        let sink = JsonLinesSink::open(&config.sink.path)
            .await
            .context("failed to open fingerprint log")?;
        info!(path = %sink.path().display(), "Fingerprint log sink enabled");
        service = service.with_sink(Arc::new(sink));
    }

    info!(socket = %socket_path.display(), "Starting traffic-fingerprint server");
    run_uds_server(&socket_path, Arc::new(service)).await
}
