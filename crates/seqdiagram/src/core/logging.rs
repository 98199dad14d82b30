//! Logging setup for the diagram pipeline
//!
//! Every stage emits `tracing` spans and events: `tokenize`, `parse`
//! and `layout_sequence` at INFO, per-item detail at DEBUG and TRACE. Nothing
//! is printed until a subscriber is installed, either by the host application
//! or with [`init_logging`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use seqdiagram::core::logging::init_logging;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! init_logging(Some("debug"), Some("pretty"))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! - `SEQDIAGRAM_LOG_LEVEL`: log level or filter directive
//! - `RUST_LOG`: standard `tracing-subscriber` filter, used as a fallback
//! - `SEQDIAGRAM_LOG_FORMAT`: `compact`, `pretty` or `json`
//!
//! Filters can target one stage:
//!
//! ```bash
//! RUST_LOG="info,seqdiagram::sequence::layout=trace" my-app
//! ```

use std::str::FromStr;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

pub const LOG_LEVEL_ENV: &str = "SEQDIAGRAM_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "SEQDIAGRAM_LOG_FORMAT";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single line per event
    #[default]
    Compact,
    /// Multi-line with colors, file and line
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// All accepted format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Pick the filter directive: explicit argument, then `SEQDIAGRAM_LOG_LEVEL`,
/// then `RUST_LOG`, then `info`
fn resolve_level(level: Option<&str>) -> String {
    level
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string())
}

fn resolve_format(format: Option<&str>) -> Result<LogFormat, String> {
    match format
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_FORMAT_ENV).ok())
    {
        Some(name) => LogFormat::from_str(&name).map_err(|e| format!("Invalid log format: {}", e)),
        None => Ok(LogFormat::default()),
    }
}

/// Install a global `tracing` subscriber
///
/// `level` accepts a plain level (`trace` .. `error`, or `off`) or any
/// `EnvFilter` directive. An unparsable directive falls back to `info`.
///
/// Fails on an unknown format name, or when a global subscriber is already
/// installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = resolve_level(level);
    let format = resolve_format(format)?;

    let filter = if log_level == "off" {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    match format {
        LogFormat::Compact => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_target(false)
                        .with_level(true)
                        .with_file(false)
                        .with_line_number(false)
                        .with_span_events(FmtSpan::NONE),
                )
                .try_init()?;
        }
        LogFormat::Pretty => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_target(true)
                        .with_level(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::ACTIVE)
                        .pretty(),
                )
                .try_init()?;
        }
        LogFormat::Json => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_target(true)
                        .with_level(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .json(),
                )
                .try_init()?;
        }
    }

    Ok(())
}

/// `init_logging(None, None)`
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
